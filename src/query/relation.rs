//! Entity relations - join descriptors between attributes of two entity occurrences.

use std::fmt;
use std::marker::PhantomData;

use crate::model::{Entity, Property};
use crate::schema::AttributeLocation;

/// Kind of join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationType {
    InnerJoin,
    LeftJoin,
}

/// A join between a source attribute and a relation attribute.
///
/// Equality compares the resolved properties and aliases on both sides.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityRelation {
    relation_type: RelationType,
    source: AttributeLocation,
    relation: AttributeLocation,
}

impl EntityRelation {
    pub fn new(
        relation_type: RelationType,
        source: impl Into<AttributeLocation>,
        relation: impl Into<AttributeLocation>,
    ) -> Self {
        Self {
            relation_type,
            source: source.into(),
            relation: relation.into(),
        }
    }

    pub fn inner_join(source: impl Into<AttributeLocation>, relation: impl Into<AttributeLocation>) -> Self {
        Self::new(RelationType::InnerJoin, source, relation)
    }

    pub fn left_join(source: impl Into<AttributeLocation>, relation: impl Into<AttributeLocation>) -> Self {
        Self::new(RelationType::LeftJoin, source, relation)
    }

    pub fn relation_type(&self) -> RelationType {
        self.relation_type
    }

    pub fn source_location(&self) -> &AttributeLocation {
        &self.source
    }

    pub fn relation_location(&self) -> &AttributeLocation {
        &self.relation
    }

    pub fn source_entity_alias(&self) -> Option<&str> {
        self.source.entity_alias()
    }

    pub fn relation_entity_alias(&self) -> Option<&str> {
        self.relation.entity_alias()
    }
}

impl fmt::Display for EntityRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.relation_type {
            RelationType::InnerJoin => "INNER",
            RelationType::LeftJoin => "LEFT",
        };
        write!(f, "{} {} = {}", kind, self.source, self.relation)
    }
}

fn locate<E: Entity>(property: Property<E>, alias: Option<&str>) -> AttributeLocation {
    match alias {
        Some(alias) => property.aliased(alias),
        None => property.into(),
    }
}

// =============================================================================
// Join overloads
// =============================================================================

/// Join overloads shared by every builder that accumulates relations for `Item`.
///
/// The `*_from` forms join from an entity that was itself joined earlier,
/// which builds transitive join chains. Nothing checks that the left side was
/// joined first; an unreachable source only surfaces when a clause is compiled.
pub trait JoinExt: Sized {
    type Item: Entity;

    /// Append one relation.
    fn with_relation(self, relation: EntityRelation) -> Self;

    /// Join `R` to the root item.
    fn inner_join<R: Entity>(self, source: Property<Self::Item>, relation: Property<R>) -> Self {
        self.with_relation(EntityRelation::inner_join(source, relation))
    }

    /// Join an aliased occurrence of `R` to the root item.
    fn inner_join_aliased<R: Entity>(
        self,
        source: Property<Self::Item>,
        relation: Property<R>,
        relation_alias: &str,
    ) -> Self {
        self.with_relation(EntityRelation::inner_join(
            source,
            relation.aliased(relation_alias),
        ))
    }

    /// Join `R` to an already joined `L`.
    fn inner_join_from<L: Entity, R: Entity>(self, source: Property<L>, relation: Property<R>) -> Self {
        self.with_relation(EntityRelation::inner_join(source, relation))
    }

    fn inner_join_from_aliased<L: Entity, R: Entity>(
        self,
        source: Property<L>,
        source_alias: Option<&str>,
        relation: Property<R>,
        relation_alias: Option<&str>,
    ) -> Self {
        self.with_relation(EntityRelation::inner_join(
            locate(source, source_alias),
            locate(relation, relation_alias),
        ))
    }

    fn left_join<R: Entity>(self, source: Property<Self::Item>, relation: Property<R>) -> Self {
        self.with_relation(EntityRelation::left_join(source, relation))
    }

    fn left_join_aliased<R: Entity>(
        self,
        source: Property<Self::Item>,
        relation: Property<R>,
        relation_alias: &str,
    ) -> Self {
        self.with_relation(EntityRelation::left_join(
            source,
            relation.aliased(relation_alias),
        ))
    }

    fn left_join_from<L: Entity, R: Entity>(self, source: Property<L>, relation: Property<R>) -> Self {
        self.with_relation(EntityRelation::left_join(source, relation))
    }

    fn left_join_from_aliased<L: Entity, R: Entity>(
        self,
        source: Property<L>,
        source_alias: Option<&str>,
        relation: Property<R>,
        relation_alias: Option<&str>,
    ) -> Self {
        self.with_relation(EntityRelation::left_join(
            locate(source, source_alias),
            locate(relation, relation_alias),
        ))
    }
}

// =============================================================================
// Relation set
// =============================================================================

/// An ordered list of relations rooted at `T`.
#[must_use = "builders have no effect until used"]
pub struct EntityRelationSet<T> {
    relations: Vec<EntityRelation>,
    _item: PhantomData<fn() -> T>,
}

impl<T: Entity> EntityRelationSet<T> {
    pub fn new() -> Self {
        Self {
            relations: Vec::new(),
            _item: PhantomData,
        }
    }

    pub fn relations(&self) -> &[EntityRelation] {
        &self.relations
    }

    pub fn into_relations(self) -> Vec<EntityRelation> {
        self.relations
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}

impl<T> Clone for EntityRelationSet<T> {
    fn clone(&self) -> Self {
        Self {
            relations: self.relations.clone(),
            _item: PhantomData,
        }
    }
}

impl<T> fmt::Debug for EntityRelationSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.relations).finish()
    }
}

impl<T: Entity> Default for EntityRelationSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> JoinExt for EntityRelationSet<T> {
    type Item = T;

    fn with_relation(mut self, relation: EntityRelation) -> Self {
        self.relations.push(relation);
        self
    }
}
