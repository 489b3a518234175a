//! Entity definition resolution.
//!
//! The provider walks an entity type's descriptor and produces its flattened,
//! ordered attribute catalog:
//!
//! 1. Direct columns, by ascending ordinal; columns without an ordinal follow
//!    in declaration order.
//! 2. Related attributes, each owned by a virtual location for the related
//!    entity.
//! 3. Nested relations: the relation marker itself, then (recursively) the
//!    related type's own columns, related attributes and relations, with the
//!    entity path extended by the relation's location.
//!
//! # Caching
//!
//! Entity locations are cached process-wide, keyed by the reference's string
//! form. Definitions are cached per provider, keyed by reference. Both are
//! concurrent maps with compute-if-absent semantics, so every key is resolved
//! once and the result never changes afterwards.

use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use tracing::debug;

use super::attribute::{AttributeFlags, AttributeKind, EntityAttributeDefinition};
use super::definition::EntityDefinition;
use super::location::EntityLocation;
use super::reference::EntityReference;
use crate::config::DefinitionSettings;
use crate::model::{Entity, EntityType, MemberDescriptor, MemberKind};

static ENTITY_LOCATIONS: LazyLock<DashMap<String, EntityLocation>> = LazyLock::new(DashMap::new);

/// Resolves entity types into attribute catalogs and physical locations.
pub trait EntityDefinitionProvider: Send + Sync {
    /// Resolve the definition of one entity occurrence.
    fn resolve_reference(&self, reference: &EntityReference) -> Arc<EntityDefinition>;

    /// Resolve the physical location of one entity occurrence.
    fn get_entity_location(&self, reference: &EntityReference) -> EntityLocation;

    /// Resolve the definition of the primary (un-aliased) occurrence of a type.
    fn resolve(&self, entity_type: EntityType) -> Arc<EntityDefinition> {
        self.resolve_reference(&EntityReference::new(entity_type))
    }

    /// The ordered attribute catalog of a type.
    fn resolve_definitions(&self, entity_type: EntityType) -> Vec<EntityAttributeDefinition> {
        self.resolve(entity_type).all_attributes().to_vec()
    }
}

/// Resolve the definition of `T` through any provider.
pub fn definition_of<T: Entity>(provider: &dyn EntityDefinitionProvider) -> Arc<EntityDefinition> {
    provider.resolve(EntityType::of::<T>())
}

/// Definition provider driven by entity descriptors.
#[derive(Debug, Default)]
pub struct AnnotationDefinitionProvider {
    definitions: DashMap<EntityReference, Arc<EntityDefinition>>,
}

impl AnnotationDefinitionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: &DefinitionSettings) -> Self {
        Self {
            definitions: DashMap::with_capacity(settings.initial_capacity),
        }
    }

    /// Number of entity occurrences resolved by this provider so far.
    pub fn cached_definitions(&self) -> usize {
        self.definitions.len()
    }

    fn build_definition(&self, reference: &EntityReference) -> EntityDefinition {
        let root = self.get_entity_location(reference);
        let mut walker = Walker {
            provider: self,
            attributes: Vec::new(),
        };
        walker.collect(reference.entity_type, vec![root.clone()], Vec::new(), "");

        let mut attributes = walker.attributes;
        for (ordinal, attribute) in attributes.iter_mut().enumerate() {
            attribute.ordinal = ordinal;
        }

        debug!(
            entity = %reference,
            attributes = attributes.len(),
            "resolved entity definition"
        );
        EntityDefinition::new(reference.clone(), root, attributes)
    }
}

impl EntityDefinitionProvider for AnnotationDefinitionProvider {
    fn resolve_reference(&self, reference: &EntityReference) -> Arc<EntityDefinition> {
        if let Some(found) = self.definitions.get(reference) {
            return Arc::clone(found.value());
        }
        let entry = self
            .definitions
            .entry(reference.clone())
            .or_insert_with(|| Arc::new(self.build_definition(reference)));
        Arc::clone(entry.value())
    }

    fn get_entity_location(&self, reference: &EntityReference) -> EntityLocation {
        let key = reference.to_string();
        if let Some(found) = ENTITY_LOCATIONS.get(&key) {
            return found.value().clone();
        }
        ENTITY_LOCATIONS
            .entry(key)
            .or_insert_with(|| locate(reference))
            .value()
            .clone()
    }
}

/// Compute the physical location of an entity occurrence.
///
/// Types without table metadata fall back to their namespace and type name,
/// so every type resolves to some name.
fn locate(reference: &EntityReference) -> EntityLocation {
    let entity_type = reference.entity_type;
    let descriptor = entity_type.descriptor();

    let (container, name) = match descriptor.table() {
        Some(table) => {
            let container = table.schema.as_deref().unwrap_or_else(|| {
                debug!(entity = %entity_type, "no schema declared, using namespace");
                descriptor.namespace()
            });
            (container, table.name.as_str())
        }
        None => {
            debug!(entity = %entity_type, "no table declared, using namespace and type name");
            (descriptor.namespace(), descriptor.name())
        }
    };

    let location = EntityLocation::new(entity_type, Some(container), name)
        .with_alias(reference.entity_alias.as_deref());
    debug!(entity = %reference, location = %location, "resolved entity location");
    location
}

// =============================================================================
// Descriptor walk
// =============================================================================

struct Walker<'p> {
    provider: &'p AnnotationDefinitionProvider,
    attributes: Vec<EntityAttributeDefinition>,
}

impl Walker<'_> {
    fn collect(
        &mut self,
        entity_type: EntityType,
        path: Vec<EntityLocation>,
        relation_chain: Vec<&'static MemberDescriptor>,
        alias_prefix: &str,
    ) {
        let descriptor = entity_type.descriptor();

        let mut columns: Vec<(usize, &'static MemberDescriptor, Option<u32>)> = descriptor
            .members()
            .iter()
            .enumerate()
            .filter_map(|(index, member)| match member.kind() {
                MemberKind::Column { ordinal, .. } => Some((index, member, *ordinal)),
                _ => None,
            })
            .collect();
        columns.sort_by_key(|(index, _, ordinal)| (ordinal.is_none(), *ordinal, *index));

        for (_, member, _) in columns {
            let MemberKind::Column { physical_name, .. } = member.kind() else {
                continue;
            };
            let physical = physical_name.as_deref().unwrap_or(member.name());
            self.push(
                entity_type,
                path.clone(),
                &relation_chain,
                member,
                physical,
                AttributeKind::Direct,
                alias_prefix,
            );
        }

        for member in descriptor.members() {
            let MemberKind::RelatedAttribute {
                entity,
                entity_alias,
                physical_name,
            } = member.kind()
            else {
                continue;
            };
            let reference = EntityReference::new(entity())
                .in_container(entity_type)
                .with_alias(entity_alias.as_deref());
            let related = self.provider.get_entity_location(&reference).into_virtual();

            let mut related_path = path.clone();
            related_path.push(related);
            let physical = physical_name.as_deref().unwrap_or(member.name());
            self.push(
                entity_type,
                related_path,
                &relation_chain,
                member,
                physical,
                AttributeKind::Related {
                    explicit: physical_name.is_some(),
                },
                alias_prefix,
            );
        }

        for member in descriptor.members() {
            let MemberKind::Relation { entity } = member.kind() else {
                continue;
            };
            let target = entity();
            if path.iter().any(|location| location.entity_type() == target) {
                debug!(
                    entity = %entity_type,
                    relation = member.name(),
                    "skipping recursive relation"
                );
                continue;
            }

            self.push(
                entity_type,
                path.clone(),
                &relation_chain,
                member,
                member.name(),
                AttributeKind::Relation,
                "",
            );

            let reference = EntityReference::new(target)
                .in_container(entity_type)
                .with_alias(Some(member.name()));
            let mut nested_path = path.clone();
            nested_path.push(self.provider.get_entity_location(&reference));
            let mut nested_chain = relation_chain.clone();
            nested_chain.push(member);
            let nested_prefix = format!("{}{}", alias_prefix, member.name());

            self.collect(target, nested_path, nested_chain, &nested_prefix);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn push(
        &mut self,
        declaring_type: EntityType,
        entity_path: Vec<EntityLocation>,
        relation_chain: &[&'static MemberDescriptor],
        member: &'static MemberDescriptor,
        physical_name: &str,
        kind: AttributeKind,
        alias_prefix: &str,
    ) {
        let candidate = format!("{}{}", alias_prefix, member.name());
        let alias = (kind != AttributeKind::Relation && !candidate.eq_ignore_ascii_case(physical_name))
            .then_some(candidate);

        self.attributes.push(EntityAttributeDefinition {
            entity_path,
            declaring_type,
            property_name: member.name(),
            physical_name: physical_name.to_string(),
            kind,
            flags: AttributeFlags {
                primary_key: member.is_primary_key(),
                identity: member.is_identity(),
                mapped: member.is_mapped(),
            },
            ordinal: 0,
            alias,
            relation_chain: relation_chain.to_vec(),
            member,
        });
    }
}
