//! Resolved entity definitions - the attribute catalog of one entity occurrence.

use super::attribute::EntityAttributeDefinition;
use super::location::{AttributeLocation, EntityLocation};
use super::reference::EntityReference;
use crate::model::PropertyRef;

/// The complete, ordered attribute catalog of an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDefinition {
    entity_reference: EntityReference,
    entity_location: EntityLocation,
    attributes: Vec<EntityAttributeDefinition>,
}

impl EntityDefinition {
    pub(crate) fn new(
        entity_reference: EntityReference,
        entity_location: EntityLocation,
        attributes: Vec<EntityAttributeDefinition>,
    ) -> Self {
        Self {
            entity_reference,
            entity_location,
            attributes,
        }
    }

    pub fn entity_reference(&self) -> &EntityReference {
        &self.entity_reference
    }

    pub fn entity_location(&self) -> &EntityLocation {
        &self.entity_location
    }

    pub fn entity_name(&self) -> &str {
        self.entity_location.name()
    }

    pub fn entity_container(&self) -> Option<&str> {
        self.entity_location.container()
    }

    /// `container.name`, or just the name when there is no container.
    pub fn qualified_name(&self) -> String {
        match self.entity_location.container() {
            Some(container) => format!("{}.{}", container, self.entity_location.name()),
            None => self.entity_location.name().to_string(),
        }
    }

    /// Every attribute in resolution order.
    pub fn all_attributes(&self) -> &[EntityAttributeDefinition] {
        &self.attributes
    }

    /// Columns of the root entity's own table, excluding nested relation columns.
    pub fn direct_attributes(&self) -> impl Iterator<Item = &EntityAttributeDefinition> {
        self.attributes
            .iter()
            .filter(|a| a.is_direct() && a.entity_path().len() == 1)
    }

    pub fn related_attributes(&self) -> impl Iterator<Item = &EntityAttributeDefinition> {
        self.attributes.iter().filter(|a| a.is_related())
    }

    pub fn relation_attributes(&self) -> impl Iterator<Item = &EntityAttributeDefinition> {
        self.attributes.iter().filter(|a| a.is_relation())
    }

    /// Primary key attributes of the root entity itself.
    pub fn primary_key_attributes(&self) -> impl Iterator<Item = &EntityAttributeDefinition> {
        self.direct_attributes().filter(|a| a.is_primary_key())
    }

    /// Attributes that carry a value (everything but relation markers).
    pub fn returnable_attributes(&self) -> impl Iterator<Item = &EntityAttributeDefinition> {
        self.attributes.iter().filter(|a| !a.is_relation())
    }

    /// Root direct attributes written on insert.
    pub fn insertable_attributes(&self) -> impl Iterator<Item = &EntityAttributeDefinition> {
        self.direct_attributes()
            .filter(|a| !a.is_identity_column() && !a.is_mapped())
    }

    /// Root direct attributes written on update.
    pub fn updateable_attributes(&self) -> impl Iterator<Item = &EntityAttributeDefinition> {
        self.direct_attributes()
            .filter(|a| !a.is_primary_key() && !a.is_identity_column() && !a.is_mapped())
    }

    /// The store-generated identity column of the root entity, if any.
    pub fn row_identity(&self) -> Option<&EntityAttributeDefinition> {
        self.direct_attributes().find(|a| a.is_identity_column())
    }

    /// Find the attribute declared by a property.
    ///
    /// Nested relations can declare the same property more than once (two
    /// relations of the same type); the first in resolution order wins.
    pub fn find(&self, property: &PropertyRef) -> Option<&EntityAttributeDefinition> {
        self.attributes.iter().find(|a| &a.property() == property)
    }

    /// Find the attribute an attribute location points at, honoring aliases.
    pub fn find_by_location(&self, location: &AttributeLocation) -> Option<&EntityAttributeDefinition> {
        self.attributes.iter().find(|a| a.matches_location(location))
    }

    /// Find an attribute by its reference name (alias or physical name).
    pub fn find_by_name(&self, reference_name: &str) -> Option<&EntityAttributeDefinition> {
        self.attributes
            .iter()
            .find(|a| a.reference_name().eq_ignore_ascii_case(reference_name))
    }
}
