//! Resolved locations of entities and attributes within a schema graph.

use std::fmt;

use super::reference::EntityReference;
use crate::model::{Entity, EntityType, Property, PropertyRef};

// =============================================================================
// Entity Location
// =============================================================================

/// The physical identity of one entity occurrence.
///
/// A virtual location exists only as the logical source of a related
/// attribute; nothing is joined for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityLocation {
    entity_type: EntityType,
    container: Option<String>,
    name: String,
    is_virtual: bool,
    alias: Option<String>,
}

impl EntityLocation {
    pub fn new(entity_type: EntityType, container: Option<&str>, name: &str) -> Self {
        Self {
            entity_type,
            container: container.filter(|c| !c.is_empty()).map(Into::into),
            name: name.into(),
            is_virtual: false,
            alias: None,
        }
    }

    /// Set the alias, dropping it when it only repeats the entity name.
    pub fn with_alias(mut self, alias: Option<&str>) -> Self {
        self.alias = alias
            .filter(|a| !a.is_empty() && !a.eq_ignore_ascii_case(&self.name))
            .map(Into::into);
        self
    }

    pub fn into_virtual(mut self) -> Self {
        self.is_virtual = true;
        self
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    /// Schema (or other container) name.
    pub fn container(&self) -> Option<&str> {
        self.container.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_virtual(&self) -> bool {
        self.is_virtual
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Name this occurrence is referred to by: the alias, else the entity name.
    pub fn reference_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

impl fmt::Display for EntityLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(container) = &self.container {
            write!(f, "{}.", container)?;
        }
        write!(f, "{}", self.name)?;
        if let Some(alias) = &self.alias {
            write!(f, " AS {}", alias)?;
        }
        Ok(())
    }
}

// =============================================================================
// Attribute Location
// =============================================================================

/// A property of a specific entity occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeLocation {
    property: PropertyRef,
    entity_reference: EntityReference,
}

impl AttributeLocation {
    pub fn new(property: PropertyRef, entity_reference: EntityReference) -> Self {
        Self {
            property,
            entity_reference,
        }
    }

    pub fn property(&self) -> PropertyRef {
        self.property
    }

    pub fn property_name(&self) -> &'static str {
        self.property.name
    }

    pub fn entity_reference(&self) -> &EntityReference {
        &self.entity_reference
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity_reference.entity_type
    }

    pub fn entity_alias(&self) -> Option<&str> {
        self.entity_reference.entity_alias.as_deref()
    }
}

impl fmt::Display for AttributeLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.entity_reference.entity_alias {
            Some(alias) => write!(f, "{}.{}", alias, self.property.name),
            None => write!(f, "{}", self.property),
        }
    }
}

impl<E: Entity> From<Property<E>> for AttributeLocation {
    fn from(property: Property<E>) -> Self {
        AttributeLocation::new(property.to_ref(), EntityReference::of::<E>())
    }
}

impl<E: Entity> Property<E> {
    /// Locate this property on an aliased occurrence of `E`.
    pub fn aliased(self, alias: &str) -> AttributeLocation {
        AttributeLocation::new(
            self.to_ref(),
            EntityReference::of::<E>().with_alias(Some(alias)),
        )
    }
}
