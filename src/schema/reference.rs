//! Entity references - lookup keys for entity occurrences.

use std::fmt;

use crate::model::{Entity, EntityType};

/// Identifies one occurrence of an entity type before its location is resolved.
///
/// `entity_alias` is `None` for the primary (un-aliased) appearance of the type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityReference {
    pub entity_type: EntityType,
    pub container_type: Option<EntityType>,
    pub entity_alias: Option<String>,
}

impl EntityReference {
    pub fn new(entity_type: EntityType) -> Self {
        Self {
            entity_type,
            container_type: None,
            entity_alias: None,
        }
    }

    pub fn of<T: Entity>() -> Self {
        Self::new(EntityType::of::<T>())
    }

    /// Set the occurrence alias. Empty aliases are treated as no alias.
    pub fn with_alias(mut self, alias: Option<&str>) -> Self {
        self.entity_alias = alias.filter(|a| !a.is_empty()).map(Into::into);
        self
    }

    pub fn in_container(mut self, container: EntityType) -> Self {
        self.container_type = Some(container);
        self
    }
}

impl fmt::Display for EntityReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(container) = &self.container_type {
            write!(f, "{}/", container)?;
        }
        write!(f, "{}", self.entity_type)?;
        if let Some(alias) = &self.entity_alias {
            write!(f, " AS {}", alias)?;
        }
        Ok(())
    }
}
