//! Unique queries - selections that identify one specific item.

use std::any::Any;
use std::fmt;

use tracing::warn;

use super::selection::ItemSelection;
use crate::error::OrmResult;
use crate::model::{Entity, EntityType};
use crate::schema::{AttributeLocation, EntityAttributeDefinition, EntityDefinitionProvider, EntityReference};

/// How a [`UniqueQuery`] derived its filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniqueMatch {
    /// One equality per primary key attribute.
    PrimaryKey,
    /// The entity declares no key; every direct attribute is matched.
    /// Such a selection can match several rows, or none once any column changes.
    AllDirectAttributes,
}

/// An [`ItemSelection`] matching a given item by its key values.
pub struct UniqueQuery<T> {
    selection: ItemSelection<T>,
    match_mode: UniqueMatch,
}

impl<T: Entity> UniqueQuery<T> {
    pub fn new(provider: &dyn EntityDefinitionProvider, item: &T) -> OrmResult<Self> {
        let definition = provider.resolve(EntityType::of::<T>());

        let mut attributes: Vec<&EntityAttributeDefinition> =
            definition.primary_key_attributes().collect();
        let match_mode = if attributes.is_empty() {
            attributes = definition.direct_attributes().collect();
            warn!(
                entity = %definition.entity_reference(),
                attributes = attributes.len(),
                "no primary key declared, matching on all direct attributes"
            );
            UniqueMatch::AllDirectAttributes
        } else {
            UniqueMatch::PrimaryKey
        };

        let root = EntityReference::of::<T>();
        let mut selection = ItemSelection::new();
        for attribute in attributes {
            let value = attribute.get_value(item as &dyn Any)?;
            let location = AttributeLocation::new(attribute.property(), root.clone());
            selection = selection.where_equal(location, value);
        }

        Ok(Self {
            selection,
            match_mode,
        })
    }

    pub fn selection(&self) -> &ItemSelection<T> {
        &self.selection
    }

    pub fn into_selection(self) -> ItemSelection<T> {
        self.selection
    }

    pub fn match_mode(&self) -> UniqueMatch {
        self.match_mode
    }
}

impl<T> Clone for UniqueQuery<T> {
    fn clone(&self) -> Self {
        Self {
            selection: self.selection.clone(),
            match_mode: self.match_mode,
        }
    }
}

impl<T> fmt::Debug for UniqueQuery<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UniqueQuery")
            .field("selection", &self.selection)
            .field("match_mode", &self.match_mode)
            .finish()
    }
}
