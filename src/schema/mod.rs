//! Schema resolution: entity references, locations and attribute catalogs.

pub mod attribute;
pub mod definition;
pub mod location;
pub mod provider;
pub mod reference;

pub use attribute::{AttributeFlags, AttributeKind, EntityAttributeDefinition};
pub use definition::EntityDefinition;
pub use location::{AttributeLocation, EntityLocation};
pub use provider::{definition_of, AnnotationDefinitionProvider, EntityDefinitionProvider};
pub use reference::EntityReference;
