//! Entity metadata and dynamic values.

pub mod descriptor;
pub mod value;

pub use descriptor::{
    Entity, EntityDescriptor, EntityDescriptorBuilder, EntityType, Member, MemberDescriptor,
    MemberKind, Property, PropertyRef, TableMetadata,
};
pub use value::{try_optional, Value};
