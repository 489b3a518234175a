//! # startorm
//!
//! Typed query selections and entity definition resolution for a relational
//! mapper.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │           Entity descriptors (model::Entity)             │
//! │   (tables, columns, related attributes, relations)       │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [schema::EntityDefinitionProvider]
//! ┌─────────────────────────────────────────────────────────┐
//! │     EntityDefinition (ordered attribute catalog)         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [query::ItemSelection]
//! ┌─────────────────────────────────────────────────────────┐
//! │      Selection (joins, filters, projection, links)       │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [sql::JoinClause]
//! ┌─────────────────────────────────────────────────────────┐
//! │                   Dialect SQL text                       │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Statement compilation beyond join clauses, and execution, belong to the
//! repository layer built on top of this crate.

pub mod config;
pub mod error;
pub mod model;
pub mod query;
pub mod schema;
pub mod sql;

pub use error::{OrmError, OrmResult};

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::error::{OrmError, OrmResult};
    pub use crate::model::{Entity, EntityDescriptor, EntityType, Member, Property, Value};
    pub use crate::query::{
        EntityRelation, EntityRelationSet, FilterType, ItemSelection, JoinExt, RelationType,
        SelectionLinkType, UniqueMatch, UniqueQuery, ValueFilter,
    };
    pub use crate::schema::{
        definition_of, AnnotationDefinitionProvider, AttributeLocation, EntityDefinition,
        EntityDefinitionProvider, EntityReference,
    };
    pub use crate::sql::{Dialect, JoinClause, SqlDialect};
}
