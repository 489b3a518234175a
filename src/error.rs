//! Error types for definition resolution and query construction.
//!
//! Building a selection never fails for runtime reasons: missing metadata and
//! missing keys degrade with diagnostics instead. The errors here surface
//! when a value is validated (filters, conversions) or when a consumer tries
//! to resolve something the definitions do not contain.

use crate::query::FilterType;

/// Result type for ORM operations.
pub type OrmResult<T> = Result<T, OrmError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrmError {
    /// An attribute location could not be resolved against an entity definition.
    #[error("Attribute '{attribute}' not found on entity '{entity}'")]
    UnknownAttribute { entity: String, attribute: String },

    /// A filter was constructed with the wrong number of values for its type.
    #[error("{filter_type:?} filter requires {expected} value(s), got {actual}")]
    InvalidFilterValues {
        filter_type: FilterType,
        expected: &'static str,
        actual: usize,
    },

    /// A dynamic value could not be converted to the requested Rust type.
    #[error("Cannot convert {actual} value to {expected}")]
    ValueConversion {
        expected: &'static str,
        actual: &'static str,
    },

    /// The attribute has no write accessor.
    #[error("Attribute '{attribute}' on entity '{entity}' is read-only")]
    MissingSetter { entity: String, attribute: String },

    /// A relation sub-object on the path to an attribute is not populated.
    #[error("Relation '{relation}' on entity '{entity}' is not set")]
    MissingRelation { entity: String, relation: String },
}
