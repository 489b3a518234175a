//! Query model: filters, relations and item selections.

pub mod filter;
pub mod relation;
pub mod selection;
pub mod unique;

pub use filter::{FilterType, ValueFilter};
pub use relation::{EntityRelation, EntityRelationSet, JoinExt, RelationType};
pub use selection::{ItemSelection, LinkedSelection, SelectionLinkType};
pub use unique::{UniqueMatch, UniqueQuery};
