//! SQL text generation.
//!
//! - [`token`] - Token types for SQL generation
//! - [`dialect`] - SQL dialect implementations
//! - [`join_clause`] - `JOIN` lines compiled from entity relations

pub mod dialect;
pub mod join_clause;
pub mod token;

pub use dialect::{Dialect, SqlDialect};
pub use join_clause::JoinClause;
pub use token::{Token, TokenStream};
