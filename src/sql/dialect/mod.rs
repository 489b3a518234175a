//! SQL dialects: identifier quoting for the join compiler.
//!
//! Each dialect implements `SqlDialect` to quote identifiers:
//! `[]` (T-SQL), `"` (PostgreSQL), `` ` `` (MySQL).
//!
//! # Usage
//!
//! ```ignore
//! use startorm::sql::{Dialect, SqlDialect};
//!
//! let dialect: Dialect = "postgres".parse()?;
//! let quoted = dialect.quote_identifier("user");  // "user"
//! ```

pub mod helpers;

use std::str::FromStr;

/// Formatting rules of one SQL dialect.
pub trait SqlDialect: std::fmt::Debug {
    /// Dialect name, as accepted by `Dialect::from_str`.
    fn name(&self) -> &'static str;

    /// Quote an identifier, escaping the closing quote character.
    fn quote_identifier(&self, ident: &str) -> String;
}

/// SQL Server / Azure SQL.
#[derive(Debug, Clone, Copy)]
pub struct TSql;

/// PostgreSQL.
#[derive(Debug, Clone, Copy)]
pub struct Postgres;

/// MySQL.
#[derive(Debug, Clone, Copy)]
pub struct MySql;

impl SqlDialect for TSql {
    fn name(&self) -> &'static str {
        "tsql"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_bracket(ident)
    }
}

impl SqlDialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }
}

impl SqlDialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_backtick(ident)
    }
}

/// The supported dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    #[default]
    TSql,
    Postgres,
    MySql,
}

impl Dialect {
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::TSql => &TSql,
            Dialect::Postgres => &Postgres,
            Dialect::MySql => &MySql,
        }
    }
}

impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tsql" | "mssql" | "sqlserver" => Ok(Dialect::TSql),
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            "mysql" => Ok(Dialect::MySql),
            _ => Err(format!("Unknown dialect: {}", s)),
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dialect().name())
    }
}
