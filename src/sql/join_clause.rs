//! Join clause compilation.
//!
//! Renders an ordered list of [`EntityRelation`]s as one `JOIN` line each,
//! resolving tables and columns through an [`EntityDefinitionProvider`]:
//!
//! ```text
//! INNER JOIN [dbo].[DomainIdentity] AS [CreatedBy] ON [dbo].[DomainAggregate].[CreatedByDomainIdentityId] = [CreatedBy].[DomainIdentityId]
//! ```
//!
//! An entity occurrence is referenced by its alias when it has one, otherwise
//! by its schema-qualified table name. A column belongs to the occurrence that
//! owns its attribute.

use super::dialect::Dialect;
use super::token::{Token, TokenStream};
use crate::error::{OrmError, OrmResult};
use crate::query::{EntityRelation, RelationType};
use crate::schema::{AttributeLocation, EntityDefinitionProvider, EntityLocation};

/// The `JOIN` lines of a statement, in declared order.
pub struct JoinClause<'p> {
    provider: &'p dyn EntityDefinitionProvider,
    relations: Vec<EntityRelation>,
}

impl<'p> JoinClause<'p> {
    pub fn new(provider: &'p dyn EntityDefinitionProvider, relations: &[EntityRelation]) -> Self {
        Self {
            provider,
            relations: relations.to_vec(),
        }
    }

    pub fn relations(&self) -> &[EntityRelation] {
        &self.relations
    }

    /// Tokens for every join line, separated by newlines.
    pub fn to_tokens(&self) -> OrmResult<TokenStream> {
        let mut ts = TokenStream::new();
        for (index, relation) in self.relations.iter().enumerate() {
            if index > 0 {
                ts.newline();
            }
            ts.append(&self.relation_tokens(relation)?);
        }
        Ok(ts)
    }

    /// Generate SQL string for a specific dialect.
    pub fn to_sql(&self, dialect: Dialect) -> OrmResult<String> {
        Ok(self.to_tokens()?.serialize(dialect))
    }

    fn relation_tokens(&self, relation: &EntityRelation) -> OrmResult<TokenStream> {
        let (source_entity, source_column) = self.resolve(relation.source_location())?;
        let (joined_entity, joined_column) = self.resolve(relation.relation_location())?;

        let mut ts = TokenStream::new();
        ts.push(match relation.relation_type() {
            RelationType::InnerJoin => Token::Inner,
            RelationType::LeftJoin => Token::Left,
        });
        ts.space().push(Token::Join).space();
        ts.push(table_ident(&joined_entity));
        if let Some(alias) = joined_entity.alias() {
            ts.space()
                .push(Token::As)
                .space()
                .push(Token::Ident(alias.to_string()));
        }
        ts.space().push(Token::On).space();
        ts.push(reference_ident(&source_entity))
            .push(Token::Dot)
            .push(Token::Ident(source_column));
        ts.space().push(Token::Eq).space();
        ts.push(reference_ident(&joined_entity))
            .push(Token::Dot)
            .push(Token::Ident(joined_column));
        Ok(ts)
    }

    /// The entity occurrence that owns the attribute, and its physical column.
    ///
    /// Related attributes are owned by the related entity's location, not the
    /// root table that declares them.
    fn resolve(&self, location: &AttributeLocation) -> OrmResult<(EntityLocation, String)> {
        let definition = self.provider.resolve_reference(location.entity_reference());
        let attribute = definition
            .find_by_location(location)
            .filter(|attribute| !attribute.is_relation())
            .ok_or_else(|| OrmError::UnknownAttribute {
                entity: location.entity_type().to_string(),
                attribute: location.property_name().to_string(),
            })?;
        Ok((attribute.entity().clone(), attribute.physical_name().to_string()))
    }
}

fn table_ident(location: &EntityLocation) -> Token {
    Token::QualifiedIdent {
        schema: location.container().map(Into::into),
        name: location.name().to_string(),
    }
}

fn reference_ident(location: &EntityLocation) -> Token {
    match location.alias() {
        Some(alias) => Token::Ident(alias.to_string()),
        None => table_ident(location),
    }
}
