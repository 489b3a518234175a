//! Resolved attribute definitions.

use std::any::Any;
use std::fmt;

use super::location::{AttributeLocation, EntityLocation};
use crate::error::{OrmError, OrmResult};
use crate::model::descriptor::MemberAccessor;
use crate::model::{EntityType, MemberDescriptor, PropertyRef, Value};

/// Structural kind of an attribute. Every attribute has exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    /// A column of the owning entity's table.
    Direct,
    /// An attribute of a related entity, flattened onto the declaring type.
    /// `explicit` is set when the stored name is overridden on the member.
    Related { explicit: bool },
    /// A nested one-to-one sub-object.
    Relation,
}

/// Independent modifiers of an attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AttributeFlags {
    pub primary_key: bool,
    pub identity: bool,
    pub mapped: bool,
}

/// One mapped attribute of a resolved entity.
///
/// Equality is structural over the resolved shape; accessors are not compared.
#[derive(Clone)]
pub struct EntityAttributeDefinition {
    pub(crate) entity_path: Vec<EntityLocation>,
    pub(crate) declaring_type: EntityType,
    pub(crate) property_name: &'static str,
    pub(crate) physical_name: String,
    pub(crate) kind: AttributeKind,
    pub(crate) flags: AttributeFlags,
    pub(crate) ordinal: usize,
    pub(crate) alias: Option<String>,
    pub(crate) relation_chain: Vec<&'static MemberDescriptor>,
    pub(crate) member: &'static MemberDescriptor,
}

impl EntityAttributeDefinition {
    /// Locations from the root entity to the owner of this attribute.
    pub fn entity_path(&self) -> &[EntityLocation] {
        &self.entity_path
    }

    /// The location that owns this attribute (virtual for related attributes).
    pub fn entity(&self) -> &EntityLocation {
        // Paths always start at the root location.
        &self.entity_path[self.entity_path.len() - 1]
    }

    /// The location of the type that declares the member.
    pub fn declaring_location(&self) -> &EntityLocation {
        match self.kind {
            AttributeKind::Related { .. } if self.entity_path.len() > 1 => {
                &self.entity_path[self.entity_path.len() - 2]
            }
            _ => self.entity(),
        }
    }

    pub fn declaring_type(&self) -> EntityType {
        self.declaring_type
    }

    pub fn property_name(&self) -> &'static str {
        self.property_name
    }

    pub fn property(&self) -> PropertyRef {
        PropertyRef {
            entity: self.declaring_type,
            name: self.property_name,
        }
    }

    pub fn physical_name(&self) -> &str {
        &self.physical_name
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Name the attribute is returned under: the alias, else the physical name.
    pub fn reference_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.physical_name)
    }

    pub fn kind(&self) -> AttributeKind {
        self.kind
    }

    pub fn flags(&self) -> AttributeFlags {
        self.flags
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn is_direct(&self) -> bool {
        self.kind == AttributeKind::Direct
    }

    pub fn is_related(&self) -> bool {
        matches!(self.kind, AttributeKind::Related { .. })
    }

    pub fn is_explicit_related(&self) -> bool {
        self.kind == AttributeKind::Related { explicit: true }
    }

    pub fn is_relation(&self) -> bool {
        self.kind == AttributeKind::Relation
    }

    pub fn is_primary_key(&self) -> bool {
        self.flags.primary_key
    }

    pub fn is_identity_column(&self) -> bool {
        self.flags.identity
    }

    pub fn is_mapped(&self) -> bool {
        self.flags.mapped
    }

    /// Whether this attribute is the one an attribute location points at.
    pub fn matches_location(&self, location: &AttributeLocation) -> bool {
        let declaring = self.declaring_location();
        self.property_name == location.property_name()
            && self.declaring_type == location.entity_type()
            && declaring.alias() == location.entity_alias().filter(|a| !a.eq_ignore_ascii_case(declaring.name()))
    }

    fn unknown(&self) -> OrmError {
        OrmError::UnknownAttribute {
            entity: self.declaring_type.to_string(),
            attribute: self.property_name.to_string(),
        }
    }

    fn owner<'a>(&self, root: &'a dyn Any) -> OrmResult<&'a dyn Any> {
        let mut current = root;
        for step in &self.relation_chain {
            if let MemberAccessor::Relation { get, .. } = &step.accessor {
                current = get(current).ok_or_else(|| OrmError::MissingRelation {
                    entity: self.entity_path[0].entity_type().to_string(),
                    relation: step.name().to_string(),
                })?;
            }
        }
        Ok(current)
    }

    /// Read this attribute's value from a root entity instance.
    ///
    /// Relation attributes have no scalar value and read as `Null`.
    pub fn get_value(&self, root: &dyn Any) -> OrmResult<Value> {
        let owner = self.owner(root)?;
        match &self.member.accessor {
            MemberAccessor::Value { get, .. } => get(owner).ok_or_else(|| self.unknown()),
            _ => Ok(Value::Null),
        }
    }

    /// Borrow the sub-object of a relation attribute, if it is populated.
    pub fn get_relation<'a>(&self, root: &'a dyn Any) -> OrmResult<Option<&'a dyn Any>> {
        let owner = self.owner(root)?;
        match &self.member.accessor {
            MemberAccessor::Relation { get, .. } => Ok(get(owner)),
            _ => Err(self.unknown()),
        }
    }

    /// Write this attribute's value into a root entity instance.
    pub fn set_value(&self, root: &mut dyn Any, value: Value) -> OrmResult<()> {
        let mut current = root;
        for step in &self.relation_chain {
            if let MemberAccessor::Relation { get_mut, .. } = &step.accessor {
                current = get_mut(current).ok_or_else(|| OrmError::MissingRelation {
                    entity: self.entity_path[0].entity_type().to_string(),
                    relation: step.name().to_string(),
                })?;
            }
        }
        match &self.member.accessor {
            MemberAccessor::Value { set: Some(set), .. } => {
                set(current, value).unwrap_or_else(|| Err(self.unknown()))
            }
            _ => Err(OrmError::MissingSetter {
                entity: self.declaring_type.to_string(),
                attribute: self.property_name.to_string(),
            }),
        }
    }
}

impl PartialEq for EntityAttributeDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.entity_path == other.entity_path
            && self.declaring_type == other.declaring_type
            && self.property_name == other.property_name
            && self.physical_name == other.physical_name
            && self.kind == other.kind
            && self.flags == other.flags
            && self.ordinal == other.ordinal
            && self.alias == other.alias
    }
}

impl Eq for EntityAttributeDefinition {}

impl fmt::Debug for EntityAttributeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityAttributeDefinition")
            .field("entity", &self.entity().to_string())
            .field("property_name", &self.property_name)
            .field("physical_name", &self.physical_name)
            .field("kind", &self.kind)
            .field("flags", &self.flags)
            .field("ordinal", &self.ordinal)
            .field("alias", &self.alias)
            .finish()
    }
}

impl fmt::Display for EntityAttributeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.entity().reference_name(), self.physical_name)?;
        if let Some(alias) = &self.alias {
            write!(f, " AS {}", alias)?;
        }
        Ok(())
    }
}
