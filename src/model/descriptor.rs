//! Entity descriptors - the declarative metadata the definition provider walks.
//!
//! Each mapped type implements [`Entity`] and builds its descriptor once:
//!
//! ```ignore
//! impl Entity for SubContainerRow {
//!     fn descriptor() -> &'static EntityDescriptor {
//!         static DESCRIPTOR: LazyLock<EntityDescriptor> = LazyLock::new(|| {
//!             EntityDescriptor::builder::<SubContainerRow>()
//!                 .table(Some("dbo"), "SubContainer")
//!                 .member(Member::column("SubContainerId", |r: &SubContainerRow| r.id.into()).primary_key().identity())
//!                 .member(Member::column("Name", |r: &SubContainerRow| r.name.as_str().into()))
//!                 .build()
//!         });
//!         &DESCRIPTOR
//!     }
//! }
//! ```

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

use super::value::Value;
use crate::error::OrmResult;

pub(crate) type ValueGetter = Arc<dyn Fn(&dyn Any) -> Option<Value> + Send + Sync>;
pub(crate) type ValueSetter = Arc<dyn Fn(&mut dyn Any, Value) -> Option<OrmResult<()>> + Send + Sync>;
pub(crate) type RelationGetter = Arc<dyn for<'a> Fn(&'a dyn Any) -> Option<&'a dyn Any> + Send + Sync>;
pub(crate) type RelationGetterMut =
    Arc<dyn for<'a> Fn(&'a mut dyn Any) -> Option<&'a mut dyn Any> + Send + Sync>;

/// A type mapped to persistent storage.
pub trait Entity: Any + Send + Sync + Sized {
    /// Declarative metadata for this type. Built once, lives for the process.
    fn descriptor() -> &'static EntityDescriptor;
}

// =============================================================================
// Entity Type
// =============================================================================

/// Handle to a mapped type's descriptor. Compared by Rust type identity.
#[derive(Clone, Copy)]
pub struct EntityType(&'static EntityDescriptor);

impl EntityType {
    pub fn of<T: Entity>() -> Self {
        EntityType(T::descriptor())
    }

    pub fn descriptor(&self) -> &'static EntityDescriptor {
        self.0
    }

    pub fn name(&self) -> &'static str {
        self.0.name
    }

    pub fn namespace(&self) -> &'static str {
        self.0.namespace
    }
}

impl PartialEq for EntityType {
    fn eq(&self, other: &Self) -> bool {
        self.0.type_id == other.0.type_id
    }
}

impl Eq for EntityType {}

impl Hash for EntityType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.type_id.hash(state);
    }
}

impl fmt::Debug for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityType({})", self)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.namespace.is_empty() {
            write!(f, "{}", self.0.name)
        } else {
            write!(f, "{}::{}", self.0.namespace, self.0.name)
        }
    }
}

// =============================================================================
// Descriptors
// =============================================================================

/// Table (or view) metadata declared on an entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMetadata {
    pub schema: Option<String>,
    pub name: String,
}

/// How a member participates in the mapping.
#[derive(Debug, Clone)]
pub enum MemberKind {
    /// A column of the entity's own table.
    Column {
        physical_name: Option<String>,
        ordinal: Option<u32>,
    },
    /// A flattened attribute of another entity, carried on this type.
    RelatedAttribute {
        entity: fn() -> EntityType,
        entity_alias: Option<String>,
        physical_name: Option<String>,
    },
    /// A nested one-to-one sub-object that is itself fully mapped.
    Relation { entity: fn() -> EntityType },
    /// Not mapped.
    Ignored,
}

pub(crate) enum MemberAccessor {
    Value {
        get: ValueGetter,
        set: Option<ValueSetter>,
    },
    Relation {
        get: RelationGetter,
        get_mut: RelationGetterMut,
    },
    None,
}

/// One declared member of an entity type.
pub struct MemberDescriptor {
    name: &'static str,
    kind: MemberKind,
    primary_key: bool,
    identity: bool,
    mapped: bool,
    pub(crate) accessor: MemberAccessor,
}

impl MemberDescriptor {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> &MemberKind {
        &self.kind
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    pub fn is_identity(&self) -> bool {
        self.identity
    }

    pub fn is_mapped(&self) -> bool {
        self.mapped
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self.kind, MemberKind::Ignored)
    }

    /// Read this member's value from an instance of the declaring type.
    ///
    /// Returns `None` for relation and ignored members, or when `item` is not
    /// an instance of the declaring type.
    pub fn get_value(&self, item: &dyn Any) -> Option<Value> {
        match &self.accessor {
            MemberAccessor::Value { get, .. } => get(item),
            _ => None,
        }
    }
}

impl fmt::Debug for MemberDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("primary_key", &self.primary_key)
            .field("identity", &self.identity)
            .field("mapped", &self.mapped)
            .finish()
    }
}

/// The declarative metadata of one entity type.
#[derive(Debug)]
pub struct EntityDescriptor {
    type_id: TypeId,
    name: &'static str,
    namespace: &'static str,
    table: Option<TableMetadata>,
    members: Vec<MemberDescriptor>,
}

impl EntityDescriptor {
    /// Start a descriptor for `T`. Name and namespace default to the Rust
    /// type name and module path.
    pub fn builder<T: Entity>() -> EntityDescriptorBuilder<T> {
        let full = std::any::type_name::<T>();
        let (namespace, name) = full.rsplit_once("::").unwrap_or(("", full));
        EntityDescriptorBuilder {
            descriptor: EntityDescriptor {
                type_id: TypeId::of::<T>(),
                name,
                namespace,
                table: None,
                members: Vec::new(),
            },
            _entity: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn namespace(&self) -> &'static str {
        self.namespace
    }

    pub fn table(&self) -> Option<&TableMetadata> {
        self.table.as_ref()
    }

    /// Members in declaration order.
    pub fn members(&self) -> &[MemberDescriptor] {
        &self.members
    }

    pub fn member(&self, name: &str) -> Option<&MemberDescriptor> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// Builder for [`EntityDescriptor`].
#[must_use = "builders have no effect until built"]
pub struct EntityDescriptorBuilder<T> {
    descriptor: EntityDescriptor,
    _entity: PhantomData<fn(&T)>,
}

impl<T: Entity> EntityDescriptorBuilder<T> {
    pub fn name(mut self, name: &'static str) -> Self {
        self.descriptor.name = name;
        self
    }

    pub fn namespace(mut self, namespace: &'static str) -> Self {
        self.descriptor.namespace = namespace;
        self
    }

    pub fn table(mut self, schema: Option<&str>, name: &str) -> Self {
        self.descriptor.table = Some(TableMetadata {
            schema: schema.map(Into::into),
            name: name.into(),
        });
        self
    }

    pub fn member(mut self, member: Member<T>) -> Self {
        self.descriptor.members.push(member.inner);
        self
    }

    pub fn build(self) -> EntityDescriptor {
        self.descriptor
    }
}

// =============================================================================
// Member builder
// =============================================================================

// Pin closure signatures to the higher-ranked forms stored in the accessors.
fn relation_getter<F>(f: F) -> F
where
    F: for<'a> Fn(&'a dyn Any) -> Option<&'a dyn Any>,
{
    f
}

fn relation_getter_mut<F>(f: F) -> F
where
    F: for<'a> Fn(&'a mut dyn Any) -> Option<&'a mut dyn Any>,
{
    f
}

/// A member declaration on entity type `T`.
#[must_use = "builders have no effect until added to a descriptor"]
pub struct Member<T> {
    inner: MemberDescriptor,
    _entity: PhantomData<fn(&T)>,
}

impl<T: Entity> Member<T> {
    fn with(name: &'static str, kind: MemberKind, accessor: MemberAccessor) -> Self {
        Self {
            inner: MemberDescriptor {
                name,
                kind,
                primary_key: false,
                identity: false,
                mapped: false,
                accessor,
            },
            _entity: PhantomData,
        }
    }

    fn value_accessor<F>(get: F) -> MemberAccessor
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        MemberAccessor::Value {
            get: Arc::new(move |item: &dyn Any| item.downcast_ref::<T>().map(&get)),
            set: None,
        }
    }

    /// A column of `T`'s own table.
    pub fn column<F>(name: &'static str, get: F) -> Self
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        Self::with(
            name,
            MemberKind::Column {
                physical_name: None,
                ordinal: None,
            },
            Self::value_accessor(get),
        )
    }

    /// An attribute of entity `R`, flattened onto `T`.
    pub fn related<R: Entity, F>(name: &'static str, get: F) -> Self
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        Self::with(
            name,
            MemberKind::RelatedAttribute {
                entity: EntityType::of::<R>,
                entity_alias: None,
                physical_name: None,
            },
            Self::value_accessor(get),
        )
    }

    /// A nested one-to-one sub-object of type `R`.
    pub fn relation<R, G, M>(name: &'static str, get: G, get_mut: M) -> Self
    where
        R: Entity,
        G: Fn(&T) -> Option<&R> + Send + Sync + 'static,
        M: Fn(&mut T) -> Option<&mut R> + Send + Sync + 'static,
    {
        let get = relation_getter(move |item: &dyn Any| {
            item.downcast_ref::<T>()
                .and_then(|t| get(t))
                .map(|r| r as &dyn Any)
        });
        let get_mut = relation_getter_mut(move |item: &mut dyn Any| {
            item.downcast_mut::<T>()
                .and_then(|t| get_mut(t))
                .map(|r| r as &mut dyn Any)
        });
        Self::with(
            name,
            MemberKind::Relation {
                entity: EntityType::of::<R>,
            },
            MemberAccessor::Relation {
                get: Arc::new(get),
                get_mut: Arc::new(get_mut),
            },
        )
    }

    /// A member the mapping ignores.
    pub fn ignored(name: &'static str) -> Self {
        Self::with(name, MemberKind::Ignored, MemberAccessor::None)
    }

    /// Override the stored name of a column or related attribute.
    pub fn physical_name(mut self, physical: &str) -> Self {
        match &mut self.inner.kind {
            MemberKind::Column { physical_name, .. }
            | MemberKind::RelatedAttribute { physical_name, .. } => {
                *physical_name = Some(physical.into());
            }
            _ => panic!(
                "physical_name applies to columns and related attributes, not `{}`",
                self.inner.name
            ),
        }
        self
    }

    pub fn ordinal(mut self, value: u32) -> Self {
        match &mut self.inner.kind {
            MemberKind::Column { ordinal, .. } => *ordinal = Some(value),
            _ => panic!("ordinal applies to columns, not `{}`", self.inner.name),
        }
        self
    }

    /// Alias of the related entity occurrence this attribute comes from.
    pub fn entity_alias(mut self, alias: &str) -> Self {
        match &mut self.inner.kind {
            MemberKind::RelatedAttribute { entity_alias, .. } => *entity_alias = Some(alias.into()),
            _ => panic!(
                "entity_alias applies to related attributes, not `{}`",
                self.inner.name
            ),
        }
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.inner.primary_key = true;
        self
    }

    /// Value generated by the store on insert.
    pub fn identity(mut self) -> Self {
        self.inner.identity = true;
        self
    }

    /// Value computed by the store; read but never written.
    pub fn mapped(mut self) -> Self {
        self.inner.mapped = true;
        self
    }

    /// Attach a write accessor to a column or related attribute.
    pub fn setter<F>(mut self, set: F) -> Self
    where
        F: Fn(&mut T, Value) -> OrmResult<()> + Send + Sync + 'static,
    {
        match &mut self.inner.accessor {
            MemberAccessor::Value { set: slot, .. } => {
                *slot = Some(Arc::new(move |item: &mut dyn Any, value: Value| {
                    item.downcast_mut::<T>().map(|t| set(t, value))
                }));
            }
            _ => panic!(
                "setter applies to columns and related attributes, not `{}`",
                self.inner.name
            ),
        }
        self
    }
}

// =============================================================================
// Property handles
// =============================================================================

/// Typed handle to a property of entity `E`, usable in `const` position.
pub struct Property<E> {
    name: &'static str,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Property<E> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _entity: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<E: Entity> Property<E> {
    /// Stable (declaring type, property name) identity.
    ///
    /// # Panics
    ///
    /// Panics if `E` does not declare a member with this name.
    pub fn to_ref(&self) -> PropertyRef {
        assert!(
            E::descriptor().member(self.name).is_some(),
            "entity `{}` has no member `{}`",
            EntityType::of::<E>(),
            self.name
        );
        PropertyRef {
            entity: EntityType::of::<E>(),
            name: self.name,
        }
    }

    /// Read this property from an item. Relation and ignored members read as null.
    pub fn value_of(&self, item: &E) -> Value {
        E::descriptor()
            .member(self.name)
            .and_then(|m| m.get_value(item))
            .unwrap_or(Value::Null)
    }
}

impl<E> Clone for Property<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Property<E> {}

impl<E> fmt::Debug for Property<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Property({})", self.name)
    }
}

/// A resolved property identity: declaring entity type plus member name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyRef {
    pub entity: EntityType,
    pub name: &'static str,
}

impl fmt::Display for PropertyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.entity.name(), self.name)
    }
}
