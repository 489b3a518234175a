//! Item selections - composable queries built with a fluent API.
//!
//! A selection accumulates joins, predicates and a projection for one item
//! type, plus an optional linked selection combined by a set operation:
//!
//! ```ignore
//! let selection = ItemSelection::<DomainAggregateRow>::new()
//!     .select([DomainAggregateRow::NAME, DomainAggregateRow::DESCRIPTION])
//!     .inner_join(DomainAggregateRow::SUB_CONTAINER_ID, SubContainerRow::SUB_CONTAINER_ID)
//!     .where_equal(SubContainerRow::NAME, "Alpha")
//!     .between_values(DomainAggregateRow::DOMAIN_AGGREGATE_ID, 10, 20);
//! ```
//!
//! Builders only append (joins, filters, projections); `clear_relations` is
//! the one removal. Only one linked selection is kept: linking again replaces it.

use std::fmt;
use std::marker::PhantomData;

use tracing::trace;

use super::filter::{FilterType, ValueFilter};
use super::relation::{EntityRelation, JoinExt};
use crate::model::{Entity, Property, Value};
use crate::schema::AttributeLocation;

/// Set operation combining a selection with its linked selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionLinkType {
    Union,
    Intersect,
    Except,
}

/// A selection combined with its parent by a set operation.
pub struct LinkedSelection<T> {
    pub link_type: SelectionLinkType,
    pub selection: ItemSelection<T>,
}

impl<T> Clone for LinkedSelection<T> {
    fn clone(&self) -> Self {
        Self {
            link_type: self.link_type,
            selection: self.selection.clone(),
        }
    }
}

impl<T> fmt::Debug for LinkedSelection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkedSelection")
            .field("link_type", &self.link_type)
            .field("selection", &self.selection)
            .finish()
    }
}

/// Joins, filters and projection of a query for items of type `T`.
#[must_use = "builders have no effect until used"]
pub struct ItemSelection<T> {
    limit: Option<usize>,
    relations: Vec<EntityRelation>,
    filters: Vec<ValueFilter>,
    select_expressions: Vec<AttributeLocation>,
    linked_selection: Option<Box<LinkedSelection<T>>>,
    _item: PhantomData<fn() -> T>,
}

impl<T: Entity> ItemSelection<T> {
    pub fn new() -> Self {
        Self {
            limit: None,
            relations: Vec::new(),
            filters: Vec::new(),
            select_expressions: Vec::new(),
            linked_selection: None,
            _item: PhantomData,
        }
    }

    // =========================================================================
    // Projection and limit
    // =========================================================================

    /// Limit the number of items returned.
    pub fn take(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Append attributes to the select list. An empty select list means every
    /// mapped attribute.
    pub fn select<S>(mut self, selectors: impl IntoIterator<Item = S>) -> Self
    where
        S: Into<AttributeLocation>,
    {
        self.select_expressions
            .extend(selectors.into_iter().map(Into::into));
        self
    }

    // =========================================================================
    // Filters
    // =========================================================================

    pub fn add_filter(mut self, filter: ValueFilter) -> Self {
        trace!(filter = %filter, "adding filter");
        self.filters.push(filter);
        self
    }

    fn compare(self, location: AttributeLocation, filter_type: FilterType, value: Value) -> Self {
        self.add_filter(ValueFilter::single(location, filter_type, value))
    }

    /// Equality; a null value becomes an "is not set" check.
    pub fn where_equal(self, selector: impl Into<AttributeLocation>, value: impl Into<Value>) -> Self {
        let location = selector.into();
        match value.into() {
            Value::Null => self.add_filter(ValueFilter::null_check(location, FilterType::IsNotSet)),
            value => self.compare(location, FilterType::Equality, value),
        }
    }

    /// Inequality; a null value becomes an "is set" check.
    pub fn where_not_equal(
        self,
        selector: impl Into<AttributeLocation>,
        value: impl Into<Value>,
    ) -> Self {
        let location = selector.into();
        match value.into() {
            Value::Null => self.add_filter(ValueFilter::null_check(location, FilterType::IsSet)),
            value => self.compare(location, FilterType::Inequality, value),
        }
    }

    pub fn where_null(self, selector: impl Into<AttributeLocation>) -> Self {
        self.add_filter(ValueFilter::null_check(selector.into(), FilterType::IsNotSet))
    }

    pub fn where_not_null(self, selector: impl Into<AttributeLocation>) -> Self {
        self.add_filter(ValueFilter::null_check(selector.into(), FilterType::IsSet))
    }

    pub fn greater_than(self, selector: impl Into<AttributeLocation>, value: impl Into<Value>) -> Self {
        self.compare(selector.into(), FilterType::GreaterThan, value.into())
    }

    pub fn greater_than_or_equal_to(
        self,
        selector: impl Into<AttributeLocation>,
        value: impl Into<Value>,
    ) -> Self {
        self.compare(selector.into(), FilterType::GreaterThanOrEqualTo, value.into())
    }

    pub fn less_than(self, selector: impl Into<AttributeLocation>, value: impl Into<Value>) -> Self {
        self.compare(selector.into(), FilterType::LessThan, value.into())
    }

    pub fn less_than_or_equal_to(
        self,
        selector: impl Into<AttributeLocation>,
        value: impl Into<Value>,
    ) -> Self {
        self.compare(selector.into(), FilterType::LessThanOrEqualTo, value.into())
    }

    /// Range filter with explicit bounds.
    pub fn between_values(
        self,
        selector: impl Into<AttributeLocation>,
        baseline: impl Into<Value>,
        boundary: impl Into<Value>,
    ) -> Self {
        self.add_filter(ValueFilter::between(
            selector.into(),
            baseline.into(),
            boundary.into(),
        ))
    }

    /// One range filter per selector, with bounds read from two example items.
    pub fn between(
        mut self,
        baseline: &T,
        boundary: &T,
        selectors: impl IntoIterator<Item = Property<T>>,
    ) -> Self {
        for selector in selectors {
            let low = selector.value_of(baseline);
            let high = selector.value_of(boundary);
            self = self.add_filter(ValueFilter::between(selector.into(), low, high));
        }
        self
    }

    /// Attribute matches any of the values.
    ///
    /// # Panics
    ///
    /// Panics if `values` is empty.
    pub fn include<V>(self, selector: impl Into<AttributeLocation>, values: impl IntoIterator<Item = V>) -> Self
    where
        V: Into<Value>,
    {
        self.set_filter(selector.into(), FilterType::MatchesSet, values)
    }

    /// Attribute matches none of the values.
    ///
    /// # Panics
    ///
    /// Panics if `values` is empty.
    pub fn excluding<V>(
        self,
        selector: impl Into<AttributeLocation>,
        values: impl IntoIterator<Item = V>,
    ) -> Self
    where
        V: Into<Value>,
    {
        self.set_filter(selector.into(), FilterType::DoesNotMatchSet, values)
    }

    fn set_filter<V>(
        self,
        location: AttributeLocation,
        filter_type: FilterType,
        values: impl IntoIterator<Item = V>,
    ) -> Self
    where
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        assert!(
            !values.is_empty(),
            "{:?} filter on `{}` needs at least one value",
            filter_type,
            location
        );
        self.add_filter(ValueFilter::set(location, filter_type, values))
    }

    /// Equality filters for each selector, with values read from an example item.
    pub fn matching(mut self, example: &T, selectors: impl IntoIterator<Item = Property<T>>) -> Self {
        for selector in selectors {
            let value = selector.value_of(example);
            self = self.where_equal(selector, value);
        }
        self
    }

    // =========================================================================
    // Relations and links
    // =========================================================================

    /// Remove every relation.
    pub fn clear_relations(mut self) -> Self {
        self.relations.clear();
        self
    }

    fn link(mut self, link_type: SelectionLinkType, selection: ItemSelection<T>) -> Self {
        self.linked_selection = Some(Box::new(LinkedSelection {
            link_type,
            selection,
        }));
        self
    }

    pub fn union(self, selection: ItemSelection<T>) -> Self {
        self.link(SelectionLinkType::Union, selection)
    }

    pub fn intersect(self, selection: ItemSelection<T>) -> Self {
        self.link(SelectionLinkType::Intersect, selection)
    }

    pub fn except(self, selection: ItemSelection<T>) -> Self {
        self.link(SelectionLinkType::Except, selection)
    }
}

impl<T> ItemSelection<T> {
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn relations(&self) -> &[EntityRelation] {
        &self.relations
    }

    pub fn filters(&self) -> &[ValueFilter] {
        &self.filters
    }

    pub fn select_expressions(&self) -> &[AttributeLocation] {
        &self.select_expressions
    }

    pub fn linked_selection(&self) -> Option<&LinkedSelection<T>> {
        self.linked_selection.as_deref()
    }

    /// Every non-null filter value, in filter order, then those of the linked
    /// selection. This is the positional parameter order of compiled statements.
    pub fn property_values(&self) -> Vec<&Value> {
        let mut values: Vec<&Value> = self
            .filters
            .iter()
            .flat_map(ValueFilter::bound_values)
            .collect();
        if let Some(linked) = &self.linked_selection {
            values.extend(linked.selection.property_values());
        }
        values
    }
}

impl<T: Entity> Default for ItemSelection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> JoinExt for ItemSelection<T> {
    type Item = T;

    fn with_relation(mut self, relation: EntityRelation) -> Self {
        self.relations.push(relation);
        self
    }
}

impl<T> Clone for ItemSelection<T> {
    fn clone(&self) -> Self {
        Self {
            limit: self.limit,
            relations: self.relations.clone(),
            filters: self.filters.clone(),
            select_expressions: self.select_expressions.clone(),
            linked_selection: self.linked_selection.clone(),
            _item: PhantomData,
        }
    }
}

impl<T> fmt::Debug for ItemSelection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemSelection")
            .field("limit", &self.limit)
            .field("relations", &self.relations)
            .field("filters", &self.filters)
            .field("select_expressions", &self.select_expressions)
            .field("linked_selection", &self.linked_selection)
            .finish()
    }
}

/// Filters joined by `&`, ordered by attribute location. Diagnostic only.
impl<T> fmt::Display for ItemSelection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut filters: Vec<&ValueFilter> = self.filters.iter().collect();
        filters.sort_by_cached_key(|filter| filter.attribute_location().to_string());
        let rendered: Vec<String> = filters.iter().map(ToString::to_string).collect();
        write!(f, "{}", rendered.join("&"))
    }
}
