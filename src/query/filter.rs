//! Value filters - single predicate clauses of a selection.

use std::cmp::Ordering;
use std::fmt;

use crate::error::{OrmError, OrmResult};
use crate::model::Value;
use crate::schema::AttributeLocation;

/// Comparison applied by a [`ValueFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterType {
    Equality,
    Inequality,
    LessThan,
    LessThanOrEqualTo,
    GreaterThan,
    GreaterThanOrEqualTo,
    Between,
    MatchesSet,
    DoesNotMatchSet,
    IsSet,
    IsNotSet,
}

impl FilterType {
    fn symbol(self) -> &'static str {
        match self {
            FilterType::Equality => "=",
            FilterType::Inequality => "<>",
            FilterType::LessThan => "<",
            FilterType::LessThanOrEqualTo => "<=",
            FilterType::GreaterThan => ">",
            FilterType::GreaterThanOrEqualTo => ">=",
            FilterType::Between => "~",
            FilterType::MatchesSet => "~=",
            FilterType::DoesNotMatchSet => "!~=",
            FilterType::IsSet => "!=NULL",
            FilterType::IsNotSet => "=NULL",
        }
    }

    fn check_arity(self, count: usize) -> OrmResult<()> {
        let (ok, expected) = match self {
            FilterType::Between => (count == 2, "exactly 2"),
            FilterType::MatchesSet | FilterType::DoesNotMatchSet => (count >= 1, "at least 1"),
            FilterType::IsSet | FilterType::IsNotSet => (count == 0, "no"),
            _ => (count == 1, "exactly 1"),
        };
        if ok {
            Ok(())
        } else {
            Err(OrmError::InvalidFilterValues {
                filter_type: self,
                expected,
                actual: count,
            })
        }
    }
}

/// One predicate: an attribute, a comparison and its literal values.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueFilter {
    attribute_location: AttributeLocation,
    filter_type: FilterType,
    filter_values: Vec<Value>,
}

impl ValueFilter {
    /// Create a filter, validating the number of values for its type.
    ///
    /// `Between` bounds are normalized: reversed comparable bounds are
    /// swapped, and equal bounds collapse the filter to `Equality`.
    pub fn new(
        attribute_location: AttributeLocation,
        filter_type: FilterType,
        filter_values: Vec<Value>,
    ) -> OrmResult<Self> {
        filter_type.check_arity(filter_values.len())?;
        let filter = Self {
            attribute_location,
            filter_type,
            filter_values,
        };
        Ok(match filter_type {
            FilterType::Between => filter.normalize_range(),
            _ => filter,
        })
    }

    /// A range filter over `[baseline, boundary]`.
    pub fn between(attribute_location: AttributeLocation, baseline: Value, boundary: Value) -> Self {
        Self {
            attribute_location,
            filter_type: FilterType::Between,
            filter_values: vec![baseline, boundary],
        }
        .normalize_range()
    }

    // Infallible constructors for the fixed-arity shapes.
    pub(crate) fn single(
        attribute_location: AttributeLocation,
        filter_type: FilterType,
        value: Value,
    ) -> Self {
        Self {
            attribute_location,
            filter_type,
            filter_values: vec![value],
        }
    }

    pub(crate) fn set(
        attribute_location: AttributeLocation,
        filter_type: FilterType,
        values: Vec<Value>,
    ) -> Self {
        Self {
            attribute_location,
            filter_type,
            filter_values: values,
        }
    }

    pub(crate) fn null_check(attribute_location: AttributeLocation, filter_type: FilterType) -> Self {
        Self {
            attribute_location,
            filter_type,
            filter_values: Vec::new(),
        }
    }

    fn normalize_range(mut self) -> Self {
        match self.filter_values[0].compare(&self.filter_values[1]) {
            Some(Ordering::Greater) => self.filter_values.swap(0, 1),
            Some(Ordering::Equal) => {
                self.filter_type = FilterType::Equality;
                self.filter_values.truncate(1);
            }
            _ => {}
        }
        self
    }

    pub fn attribute_location(&self) -> &AttributeLocation {
        &self.attribute_location
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    pub fn filter_values(&self) -> &[Value] {
        &self.filter_values
    }

    /// Values that bind as parameters (nulls excluded).
    pub fn bound_values(&self) -> impl Iterator<Item = &Value> {
        self.filter_values.iter().filter(|v| !v.is_null())
    }
}

impl fmt::Display for ValueFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.attribute_location, self.filter_type.symbol())?;
        let values: Vec<String> = self.filter_values.iter().map(Value::to_string).collect();
        write!(f, "{}", values.join(","))
    }
}
