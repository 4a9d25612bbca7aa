//! Quick and advanced filter types

use serde::Deserialize;
use serde::Serialize;

use super::Value;

/// One structured include/exclude rule.
///
/// A descriptor fires for a record whose value at `data_property` strictly
/// equals `filter_value`. A fired checked descriptor opts the record in; a
/// fired unchecked one hides it unless an earlier checked descriptor already
/// opted it in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedFilter {
    /// Record key to compare.
    pub data_property: String,
    /// Value that makes the descriptor fire.
    #[serde(default)]
    pub filter_value: Value,
    /// Whether matching records are shown.
    #[serde(default)]
    pub checked: bool,
}

impl AdvancedFilter {
    /// Creates a descriptor.
    pub fn new(data_property: impl Into<String>, filter_value: impl Into<Value>, checked: bool) -> Self {
        Self {
            data_property: data_property.into(),
            filter_value: filter_value.into(),
            checked,
        }
    }

    /// Returns `true` if this descriptor fires for `value`.
    pub fn fires(&self, value: &Value) -> bool {
        value.strict_eq(&self.filter_value)
    }
}

/// A parsed quick filter value.
///
/// `"label:text"` scopes the filter to columns whose header matches `label`
/// and requires an exact match; plain `"text"` (or `":text"`, with an empty
/// label) matches any quick-filter column by substring. Both parts are
/// lower-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickFilter {
    /// Lower-cased header label the filter is scoped to.
    pub scope: Option<String>,
    /// Lower-cased text to match.
    pub needle: String,
}

impl QuickFilter {
    /// Parses a filter value. Returns `None` when the value filters nothing.
    pub fn parse(value: &Value) -> Option<Self> {
        if value.is_blank() {
            return None;
        }
        let text = value.to_display_string().to_lowercase();
        let filter = match text.split_once(':') {
            Some(("", needle)) => Self {
                scope: None,
                needle: needle.to_string(),
            },
            Some((scope, needle)) => Self {
                scope: Some(scope.to_string()),
                needle: needle.to_string(),
            },
            None => Self {
                scope: None,
                needle: text,
            },
        };
        Some(filter)
    }

    /// Returns `true` if the header label selects this column.
    pub fn selects(&self, header_label: Option<&str>) -> bool {
        match &self.scope {
            None => true,
            Some(scope) => header_label.unwrap_or_default().to_lowercase() == *scope,
        }
    }

    /// Returns `true` if a cell value satisfies the filter.
    pub fn matches(&self, value: &Value) -> bool {
        if value.is_blank() {
            return false;
        }
        let cell = value.to_display_string().to_lowercase();
        if self.scope.is_some() {
            cell == self.needle
        } else {
            cell.contains(&self.needle)
        }
    }
}
