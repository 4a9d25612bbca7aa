//! Dynamic table record

use std::collections::HashMap;

use super::Value;

static NULL: Value = Value::Null;

/// One row of table data.
///
/// Records hold cell values as a `HashMap<String, Value>`, keyed by the
/// column `dataProperty`. Ingestion adds derived keys next to the raw ones
/// (`<dataProperty>Timestamp`, `online`). Advanced filtering tags a clone of the
/// record with the properties whose checked filters opted it in; the original
/// record is never touched.
///
/// # Example
///
/// ```
/// use gridstore_lib::model::Record;
/// use gridstore_lib::model::Value;
///
/// let record = Record::new()
///     .set("name", "Contoso")
///     .set("count", 12i64);
///
/// assert_eq!(record.value("name"), &Value::from("Contoso"));
/// assert!(record.value("missing").is_null());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    /// The cell values.
    pub(crate) fields: HashMap<String, Value>,

    /// Properties of checked advanced filters that showed this record.
    pub(crate) shown_by_advanced_filters: Vec<String>,
}

impl Record {
    /// Creates a new empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record from a JSON object. Returns `None` for any other JSON kind.
    pub fn from_json(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Object(map) => Some(Self {
                fields: map
                    .into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
                shown_by_advanced_filters: Vec::new(),
            }),
            _ => None,
        }
    }

    // =========================================================================
    // Raw field access
    // =========================================================================

    /// Returns a reference to the field value, if the key exists.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns the field value, treating an absent key as [`Value::Null`].
    pub fn value(&self, field: &str) -> &Value {
        self.fields.get(field).unwrap_or(&NULL)
    }

    /// Returns `true` if the record contains the given field.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Returns a reference to all fields.
    pub fn fields(&self) -> &HashMap<String, Value> {
        &self.fields
    }

    /// Returns the properties whose checked advanced filters showed this record.
    pub fn shown_by_advanced_filters(&self) -> &[String] {
        &self.shown_by_advanced_filters
    }

    // =========================================================================
    // Setters
    // =========================================================================

    /// Sets a field value (builder pattern).
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Inserts a field value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Returns a clone tagged with `property` as an advanced-filter override.
    pub(crate) fn with_override(&self, property: &str) -> Self {
        let mut clone = self.clone();
        clone.shown_by_advanced_filters.push(property.to_string());
        clone
    }
}
