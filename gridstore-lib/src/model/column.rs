//! Column definitions

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

/// How a column's values are transformed on ingestion and compared when sorting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Free text; sorted case-insensitively.
    #[default]
    String,
    /// Numeric value.
    Number,
    /// Number rendered with a `%` suffix; sorted numerically.
    Percent,
    /// Timestamp rendered with the column's time format.
    Time,
    /// Timestamp plus a derived `online` flag.
    Status,
    /// Selection checkbox; its `dataProperty` is the selection key.
    Select,
}

impl DataType {
    /// Returns `true` for the types that are rendered from a raw timestamp.
    pub fn is_temporal(self) -> bool {
        matches!(self, DataType::Time | DataType::Status)
    }
}

/// Sort direction for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order (A-Z, 0-9).
    Ascending,
    /// Descending order (Z-A, 9-0).
    Descending,
}

impl SortDirection {
    /// Returns the opposite direction.
    pub fn reverse(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Definition of a single table column.
///
/// # Example
///
/// ```
/// use gridstore_lib::model::{ColumnDefinition, DataType, SortDirection};
///
/// let col = ColumnDefinition::new("name", DataType::String)
///     .with_header("Name")
///     .with_sort_direction(SortDirection::Ascending)
///     .with_quick_filter();
/// assert_eq!(col.sort_key(), "name");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    /// Record key this column reads.
    pub data_property: String,
    /// Header text; also the scope name for `label:value` quick filters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_label: Option<String>,
    /// Column type.
    #[serde(default)]
    pub data_type: DataType,
    /// Current sort direction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_direction: Option<SortDirection>,
    /// Sort direction captured on the first data load.
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub(crate) default_sort_direction: Option<SortDirection>,
    #[serde(skip)]
    pub(crate) default_captured: bool,
    /// chrono `strftime` format for time and status columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_format: Option<String>,
    /// Minutes a status timestamp counts as online. Non-numeric input reads as unset.
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub online_limit: Option<f64>,
    /// Whether the quick filter searches this column.
    #[serde(default)]
    pub quick_filter: bool,
}

impl ColumnDefinition {
    /// Creates a column reading `data_property`.
    pub fn new(data_property: impl Into<String>, data_type: DataType) -> Self {
        Self {
            data_property: data_property.into(),
            header_label: None,
            data_type,
            sort_direction: None,
            default_sort_direction: None,
            default_captured: false,
            time_format: None,
            online_limit: None,
            quick_filter: false,
        }
    }

    /// Sets the header label.
    pub fn with_header(mut self, label: impl Into<String>) -> Self {
        self.header_label = Some(label.into());
        self
    }

    /// Sets the initial sort direction.
    pub fn with_sort_direction(mut self, direction: SortDirection) -> Self {
        self.sort_direction = Some(direction);
        self
    }

    /// Sets the time format.
    pub fn with_time_format(mut self, format: impl Into<String>) -> Self {
        self.time_format = Some(format.into());
        self
    }

    /// Sets the online limit in minutes.
    pub fn with_online_limit(mut self, minutes: f64) -> Self {
        self.online_limit = Some(minutes);
        self
    }

    /// Includes this column in quick filtering.
    pub fn with_quick_filter(mut self) -> Self {
        self.quick_filter = true;
        self
    }

    /// Returns the direction captured on the first data load.
    pub fn default_sort_direction(&self) -> Option<SortDirection> {
        self.default_sort_direction
    }

    /// Key holding the untouched timestamp of a time or status column.
    pub fn timestamp_key(&self) -> String {
        format!("{}Timestamp", self.data_property)
    }

    /// Record key that sorting reads for this column.
    pub fn sort_key(&self) -> String {
        if self.data_type.is_temporal() {
            self.timestamp_key()
        } else {
            self.data_property.clone()
        }
    }

    /// Records the baseline sort direction, once.
    pub(crate) fn capture_default_direction(&mut self) {
        if !self.default_captured {
            self.default_sort_direction = self.sort_direction;
            self.default_captured = true;
        }
    }
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|v| v.as_f64()))
}
