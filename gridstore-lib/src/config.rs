//! Store configuration

use chrono::FixedOffset;
use chrono::Offset;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Producer type stamped on actions created by [`Action`](crate::action::Action) constructors.
pub const TABLE_PRODUCER: &str = "Table";

/// Which action producers a registry acts on.
///
/// Matching is case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProducerFilter {
    /// Accept every action.
    Any,
    /// Accept actions from exactly this producer.
    One(String),
    /// Accept actions from any producer in the list. An empty list accepts nothing.
    AnyOf(Vec<String>),
}

impl ProducerFilter {
    /// Returns `true` if an action declared by `producer_type` should be handled.
    pub fn accepts(&self, producer_type: Option<&str>) -> bool {
        match self {
            ProducerFilter::Any => true,
            ProducerFilter::One(expected) => producer_type == Some(expected.as_str()),
            ProducerFilter::AnyOf(list) => {
                producer_type.is_some_and(|p| list.iter().any(|expected| expected == p))
            }
        }
    }
}

impl Default for ProducerFilter {
    fn default() -> Self {
        ProducerFilter::One(TABLE_PRODUCER.to_string())
    }
}

/// Configuration for a [`TableStore`](crate::store::TableStore).
///
/// # Example
///
/// ```
/// use gridstore_lib::config::{ProducerFilter, StoreConfig};
///
/// let config = StoreConfig::default()
///     .with_producer_types(ProducerFilter::AnyOf(vec!["Table".into(), "Grid".into()]))
///     .with_utc_offset_seconds(3600)
///     .with_default_online_limit(5.0);
/// assert!(config.producer_types.accepts(Some("Grid")));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreConfig {
    /// Producer types this store acts on.
    ///
    /// Default: `"Table"`
    pub producer_types: ProducerFilter,

    /// Model types a REQUEST_DATA may name. `None` accepts any, including none.
    ///
    /// Default: `None`
    pub model_types: Option<Vec<String>>,

    /// Offset from UTC used when rendering time and status columns.
    ///
    /// Default: `0`
    pub utc_offset_seconds: i32,

    /// Online window for status columns without a usable `onlineLimit`.
    ///
    /// Default: 15 minutes
    pub default_online_limit: f64,

    /// Display text for missing time and status values.
    ///
    /// Default: `"--"`
    pub missing_placeholder: String,

    /// chrono format used when a column has no `timeFormat`.
    ///
    /// Default: ISO 8601 with offset
    pub default_time_format: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            producer_types: ProducerFilter::default(),
            model_types: None,
            utc_offset_seconds: 0,
            default_online_limit: 15.0,
            missing_placeholder: "--".to_string(),
            default_time_format: "%Y-%m-%dT%H:%M:%S%:z".to_string(),
        }
    }
}

impl StoreConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the accepted producer types.
    pub fn with_producer_types(mut self, producer_types: ProducerFilter) -> Self {
        self.producer_types = producer_types;
        self
    }

    /// Restricts REQUEST_DATA to the given model types.
    pub fn with_model_types(mut self, model_types: Vec<String>) -> Self {
        self.model_types = Some(model_types);
        self
    }

    /// Sets the rendering offset from UTC.
    pub fn with_utc_offset_seconds(mut self, seconds: i32) -> Self {
        self.utc_offset_seconds = seconds;
        self
    }

    /// Sets the fallback online limit in minutes.
    pub fn with_default_online_limit(mut self, minutes: f64) -> Self {
        self.default_online_limit = minutes;
        self
    }

    /// Sets the missing-value placeholder.
    pub fn with_missing_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.missing_placeholder = placeholder.into();
        self
    }

    /// Sets the fallback time format.
    pub fn with_default_time_format(mut self, format: impl Into<String>) -> Self {
        self.default_time_format = format.into();
        self
    }

    /// Returns the rendering time zone. Out-of-range offsets fall back to UTC.
    pub fn time_zone(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_seconds).unwrap_or_else(|| Utc.fix())
    }

    /// Returns `true` if a REQUEST_DATA naming `model_type` may proceed.
    pub fn accepts_model_type(&self, model_type: Option<&str>) -> bool {
        match (&self.model_types, model_type) {
            (None, _) => true,
            (Some(_), None) => true,
            (Some(types), Some(model_type)) => types.iter().any(|t| t == model_type),
        }
    }
}
