//! The table entity
//!
//! A [`Table`] holds one grid's raw records plus its sort, filter, pagination
//! and selection state. Filtered and displayed rows are never stored: they are
//! derived from the raw records and the current state on every read, so they
//! cannot drift from what the state says should be shown.
//!
//! The behaviour is spread over submodules:
//! - `ingest`: data received/failed hooks and column-type transforms
//! - `filter`: quick and advanced filtering
//! - `sort`: type-aware comparator with the null-placement rule
//! - `paging`: cursor movement and slicing
//! - `selection`: bulk and row selection

mod filter;
mod ingest;
mod paging;
mod selection;
mod sort;

pub use filter::advanced_filter_data;
pub use sort::compare_cells;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::FixedOffset;

use crate::config::StoreConfig;
use crate::fetch::QueryParams;
use crate::model::AdvancedFilter;
use crate::model::ColumnDefinition;
use crate::model::Pagination;
use crate::model::Record;
use crate::model::TableDefinition;
use crate::model::Value;
use crate::registry::Instance;

/// Post-processing hook that turns a raw payload into records.
///
/// When a table has a formatter, its output replaces the default
/// normalization of the payload.
#[derive(Clone)]
pub struct DataFormatter(Arc<dyn Fn(&serde_json::Value) -> Vec<Record> + Send + Sync>);

impl DataFormatter {
    /// Wraps a formatting function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&serde_json::Value) -> Vec<Record> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Runs the formatter.
    pub fn apply(&self, payload: &serde_json::Value) -> Vec<Record> {
        (self.0)(payload)
    }
}

impl fmt::Debug for DataFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DataFormatter(..)")
    }
}

/// Rendering settings taken from the store config at creation time.
#[derive(Debug, Clone)]
pub(crate) struct RenderSettings {
    pub(crate) time_zone: FixedOffset,
    pub(crate) default_online_limit: f64,
    pub(crate) missing_placeholder: String,
    pub(crate) default_time_format: String,
}

impl From<&StoreConfig> for RenderSettings {
    fn from(config: &StoreConfig) -> Self {
        Self {
            time_zone: config.time_zone(),
            default_online_limit: config.default_online_limit,
            missing_placeholder: config.missing_placeholder.clone(),
            default_time_format: config.default_time_format.clone(),
        }
    }
}

/// One table instance.
#[derive(Debug, Clone)]
pub struct Table {
    id: String,
    url: String,
    cols: Vec<ColumnDefinition>,
    sort_col_index: Option<usize>,
    pagination: Option<Pagination>,
    row_click: Option<serde_json::Value>,
    advanced_filters: Option<Vec<AdvancedFilter>>,
    /// Records as last received, post transform. `None` until data arrives or after a failure.
    data: Option<Vec<Record>>,
    filter_value: Option<Value>,
    data_formatter: Option<DataFormatter>,
    selected_items: HashMap<String, Record>,
    select_data_property: Option<String>,
    request_filters: Option<QueryParams>,
    render: RenderSettings,
}

impl Table {
    /// Creates a table from its definition.
    pub fn new(
        id: impl Into<String>,
        definition: TableDefinition,
        data_formatter: Option<DataFormatter>,
        config: &StoreConfig,
    ) -> Self {
        let select_data_property = definition.select_data_property().map(str::to_string);
        Self {
            id: id.into(),
            url: definition.url,
            cols: definition.cols,
            sort_col_index: definition.sort_col_index,
            pagination: definition.pagination,
            row_click: definition.row_click,
            advanced_filters: definition.advanced_filters,
            data: None,
            filter_value: None,
            data_formatter,
            selected_items: HashMap::new(),
            select_data_property,
            request_filters: None,
            render: RenderSettings::from(config),
        }
    }

    /// Returns the instance id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the URL data is requested from.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns `true` once data has been received and not cleared by a failure.
    pub fn is_data_available(&self) -> bool {
        self.data.is_some()
    }

    /// Returns the raw records as last received, post transform.
    pub fn raw_data(&self) -> Option<&[Record]> {
        self.data.as_deref()
    }

    /// Returns the rows to display: filtered, then paginated when configured.
    pub fn get_data(&self) -> Vec<Record> {
        let filtered = self.get_filtered_data();
        match &self.pagination {
            Some(_) => self.slice_data(&filtered),
            None => filtered,
        }
    }

    /// Returns every record that passes the current filters, in sort order.
    pub fn get_filtered_data(&self) -> Vec<Record> {
        match &self.data {
            Some(data) => self.filter_data(data),
            None => Vec::new(),
        }
    }

    /// Returns the number of records that pass the current filters.
    pub fn get_data_count(&self) -> usize {
        self.get_filtered_data().len()
    }

    /// Returns the column definitions.
    pub fn get_col_definitions(&self) -> &[ColumnDefinition] {
        &self.cols
    }

    /// Returns the column the table is sorted by.
    pub fn get_sort_col_index(&self) -> Option<usize> {
        self.sort_col_index
    }

    /// Returns the opaque row-click configuration.
    pub fn get_row_click_data(&self) -> Option<&serde_json::Value> {
        self.row_click.as_ref()
    }

    /// Returns the pagination state.
    pub fn get_pagination_data(&self) -> Option<&Pagination> {
        self.pagination.as_ref()
    }

    /// Returns the quick filter value.
    pub fn get_quick_filter_value(&self) -> Option<&Value> {
        self.filter_value.as_ref()
    }

    /// Returns the advanced filters.
    pub fn get_advanced_filters(&self) -> Option<&[AdvancedFilter]> {
        self.advanced_filters.as_deref()
    }

    /// Returns the selected records keyed by selection key.
    pub fn get_selected_items(&self) -> &HashMap<String, Record> {
        &self.selected_items
    }

    /// Returns the selection key property, if the table has a select column.
    pub fn select_data_property(&self) -> Option<&str> {
        self.select_data_property.as_deref()
    }

    /// Sets the quick filter value. `Value::Null` clears it.
    pub fn set_filter_value(&mut self, value: Value) {
        self.filter_value = if value.is_null() { None } else { Some(value) };
        self.reset_pagination_if_moved();
    }

    /// Replaces the advanced filters.
    pub fn set_advanced_filters(&mut self, advanced_filters: Option<Vec<AdvancedFilter>>) {
        self.advanced_filters = advanced_filters;
        self.reset_pagination_if_moved();
    }
}

impl Instance for Table {
    type Definition = TableDefinition;
    type Formatter = DataFormatter;

    fn create(
        id: &str,
        definition: TableDefinition,
        formatter: Option<DataFormatter>,
        config: &StoreConfig,
    ) -> Self {
        Table::new(id, definition, formatter, config)
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn request_filters(&self) -> Option<&QueryParams> {
        self.request_filters.as_ref()
    }

    fn set_request_filters(&mut self, filters: Option<QueryParams>) {
        self.request_filters = filters;
    }

    fn on_data_received(&mut self, payload: serde_json::Value) {
        Table::on_data_received(self, payload);
    }

    fn error_function(&mut self) {
        Table::error_function(self);
    }
}
