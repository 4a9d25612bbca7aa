//! Table definitions

use serde::Deserialize;
use serde::Serialize;

use super::AdvancedFilter;
use super::ColumnDefinition;
use super::DataType;
use super::Pagination;

/// Everything needed to create a table instance.
///
/// # Example
///
/// ```
/// use gridstore_lib::model::TableDefinition;
///
/// let definition: TableDefinition = serde_json::from_str(r#"{
///     "url": "/api/devices",
///     "cols": [
///         {"dataProperty": "id", "dataType": "select"},
///         {"dataProperty": "name", "headerLabel": "Name", "sortDirection": "ascending"}
///     ],
///     "sortColIndex": 1,
///     "pagination": {"cursor": 0, "size": 25}
/// }"#).unwrap();
/// assert_eq!(definition.select_data_property(), Some("id"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDefinition {
    /// Where the fetcher requests data from.
    pub url: String,
    /// Column definitions, in display order.
    #[serde(default)]
    pub cols: Vec<ColumnDefinition>,
    /// Column sorted on each data load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_col_index: Option<usize>,
    /// Pagination; absent means every filtered row is displayed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    /// Opaque row-click configuration handed back to renderers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_click: Option<serde_json::Value>,
    /// Initial advanced filters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advanced_filters: Option<Vec<AdvancedFilter>>,
}

impl TableDefinition {
    /// Creates a definition with no columns.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            cols: Vec::new(),
            sort_col_index: None,
            pagination: None,
            row_click: None,
            advanced_filters: None,
        }
    }

    /// Appends a column.
    pub fn with_col(mut self, col: ColumnDefinition) -> Self {
        self.cols.push(col);
        self
    }

    /// Sorts by the column at `index` on every data load.
    pub fn with_sort_col(mut self, index: usize) -> Self {
        self.sort_col_index = Some(index);
        self
    }

    /// Paginates with `size` rows per page.
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.pagination = Some(Pagination::new(size));
        self
    }

    /// Sets the row-click configuration.
    pub fn with_row_click(mut self, row_click: serde_json::Value) -> Self {
        self.row_click = Some(row_click);
        self
    }

    /// Sets the initial advanced filters.
    pub fn with_advanced_filters(mut self, filters: Vec<AdvancedFilter>) -> Self {
        self.advanced_filters = Some(filters);
        self
    }

    /// Returns the selection key: the property of the first `select` column.
    pub fn select_data_property(&self) -> Option<&str> {
        self.cols
            .iter()
            .find(|col| col.data_type == DataType::Select)
            .map(|col| col.data_property.as_str())
    }
}
