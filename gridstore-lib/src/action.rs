//! Table actions
//!
//! Actions arrive on the bus either typed ([`Action`]) or in their wire shape
//! ([`RawAction`]: `{actionType, producerType, id, data}`). Wire actions are
//! decoded with `Action::try_from`; a wire action with an unknown type or a
//! malformed `data` object yields an [`ActionError`], which the store treats
//! as "not for me".

use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::TABLE_PRODUCER;
use crate::error::ActionError;
use crate::fetch::QueryParams;
use crate::model::AdvancedFilter;
use crate::model::PageDirection;
use crate::model::SortDirection;
use crate::model::TableDefinition;
use crate::model::Value;
use crate::registry::RequestData;
use crate::table::DataFormatter;

/// REQUEST_DATA payload for tables.
pub type TableRequest = RequestData<TableDefinition, DataFormatter>;

/// What an action asks a table to do.
#[derive(Debug, Clone)]
pub enum TableAction {
    /// Create the instance if needed and (re)load its data.
    RequestData(TableRequest),
    /// Sort by a column.
    TableSort {
        col_index: usize,
        direction: SortDirection,
    },
    /// Set the quick filter. `Value::Null` clears it.
    Filter { value: Value },
    /// Replace the advanced filters.
    AdvancedFilter {
        advanced_filters: Option<Vec<AdvancedFilter>>,
    },
    /// Move one page.
    Paginate { direction: PageDirection },
    /// Select (or deselect) every filtered record.
    ToggleBulkSelect { deselect: bool },
    /// Toggle the displayed row at `row_index`.
    ToggleRowSelect { row_index: usize },
    /// Remove the instance.
    DestroyInstance,
}

impl TableAction {
    /// Wire name of the action type.
    pub fn action_type(&self) -> &'static str {
        match self {
            TableAction::RequestData(_) => "REQUEST_DATA",
            TableAction::TableSort { .. } => "TABLE_SORT",
            TableAction::Filter { .. } => "FILTER",
            TableAction::AdvancedFilter { .. } => "ADVANCED_FILTER",
            TableAction::Paginate { .. } => "PAGINATE",
            TableAction::ToggleBulkSelect { .. } => "TOGGLE_BULK_SELECT",
            TableAction::ToggleRowSelect { .. } => "TOGGLE_ROW_SELECT",
            TableAction::DestroyInstance => "DESTROY_INSTANCE",
        }
    }
}

/// An action addressed to one table instance.
///
/// # Example
///
/// ```
/// use gridstore_lib::action::{Action, TableAction};
/// use gridstore_lib::model::SortDirection;
///
/// let action = Action::sort_change("devices", 2, SortDirection::Descending);
/// assert_eq!(action.producer_type.as_deref(), Some("Table"));
/// assert!(matches!(action.kind, TableAction::TableSort { col_index: 2, .. }));
/// ```
#[derive(Debug, Clone)]
pub struct Action {
    /// Producer family the action comes from.
    pub producer_type: Option<String>,
    /// Instance id.
    pub id: String,
    /// What to do.
    pub kind: TableAction,
}

impl Action {
    /// Creates an action stamped with the table producer type.
    pub fn new(id: impl Into<String>, kind: TableAction) -> Self {
        Self {
            producer_type: Some(TABLE_PRODUCER.to_string()),
            id: id.into(),
            kind,
        }
    }

    /// Overrides the producer type.
    pub fn with_producer_type(mut self, producer_type: Option<String>) -> Self {
        self.producer_type = producer_type;
        self
    }

    /// Populates a table, creating it from `definition` if it does not exist.
    pub fn request_data(
        id: impl Into<String>,
        definition: TableDefinition,
        data_formatter: Option<DataFormatter>,
        filters: Option<QueryParams>,
    ) -> Self {
        Self::new(
            id,
            TableAction::RequestData(RequestData {
                definition: Some(definition),
                data_formatter,
                filters,
                model_type: None,
            }),
        )
    }

    /// Re-requests data for an existing table with its previous filters.
    pub fn refresh_data(id: impl Into<String>) -> Self {
        Self::new(id, TableAction::RequestData(RequestData::default()))
    }

    /// Destroys a table.
    pub fn destroy_instance(id: impl Into<String>) -> Self {
        Self::new(id, TableAction::DestroyInstance)
    }

    /// Sets the quick filter value.
    pub fn filter(id: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(
            id,
            TableAction::Filter {
                value: value.into(),
            },
        )
    }

    /// Replaces the advanced filters.
    pub fn advanced_filter(id: impl Into<String>, advanced_filters: Vec<AdvancedFilter>) -> Self {
        Self::new(
            id,
            TableAction::AdvancedFilter {
                advanced_filters: Some(advanced_filters),
            },
        )
    }

    /// Moves one page.
    pub fn paginate(id: impl Into<String>, direction: PageDirection) -> Self {
        Self::new(id, TableAction::Paginate { direction })
    }

    /// Sorts by a column.
    pub fn sort_change(id: impl Into<String>, col_index: usize, direction: SortDirection) -> Self {
        Self::new(
            id,
            TableAction::TableSort {
                col_index,
                direction,
            },
        )
    }

    /// Selects or deselects every filtered record.
    pub fn toggle_bulk_select(id: impl Into<String>, deselect: bool) -> Self {
        Self::new(id, TableAction::ToggleBulkSelect { deselect })
    }

    /// Toggles a displayed row.
    pub fn toggle_row_select(id: impl Into<String>, row_index: usize) -> Self {
        Self::new(id, TableAction::ToggleRowSelect { row_index })
    }
}

/// Wire shape of an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAction {
    pub action_type: String,
    #[serde(default, alias = "component", skip_serializing_if = "Option::is_none")]
    pub producer_type: Option<String>,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RequestDataWire {
    #[serde(default)]
    definition: Option<TableDefinition>,
    #[serde(default)]
    filters: Option<QueryParams>,
    #[serde(default)]
    model_type: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SortWire {
    col_index: usize,
    direction: SortDirection,
}

#[derive(Deserialize)]
struct FilterWire {
    #[serde(default)]
    value: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdvancedFilterWire {
    #[serde(default)]
    advanced_filters: Option<Vec<AdvancedFilter>>,
}

#[derive(Deserialize)]
struct PaginateWire {
    direction: PageDirection,
}

#[derive(Deserialize)]
struct BulkSelectWire {
    #[serde(default)]
    deselect: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RowSelectWire {
    row_index: usize,
}

fn payload<T: DeserializeOwned>(action_type: &str, data: Option<serde_json::Value>) -> Result<T, ActionError> {
    let data = data.ok_or_else(|| ActionError::missing_data(action_type))?;
    serde_json::from_value(data).map_err(|e| ActionError::invalid_data(action_type, e))
}

impl TryFrom<RawAction> for Action {
    type Error = ActionError;

    fn try_from(raw: RawAction) -> Result<Self, Self::Error> {
        let RawAction {
            action_type,
            producer_type,
            id,
            data,
        } = raw;
        let action_type = action_type.as_str();

        let kind = match action_type {
            "REQUEST_DATA" => {
                let wire: RequestDataWire = match data {
                    Some(data) => serde_json::from_value(data)
                        .map_err(|e| ActionError::invalid_data(action_type, e))?,
                    None => RequestDataWire {
                        definition: None,
                        filters: None,
                        model_type: None,
                    },
                };
                TableAction::RequestData(RequestData {
                    definition: wire.definition,
                    data_formatter: None,
                    filters: wire.filters,
                    model_type: wire.model_type,
                })
            }
            "TABLE_SORT" => {
                let wire: SortWire = payload(action_type, data)?;
                TableAction::TableSort {
                    col_index: wire.col_index,
                    direction: wire.direction,
                }
            }
            "FILTER" => {
                let wire: FilterWire = payload(action_type, data)?;
                TableAction::Filter { value: wire.value }
            }
            "ADVANCED_FILTER" => {
                let wire: AdvancedFilterWire = payload(action_type, data)?;
                TableAction::AdvancedFilter {
                    advanced_filters: wire.advanced_filters,
                }
            }
            "PAGINATE" => {
                let wire: PaginateWire = payload(action_type, data)?;
                TableAction::Paginate {
                    direction: wire.direction,
                }
            }
            "TOGGLE_BULK_SELECT" => {
                let wire: BulkSelectWire = payload(action_type, data)?;
                TableAction::ToggleBulkSelect {
                    deselect: wire.deselect,
                }
            }
            "TOGGLE_ROW_SELECT" => {
                let wire: RowSelectWire = payload(action_type, data)?;
                TableAction::ToggleRowSelect {
                    row_index: wire.row_index,
                }
            }
            "DESTROY_INSTANCE" => TableAction::DestroyInstance,
            other => return Err(ActionError::UnknownType(other.to_string())),
        };

        Ok(Action {
            producer_type,
            id,
            kind,
        })
    }
}
