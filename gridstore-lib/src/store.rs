//! Table store
//!
//! [`TableStore`] routes [`Action`]s to [`Table`] instances held in an
//! [`InstanceRegistry`] and emits `change` / `fail` notifications. Dispatch is
//! synchronous; data requests are queued and run by [`TableStore::settle`]
//! (or by the host via [`TableStore::take_pending`] and
//! [`TableStore::complete`]).
//!
//! A store shared behind `Arc<RwLock<_>>` is driven through [`attach`] and
//! [`settle_shared`]. Both release the lock before listeners run, so a
//! `change` listener may read the store.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use gridstore_lib::action::Action;
//! use gridstore_lib::config::StoreConfig;
//! use gridstore_lib::fetch::InMemoryFetcher;
//! use gridstore_lib::model::{ColumnDefinition, DataType, TableDefinition};
//! use gridstore_lib::store::TableStore;
//!
//! # tokio_test_block(async {
//! let fetcher = Arc::new(InMemoryFetcher::new());
//! fetcher.insert("/people", serde_json::json!([{"name": "Bob"}]));
//!
//! let mut store = TableStore::new(StoreConfig::default(), fetcher);
//! let definition = TableDefinition::new("/people")
//!     .with_col(ColumnDefinition::new("name", DataType::String));
//! store.dispatch(Action::request_data("people", definition, None, None));
//! store.settle().await;
//!
//! assert_eq!(store.get_instance("people").unwrap().get_data_count(), 1);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f);
//! # }
//! ```

use std::sync::Arc;
use std::sync::RwLock;

use crate::action::Action;
use crate::action::RawAction;
use crate::action::TableAction;
use crate::bus::DispatchToken;
use crate::bus::Dispatcher;
use crate::config::StoreConfig;
use crate::error::DispatchError;
use crate::events::EventBatch;
use crate::events::EventKind;
use crate::events::ListenerId;
use crate::events::StoreEvent;
use crate::fetch;
use crate::fetch::FetchResponse;
use crate::fetch::Fetcher;
use crate::fetch::PendingRequest;
use crate::model::TableDefinition;
use crate::registry::InstanceRegistry;
use crate::table::DataFormatter;
use crate::table::Table;

/// Routes table actions and owns every table instance.
pub struct TableStore {
    registry: InstanceRegistry<Table>,
    fetcher: Arc<dyn Fetcher>,
    pending: Vec<PendingRequest>,
}

impl std::fmt::Debug for TableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableStore")
            .field("instances", &self.registry.instance_ids())
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

impl TableStore {
    /// Creates a store that loads data through `fetcher`.
    pub fn new(config: StoreConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            registry: InstanceRegistry::new(config),
            fetcher,
            pending: Vec::new(),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &StoreConfig {
        self.registry.config()
    }

    /// Returns the fetcher data requests run against.
    pub fn fetcher(&self) -> Arc<dyn Fetcher> {
        Arc::clone(&self.fetcher)
    }

    /// Handles one action.
    ///
    /// Actions from producers this store does not accept, or addressed to an
    /// id with no instance, are ignored. Every handled action except
    /// REQUEST_DATA and DESTROY_INSTANCE emits `change` and `change:<id>`;
    /// REQUEST_DATA emits once its data request completes.
    pub fn dispatch(&mut self, action: Action) {
        self.route(action);
        self.registry.flush_events();
    }

    /// Handles one action like [`dispatch`](Self::dispatch) but leaves the
    /// resulting events queued for [`take_events`](Self::take_events).
    pub fn route(&mut self, action: Action) {
        let Action {
            producer_type,
            id,
            kind,
        } = action;
        if !self.registry.should_handle_action(producer_type.as_deref()) {
            log::trace!("[store] ignoring {} from {:?}", kind.action_type(), producer_type);
            return;
        }
        log::debug!("[store] {} {}", kind.action_type(), id);

        let handled = match kind {
            TableAction::RequestData(request) => {
                if let Some(pending) =
                    self.registry
                        .handle_request_data_action(producer_type.as_deref(), &id, request)
                {
                    self.pending.push(pending);
                }
                return;
            }
            TableAction::DestroyInstance => {
                self.registry.destroy_instance(&id);
                return;
            }
            TableAction::TableSort {
                col_index,
                direction,
            } => self.with_table(&id, |table| table.sort_data(col_index, direction)),
            TableAction::Filter { value } => self.with_table(&id, |table| table.set_filter_value(value)),
            TableAction::AdvancedFilter { advanced_filters } => {
                self.with_table(&id, |table| table.set_advanced_filters(advanced_filters))
            }
            TableAction::Paginate { direction } => self.with_table(&id, |table| table.paginate(direction)),
            TableAction::ToggleBulkSelect { deselect } => {
                self.with_table(&id, |table| table.update_bulk_selection(deselect))
            }
            TableAction::ToggleRowSelect { row_index } => {
                self.with_table(&id, |table| table.update_row_selection(row_index))
            }
        };

        if handled {
            self.registry.emit_change(Some(&id), Vec::new());
        }
    }

    /// Handles an action in its wire shape. Undecodable actions are ignored.
    pub fn dispatch_raw(&mut self, raw: RawAction) {
        match Action::try_from(raw) {
            Ok(action) => self.dispatch(action),
            Err(e) => log::debug!("[store] ignoring action: {}", e),
        }
    }

    fn with_table<F>(&mut self, id: &str, f: F) -> bool
    where
        F: FnOnce(&mut Table),
    {
        match self.registry.get_instance_mut(id) {
            Some(table) => {
                f(table);
                true
            }
            None => {
                log::debug!("[store] no table {}", id);
                false
            }
        }
    }

    /// Removes and returns the queued data requests.
    pub fn take_pending(&mut self) -> Vec<PendingRequest> {
        std::mem::take(&mut self.pending)
    }

    /// Returns `true` while data requests are queued.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Applies a data response. Returns the emitted kind, or `None` if it was stale.
    pub fn complete(&mut self, response: FetchResponse) -> Option<EventKind> {
        let kind = self.registry.complete(response);
        self.registry.flush_events();
        kind
    }

    /// Applies a data response and leaves its event queued.
    pub fn apply_response(&mut self, response: FetchResponse) -> Option<EventKind> {
        self.registry.complete(response)
    }

    /// Drains events queued by [`route`](Self::route) and
    /// [`apply_response`](Self::apply_response).
    pub fn take_events(&mut self) -> EventBatch {
        self.registry.take_events()
    }

    /// Runs every queued data request and applies the responses.
    ///
    /// Returns the number of responses applied.
    pub async fn settle(&mut self) -> usize {
        let mut applied = 0;
        while self.has_pending() {
            let requests = self.take_pending();
            let responses = fetch::execute_all(self.fetcher.as_ref(), requests).await;
            for response in responses {
                if self.complete(response).is_some() {
                    applied += 1;
                }
            }
        }
        applied
    }

    /// Returns the table stored under `id`.
    pub fn get_instance(&self, id: &str) -> Option<&Table> {
        self.registry.get_instance(id)
    }

    /// Ids of every live table, sorted.
    pub fn instance_ids(&self) -> Vec<&str> {
        self.registry.instance_ids()
    }

    /// Selection keys of table `id`, sorted. Empty if the table does not exist.
    pub fn get_selected_items(&self, id: &str) -> Vec<String> {
        let Some(table) = self.registry.get_instance(id) else {
            return Vec::new();
        };
        let mut keys: Vec<String> = table.get_selected_items().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Creates (or replaces) a table without requesting data.
    pub fn create_instance(
        &mut self,
        id: &str,
        definition: TableDefinition,
        data_formatter: Option<DataFormatter>,
    ) -> &Table {
        self.registry.create_instance(id, definition, data_formatter)
    }

    /// Removes a table.
    pub fn destroy_instance(&mut self, id: &str) -> Option<Table> {
        self.registry.destroy_instance(id)
    }

    /// Subscribes to `change`, `fail`, `change:<id>` or `fail:<id>`.
    pub fn on<F>(&mut self, name: impl Into<String>, listener: F) -> ListenerId
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        self.registry.on(name, listener)
    }

    /// Unsubscribes a listener.
    pub fn off(&mut self, listener: ListenerId) -> bool {
        self.registry.off(listener)
    }
}

/// Registers a shared store on an action bus.
///
/// Events are delivered after the write lock is released.
pub fn attach(store: &Arc<RwLock<TableStore>>, bus: &Dispatcher<Action>) -> Result<DispatchToken, DispatchError> {
    let store = Arc::clone(store);
    bus.register(move |action: &Action| {
        let events = match store.write() {
            Ok(mut store) => {
                store.route(action.clone());
                store.take_events()
            }
            Err(_) => {
                log::error!("[store] lock poisoned, dropping {}", action.kind.action_type());
                return;
            }
        };
        events.deliver();
    })
}

/// Settles a shared store without holding its lock across the fetches or
/// while listeners run.
pub async fn settle_shared(store: &Arc<RwLock<TableStore>>) -> usize {
    let mut applied = 0;
    loop {
        let (fetcher, requests) = match store.write() {
            Ok(mut guard) => (guard.fetcher(), guard.take_pending()),
            Err(_) => {
                log::error!("[store] lock poisoned, cannot settle");
                return applied;
            }
        };
        if requests.is_empty() {
            return applied;
        }

        let responses = fetch::execute_all(fetcher.as_ref(), requests).await;
        let events = {
            let Ok(mut guard) = store.write() else {
                log::error!("[store] lock poisoned, dropping responses");
                return applied;
            };
            for response in responses {
                if guard.apply_response(response).is_some() {
                    applied += 1;
                }
            }
            guard.take_events()
        };
        events.deliver();
    }
}
