//! End-to-end action routing through the bus and the table store.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::RwLock;

use gridstore_lib::Action;
use gridstore_lib::RawAction;
use gridstore_lib::StoreConfig;
use gridstore_lib::TableStore;
use gridstore_lib::bus::Dispatcher;
use gridstore_lib::events::EventKind;
use gridstore_lib::fetch::FetchResponse;
use gridstore_lib::fetch::InMemoryFetcher;
use gridstore_lib::fetch::QueryParams;
use gridstore_lib::fetch::execute_all;
use gridstore_lib::model::PageDirection;
use gridstore_lib::model::SortDirection;
use gridstore_lib::model::TableDefinition;
use gridstore_lib::model::Value;
use gridstore_lib::store::attach;
use gridstore_lib::store::settle_shared;

const DEVICES: &str = r#"{
    "url": "/devices",
    "sortColIndex": 1,
    "pagination": {"size": 2},
    "cols": [
        {"dataProperty": "serial", "dataType": "select"},
        {"dataProperty": "name", "headerLabel": "Name", "sortDirection": "ascending", "quickFilter": true},
        {"dataProperty": "load", "headerLabel": "Load", "dataType": "percent"},
        {"dataProperty": "lastSeen", "headerLabel": "Seen", "dataType": "status", "timeFormat": "%Y-%m-%d", "onlineLimit": 30}
    ]
}"#;

fn devices() -> TableDefinition {
    serde_json::from_str(DEVICES).unwrap()
}

fn payload() -> serde_json::Value {
    serde_json::json!([
        {"serial": "s-3", "name": "gamma", "load": 50, "lastSeen": "2024-01-03T10:00:00Z"},
        {"serial": "s-1", "name": "alpha", "load": 5, "lastSeen": null},
        {"serial": "s-2", "name": "Beta", "load": 75, "lastSeen": "2024-01-02T10:00:00Z"}
    ])
}

struct Harness {
    store: Arc<RwLock<TableStore>>,
    bus: Dispatcher<Action>,
    fetcher: Arc<InMemoryFetcher>,
    events: Arc<Mutex<Vec<String>>>,
}

impl Harness {
    fn new() -> Self {
        let fetcher = Arc::new(InMemoryFetcher::new());
        fetcher.insert("/devices", payload());
        let mut store = TableStore::new(StoreConfig::default(), fetcher.clone());

        let events = Arc::new(Mutex::new(Vec::new()));
        for name in ["change", "fail", "change:devices", "fail:devices"] {
            let events = Arc::clone(&events);
            store.on(name, move |event| events.lock().unwrap().push(event.name.clone()));
        }

        let store = Arc::new(RwLock::new(store));
        let bus = Dispatcher::new();
        attach(&store, &bus).unwrap();
        Self {
            store,
            bus,
            fetcher,
            events,
        }
    }

    fn send(&self, action: Action) {
        self.bus.dispatch(&action).unwrap();
    }

    fn events(&self) -> Vec<String> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }

    fn names(&self) -> Vec<String> {
        let store = self.store.read().unwrap();
        store
            .get_instance("devices")
            .unwrap()
            .get_data()
            .iter()
            .map(|r| r.value("name").to_display_string())
            .collect()
    }
}

#[tokio::test]
async fn test_load_sort_page_select() {
    let h = Harness::new();
    h.send(Action::request_data("devices", devices(), None, None));
    assert!(h.events().is_empty());
    assert_eq!(settle_shared(&h.store).await, 1);
    assert_eq!(h.events(), ["change", "change:devices"]);

    assert_eq!(h.names(), ["alpha", "Beta"]);
    {
        let store = h.store.read().unwrap();
        let table = store.get_instance("devices").unwrap();
        assert_eq!(table.get_data_count(), 3);
        let first = &table.get_data()[0];
        assert_eq!(first.value("load"), &Value::from("5%"));
        assert_eq!(first.value("lastSeen"), &Value::from("--"));
    }

    h.send(Action::paginate("devices", PageDirection::Right));
    assert_eq!(h.names(), ["gamma"]);

    h.send(Action::sort_change("devices", 1, SortDirection::Descending));
    assert_eq!(h.names(), ["gamma", "Beta"]);

    h.send(Action::toggle_row_select("devices", 1));
    h.send(Action::toggle_row_select("devices", 0));
    assert_eq!(h.store.read().unwrap().get_selected_items("devices"), ["s-2", "s-3"]);
    assert_eq!(h.events().len(), 8);
}

#[tokio::test]
async fn test_filter_then_bulk_select() {
    let h = Harness::new();
    h.send(Action::request_data("devices", devices(), None, None));
    settle_shared(&h.store).await;

    h.send(Action::filter("devices", "al"));
    assert_eq!(h.names(), ["alpha"]);
    h.send(Action::filter("devices", "Name:beta"));
    assert_eq!(h.names(), ["Beta"]);

    h.send(Action::toggle_bulk_select("devices", false));
    assert_eq!(h.store.read().unwrap().get_selected_items("devices"), ["s-2"]);

    h.send(Action::filter("devices", Value::Null));
    h.send(Action::toggle_bulk_select("devices", false));
    assert_eq!(
        h.store.read().unwrap().get_selected_items("devices"),
        ["s-1", "s-2", "s-3"]
    );
}

#[tokio::test]
async fn test_refresh_reuses_filters() {
    let h = Harness::new();
    let filters = QueryParams::new().with("site", "7");
    h.send(Action::request_data("devices", devices(), None, Some(filters.clone())));
    settle_shared(&h.store).await;

    h.send(Action::refresh_data("devices"));
    settle_shared(&h.store).await;

    let requests = h.fetcher.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0], ("/devices".to_string(), filters.clone()));
    assert_eq!(requests[1], ("/devices".to_string(), filters));
}

#[tokio::test]
async fn test_refresh_unknown_instance_is_dropped() {
    let h = Harness::new();
    h.send(Action::refresh_data("devices"));
    assert_eq!(settle_shared(&h.store).await, 0);
    assert!(h.fetcher.requests().is_empty());
    assert!(h.events().is_empty());
}

#[tokio::test]
async fn test_fetch_failure() {
    let h = Harness::new();
    h.fetcher.fail("/devices", "503");
    h.send(Action::request_data("devices", devices(), None, None));
    settle_shared(&h.store).await;

    assert_eq!(h.events(), ["fail", "fail:devices"]);
    let store = h.store.read().unwrap();
    assert!(!store.get_instance("devices").unwrap().is_data_available());
}

#[tokio::test]
async fn test_stale_response_is_discarded() {
    let fetcher = Arc::new(InMemoryFetcher::new());
    fetcher.insert("/devices", payload());
    let mut store = TableStore::new(StoreConfig::default(), fetcher.clone());

    store.dispatch(Action::request_data("devices", devices(), None, None));
    let first = store.take_pending();
    store.dispatch(Action::refresh_data("devices"));
    let second = store.take_pending();

    let mut responses = execute_all(fetcher.as_ref(), second).await;
    responses.extend(execute_all(fetcher.as_ref(), first).await);
    let kinds: Vec<Option<EventKind>> = responses
        .into_iter()
        .map(|response: FetchResponse| store.complete(response))
        .collect();

    assert_eq!(kinds, [Some(EventKind::Change), None]);
}

#[tokio::test]
async fn test_destroy_discards_in_flight_response() {
    let h = Harness::new();
    h.send(Action::request_data("devices", devices(), None, None));
    h.send(Action::destroy_instance("devices"));

    assert_eq!(settle_shared(&h.store).await, 0);
    assert!(h.events().is_empty());
    assert!(h.store.read().unwrap().get_instance("devices").is_none());
}

#[tokio::test]
async fn test_raw_actions_from_json() {
    let fetcher = Arc::new(InMemoryFetcher::new());
    fetcher.insert("/devices", payload());
    let mut store = TableStore::new(StoreConfig::default(), fetcher);

    let script: Vec<RawAction> = serde_json::from_value(serde_json::json!([
        {"actionType": "REQUEST_DATA", "component": "Table", "id": "devices",
         "data": {"definition": serde_json::from_str::<serde_json::Value>(DEVICES).unwrap()}},
        {"actionType": "SOMETHING_ELSE", "component": "Table", "id": "devices"},
        {"actionType": "TABLE_SORT", "component": "Chart", "id": "devices",
         "data": {"colIndex": 1, "direction": "descending"}}
    ]))
    .unwrap();
    for raw in script {
        store.dispatch_raw(raw);
        store.settle().await;
    }

    let table = store.get_instance("devices").unwrap();
    assert_eq!(table.get_sort_col_index(), Some(1));
    assert_eq!(
        table.get_col_definitions()[1].sort_direction,
        Some(SortDirection::Ascending)
    );
}
