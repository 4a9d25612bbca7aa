//! Instance registry
//!
//! [`InstanceRegistry`] is the reusable part of a store: it owns the instances
//! keyed by id, decides which actions it acts on, issues data requests and
//! applies their responses, and notifies listeners. It is generic over the
//! instance type so other kinds of grid-like components can reuse it.
//!
//! Data requests cross an asynchronous boundary. [`request_data`] returns a
//! [`PendingRequest`] tagged with a sequence number; the caller executes it
//! and hands the [`FetchResponse`] back to [`complete`]. A response whose
//! instance was destroyed, or that was superseded by a newer request for the
//! same id, is dropped without touching state or emitting anything.
//!
//! Emitted events are queued. The owner delivers them with
//! [`take_events`] once it no longer holds a lock listeners may need.
//!
//! [`request_data`]: InstanceRegistry::request_data
//! [`complete`]: InstanceRegistry::complete
//! [`take_events`]: InstanceRegistry::take_events

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::config::StoreConfig;
use crate::events::EventBatch;
use crate::events::EventEmitter;
use crate::events::EventKind;
use crate::events::ListenerId;
use crate::events::StoreEvent;
use crate::fetch::FetchResponse;
use crate::fetch::PendingRequest;
use crate::fetch::QueryParams;
use crate::model::Value;

/// An entity managed by an [`InstanceRegistry`].
pub trait Instance: Send {
    /// Static description the instance is created from.
    type Definition;
    /// Optional payload post-processor.
    type Formatter;

    /// Creates an instance.
    fn create(
        id: &str,
        definition: Self::Definition,
        formatter: Option<Self::Formatter>,
        config: &StoreConfig,
    ) -> Self;

    /// URL data is requested from.
    fn url(&self) -> &str;

    /// Filters the last data request was made with.
    fn request_filters(&self) -> Option<&QueryParams>;

    /// Remembers the filters of the latest data request.
    fn set_request_filters(&mut self, filters: Option<QueryParams>);

    /// Applies a successfully fetched payload.
    fn on_data_received(&mut self, payload: serde_json::Value);

    /// Applies a failed fetch.
    fn error_function(&mut self);
}

/// Payload of a REQUEST_DATA action.
#[derive(Debug, Clone)]
pub struct RequestData<D, F> {
    /// Definition to create the instance from if it does not exist yet.
    pub definition: Option<D>,
    /// Formatter for a newly created instance.
    pub data_formatter: Option<F>,
    /// Query parameters. Falls back to the instance's previous filters.
    pub filters: Option<QueryParams>,
    /// Model type, checked against the configured model types.
    pub model_type: Option<String>,
}

impl<D, F> Default for RequestData<D, F> {
    fn default() -> Self {
        Self {
            definition: None,
            data_formatter: None,
            filters: None,
            model_type: None,
        }
    }
}

/// Instances keyed by id, plus request bookkeeping and listeners.
#[derive(Debug)]
pub struct InstanceRegistry<E> {
    config: StoreConfig,
    collection: HashMap<String, E>,
    emitter: EventEmitter,
    next_seq: u64,
    /// Latest issued sequence number per instance id.
    latest: HashMap<String, u64>,
}

impl<E: Instance> InstanceRegistry<E> {
    /// Creates an empty registry.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            collection: HashMap::new(),
            emitter: EventEmitter::new(),
            next_seq: 1,
            latest: HashMap::new(),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Returns `true` if an action declared by `producer_type` is ours to handle.
    pub fn should_handle_action(&self, producer_type: Option<&str>) -> bool {
        self.config.producer_types.accepts(producer_type)
    }

    /// Creates (or replaces) the instance stored under `id`.
    pub fn create_instance(
        &mut self,
        id: &str,
        definition: E::Definition,
        formatter: Option<E::Formatter>,
    ) -> &mut E {
        log::debug!("[registry] create {}", id);
        self.latest.remove(id);
        let instance = E::create(id, definition, formatter, &self.config);
        match self.collection.entry(id.to_string()) {
            Entry::Occupied(mut entry) => {
                entry.insert(instance);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(instance),
        }
    }

    /// Removes an instance. Responses still in flight for it are discarded.
    pub fn destroy_instance(&mut self, id: &str) -> Option<E> {
        log::debug!("[registry] destroy {}", id);
        self.latest.remove(id);
        self.collection.remove(id)
    }

    /// Returns the instance stored under `id`.
    pub fn get_instance(&self, id: &str) -> Option<&E> {
        self.collection.get(id)
    }

    /// Returns the instance stored under `id` mutably.
    pub fn get_instance_mut(&mut self, id: &str) -> Option<&mut E> {
        self.collection.get_mut(id)
    }

    /// Ids of every live instance, sorted.
    pub fn instance_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.collection.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Issues a data request for instance `id`.
    ///
    /// `filters` replaces the instance's remembered request filters; `None`
    /// reuses them. Returns `None` if the instance does not exist.
    pub fn request_data(&mut self, id: &str, filters: Option<QueryParams>) -> Option<PendingRequest> {
        let instance = self.collection.get_mut(id)?;
        let params = match filters {
            Some(filters) => filters,
            None => instance.request_filters().cloned().unwrap_or_default(),
        };
        instance.set_request_filters(Some(params.clone()));

        let seq = self.next_seq;
        self.next_seq += 1;
        self.latest.insert(id.to_string(), seq);

        Some(PendingRequest {
            id: id.to_string(),
            url: instance.url().to_string(),
            params,
            seq,
        })
    }

    /// Handles a REQUEST_DATA action.
    ///
    /// Creates the instance from the definition if it does not exist yet,
    /// then issues a request with the action's filters (or the instance's
    /// previous ones). Returns `None` when the action is gated out or no
    /// instance can be found or created.
    pub fn handle_request_data_action(
        &mut self,
        producer_type: Option<&str>,
        id: &str,
        request: RequestData<E::Definition, E::Formatter>,
    ) -> Option<PendingRequest> {
        if !self.should_handle_action(producer_type) {
            return None;
        }
        if !self.config.accepts_model_type(request.model_type.as_deref()) {
            log::debug!(
                "[registry] {} ignoring model type {:?}",
                id,
                request.model_type
            );
            return None;
        }

        if !self.collection.contains_key(id) {
            match request.definition {
                Some(definition) => {
                    self.create_instance(id, definition, request.data_formatter);
                }
                None => {
                    log::debug!("[registry] {} has no instance and no definition", id);
                    return None;
                }
            }
        }

        self.request_data(id, request.filters)
    }

    /// Returns `true` if `request` is the latest one issued for a live instance.
    pub fn is_current(&self, request: &PendingRequest) -> bool {
        self.latest.get(&request.id) == Some(&request.seq) && self.collection.contains_key(&request.id)
    }

    /// Applies a fetch response and queues change or fail for its instance.
    ///
    /// Returns the emitted kind, or `None` if the response was stale.
    pub fn complete(&mut self, response: FetchResponse) -> Option<EventKind> {
        let FetchResponse { request, result } = response;
        if !self.is_current(&request) {
            log::debug!("[registry] discarding stale response #{} for {}", request.seq, request.id);
            return None;
        }
        self.latest.remove(&request.id);

        let instance = self.collection.get_mut(&request.id)?;
        match result {
            Ok(payload) => {
                instance.on_data_received(payload);
                self.emit_change(Some(&request.id), Vec::new());
                Some(EventKind::Change)
            }
            Err(error) => {
                instance.error_function();
                self.emit_fail(Some(&request.id), vec![Value::from(error.to_string())]);
                Some(EventKind::Fail)
            }
        }
    }

    /// Subscribes to events named `name` (`change`, `fail:<id>`, ...).
    pub fn on<F>(&mut self, name: impl Into<String>, listener: F) -> ListenerId
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        self.emitter.on(name, listener)
    }

    /// Unsubscribes a listener.
    pub fn off(&mut self, listener: ListenerId) -> bool {
        self.emitter.off(listener)
    }

    /// Queues `change` and, with an id, `change:<id>`.
    pub fn emit_change(&mut self, id: Option<&str>, args: Vec<Value>) {
        self.emitter.emit_change(id, args);
    }

    /// Queues `fail` and, with an id, `fail:<id>`.
    pub fn emit_fail(&mut self, id: Option<&str>, args: Vec<Value>) {
        self.emitter.emit_fail(id, args);
    }

    /// Drains queued events, resolved against the current listeners.
    pub fn take_events(&mut self) -> EventBatch {
        self.emitter.take()
    }

    /// Delivers queued events immediately.
    pub fn flush_events(&mut self) {
        self.emitter.flush();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::config::ProducerFilter;
    use crate::error::FetchError;

    /// Minimal instance that records what happened to it.
    #[derive(Debug, Default)]
    struct Probe {
        url: String,
        filters: Option<QueryParams>,
        received: Vec<serde_json::Value>,
        failures: usize,
    }

    impl Instance for Probe {
        type Definition = String;
        type Formatter = ();

        fn create(_id: &str, url: String, _formatter: Option<()>, _config: &StoreConfig) -> Self {
            Probe {
                url,
                ..Probe::default()
            }
        }

        fn url(&self) -> &str {
            &self.url
        }

        fn request_filters(&self) -> Option<&QueryParams> {
            self.filters.as_ref()
        }

        fn set_request_filters(&mut self, filters: Option<QueryParams>) {
            self.filters = filters;
        }

        fn on_data_received(&mut self, payload: serde_json::Value) {
            self.received.push(payload);
        }

        fn error_function(&mut self) {
            self.failures += 1;
        }
    }

    fn registry(producers: ProducerFilter) -> InstanceRegistry<Probe> {
        InstanceRegistry::new(StoreConfig::default().with_producer_types(producers))
    }

    fn request(url: &str) -> RequestData<String, ()> {
        RequestData {
            definition: Some(url.to_string()),
            ..RequestData::default()
        }
    }

    fn events(registry: &mut InstanceRegistry<Probe>, names: &[&str]) -> Arc<Mutex<Vec<String>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        for name in names {
            let seen = Arc::clone(&seen);
            registry.on(*name, move |event| seen.lock().unwrap().push(event.name.clone()));
        }
        seen
    }

    #[test]
    fn test_should_handle_action() {
        let reg = registry(ProducerFilter::One("foo".into()));
        assert!(reg.should_handle_action(Some("foo")));
        assert!(!reg.should_handle_action(Some("Foo")));
        assert!(!reg.should_handle_action(Some("FOO")));
        assert!(!reg.should_handle_action(None));

        let reg = registry(ProducerFilter::AnyOf(vec!["foo".into(), "bar".into()]));
        assert!(reg.should_handle_action(Some("bar")));
        assert!(!reg.should_handle_action(Some("baz")));

        let reg = registry(ProducerFilter::Any);
        assert!(reg.should_handle_action(Some("anything")));
    }

    #[test]
    fn test_request_data_creates_instance() {
        let mut reg = registry(ProducerFilter::One("foo".into()));
        let pending = reg
            .handle_request_data_action(Some("foo"), "bar", request("/bar.json"))
            .unwrap();
        assert_eq!(pending.id, "bar");
        assert_eq!(pending.url, "/bar.json");
        assert!(reg.get_instance("bar").is_some());
    }

    #[test]
    fn test_request_data_wrong_producer() {
        let mut reg = registry(ProducerFilter::One("foo".into()));
        assert!(reg.handle_request_data_action(Some("baz"), "bar", request("/bar")).is_none());
        assert!(reg.get_instance("bar").is_none());
    }

    #[test]
    fn test_request_data_model_type_gate() {
        let mut reg = InstanceRegistry::<Probe>::new(
            StoreConfig::default()
                .with_producer_types(ProducerFilter::Any)
                .with_model_types(vec!["type".into()]),
        );
        let mut data = request("/bar");
        data.model_type = Some("bar".into());
        assert!(reg.handle_request_data_action(None, "bar", data).is_none());

        let mut data = request("/bar");
        data.model_type = Some("type".into());
        assert!(reg.handle_request_data_action(None, "bar", data).is_some());
    }

    #[test]
    fn test_request_data_without_definition_or_instance() {
        let mut reg = registry(ProducerFilter::Any);
        assert!(
            reg.handle_request_data_action(None, "ghost", RequestData::default())
                .is_none()
        );
    }

    #[test]
    fn test_request_data_reuses_previous_filters() {
        let mut reg = registry(ProducerFilter::Any);
        let mut data = request("/bar");
        data.filters = Some(QueryParams::new().with("site", "4"));
        reg.handle_request_data_action(None, "bar", data).unwrap();

        let pending = reg
            .handle_request_data_action(None, "bar", RequestData::default())
            .unwrap();
        assert_eq!(pending.params.get("site"), Some("4"));

        let mut data = RequestData::default();
        data.filters = Some(QueryParams::new().with("site", "5"));
        let pending = reg.handle_request_data_action(None, "bar", data).unwrap();
        assert_eq!(pending.params.get("site"), Some("5"));
    }

    #[test]
    fn test_existing_instance_is_not_recreated() {
        let mut reg = registry(ProducerFilter::Any);
        reg.handle_request_data_action(None, "bar", request("/one")).unwrap();
        let pending = reg
            .handle_request_data_action(None, "bar", request("/two"))
            .unwrap();
        assert_eq!(pending.url, "/one");
    }

    #[test]
    fn test_complete_success_emits_change() {
        let mut reg = registry(ProducerFilter::Any);
        let seen = events(&mut reg, &["change", "change:bar", "fail"]);
        let pending = reg.handle_request_data_action(None, "bar", request("/bar")).unwrap();

        let kind = reg.complete(FetchResponse {
            request: pending,
            result: Ok(serde_json::json!([1])),
        });
        assert!(seen.lock().unwrap().is_empty());
        reg.flush_events();

        assert_eq!(kind, Some(EventKind::Change));
        assert_eq!(*seen.lock().unwrap(), ["change", "change:bar"]);
        assert_eq!(reg.get_instance("bar").unwrap().received.len(), 1);
    }

    #[test]
    fn test_complete_failure_emits_fail() {
        let mut reg = registry(ProducerFilter::Any);
        let seen = events(&mut reg, &["change", "fail", "fail:bar"]);
        let pending = reg.handle_request_data_action(None, "bar", request("/bar")).unwrap();

        let kind = reg.complete(FetchResponse {
            request: pending,
            result: Err(FetchError::Failed("boom".into())),
        });
        reg.flush_events();

        assert_eq!(kind, Some(EventKind::Fail));
        assert_eq!(*seen.lock().unwrap(), ["fail", "fail:bar"]);
        assert_eq!(reg.get_instance("bar").unwrap().failures, 1);
    }

    #[test]
    fn test_superseded_response_is_discarded() {
        let mut reg = registry(ProducerFilter::Any);
        let seen = events(&mut reg, &["change"]);
        let first = reg.handle_request_data_action(None, "bar", request("/bar")).unwrap();
        let second = reg.request_data("bar", None).unwrap();
        assert!(second.seq > first.seq);

        assert_eq!(
            reg.complete(FetchResponse {
                request: first,
                result: Ok(serde_json::json!("old")),
            }),
            None
        );
        assert_eq!(
            reg.complete(FetchResponse {
                request: second,
                result: Ok(serde_json::json!("new")),
            }),
            Some(EventKind::Change)
        );
        assert_eq!(
            reg.get_instance("bar").unwrap().received,
            [serde_json::json!("new")]
        );
        reg.flush_events();
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_response_after_destroy_is_discarded() {
        let mut reg = registry(ProducerFilter::Any);
        let seen = events(&mut reg, &["change", "fail"]);
        let pending = reg.handle_request_data_action(None, "bar", request("/bar")).unwrap();
        assert!(reg.destroy_instance("bar").is_some());

        assert_eq!(
            reg.complete(FetchResponse {
                request: pending,
                result: Ok(serde_json::json!([])),
            }),
            None
        );
        assert!(reg.get_instance("bar").is_none());
        reg.flush_events();
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_response_after_recreate_is_discarded() {
        let mut reg = registry(ProducerFilter::Any);
        let pending = reg.handle_request_data_action(None, "bar", request("/bar")).unwrap();
        reg.destroy_instance("bar");
        reg.create_instance("bar", "/bar".into(), None);

        assert_eq!(
            reg.complete(FetchResponse {
                request: pending,
                result: Ok(serde_json::json!([])),
            }),
            None
        );
        assert!(reg.get_instance("bar").unwrap().received.is_empty());
    }

    #[test]
    fn test_off_stops_delivery() {
        let mut reg = registry(ProducerFilter::Any);
        let seen = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&seen);
        let id = reg.on("change", move |_| *sink.lock().unwrap() += 1);
        reg.emit_change(None, vec![]);
        reg.flush_events();
        assert!(reg.off(id));
        reg.emit_change(None, vec![]);
        reg.flush_events();
        assert_eq!(*seen.lock().unwrap(), 1);
    }
}
