use crate::select::{get, Path};
use crate::{Action, Reducer, ServiceState};
use futures_signals::signal::{Mutable, MutableSignalCloned, Signal, SignalExt, SignalStream};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot::error::RecvError;
use tracing::{debug, trace};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store queue is closed")]
    QueueClosed,
}

/// The in-process boundary action creators depend on: a dispatch entry point
/// and a state accessor. The host store owns everything behind it.
pub trait Store: Send + Sync {
    fn dispatch(&self, action: Action) -> Result<(), StoreError>;
    fn state(&self) -> Value;
}

/// A store holding the root state tree as json, one slice per registered
/// service.
///
/// Dispatches are serialized through an unbounded queue drained by a spawned
/// task, so the reducers never run concurrently; `state()` reads may lag a
/// just-sent dispatch until the queue drains. [`StateStore::await_state`]
/// round-trips through the queue and observes everything sent before it.
pub struct StateStore {
    state: Mutable<Value>,
    dispatch_tx: UnboundedSender<Action>,
    with_state_tx: UnboundedSender<Box<dyn FnOnce(Value) + Send>>,
}

impl StateStore {
    fn new(reducers: BTreeMap<String, Reducer>, initial_state: Value, log_actions: bool) -> Self {
        let state = Mutable::new(initial_state);
        let (dispatch_tx, dispatch_rx) = tokio::sync::mpsc::unbounded_channel::<Action>();
        let (with_state_tx, with_state_rx) =
            tokio::sync::mpsc::unbounded_channel::<Box<dyn FnOnce(Value) + Send>>();

        let state_clone = state.clone();

        tokio::spawn(async move {
            Self::process_queue(state_clone, reducers, log_actions, dispatch_rx, with_state_rx)
                .await;
        });

        StateStore {
            state,
            dispatch_tx,
            with_state_tx,
        }
    }

    async fn process_queue(
        state: Mutable<Value>,
        reducers: BTreeMap<String, Reducer>,
        log_actions: bool,
        mut dispatch_rx: UnboundedReceiver<Action>,
        mut with_state_rx: UnboundedReceiver<Box<dyn FnOnce(Value) + Send>>,
    ) {
        loop {
            tokio::select! {
                biased;
                Some(action) = dispatch_rx.recv() => {
                    let previous = state.get_cloned();
                    let next = apply_action(&reducers, previous.clone(), &action);
                    if log_actions {
                        debug!(r#type = %action.type_name, "dispatch");
                        trace!(%previous, %next, "state transition");
                    }
                    state.set(next);
                }
                Some(observer) = with_state_rx.recv() => {
                    observer(state.get_cloned());
                }
                else => break,
            }
        }
    }

    pub fn to_stream(&self) -> SignalStream<MutableSignalCloned<Value>> {
        self.state.signal_cloned().to_stream()
    }

    pub fn to_signal(&self) -> MutableSignalCloned<Value> {
        self.state.signal_cloned()
    }

    /// A signal of the value at `path`, with `default` applied the same way
    /// as [`get`].
    pub fn select(&self, path: impl Into<Path>, default: Value) -> impl Signal<Item = Value> {
        let path = path.into();
        self.state
            .signal_cloned()
            .map(move |root| get(&root, path.clone(), default.clone()))
    }

    /// Runs an observer on the queue task with the state current at that
    /// point in the queue.
    pub fn with_state<F>(&self, observer: F)
    where
        F: FnOnce(Value) + Send + 'static,
    {
        let _ = self.with_state_tx.send(Box::new(observer));
    }

    /// The state after every previously queued dispatch has been applied.
    pub async fn await_state(&self) -> Result<Value, RecvError> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let _ = self.with_state_tx.send(Box::new(|state| {
            let _ = tx.send(state);
        }));
        rx.await
    }
}

impl Store for StateStore {
    fn dispatch(&self, action: Action) -> Result<(), StoreError> {
        self.dispatch_tx
            .send(action)
            .map_err(|_| StoreError::QueueClosed)
    }

    fn state(&self) -> Value {
        self.state.get_cloned()
    }
}

/// Every registered reducer sees every action and folds its own slice; this
/// is the combine-reducers contract, so a foreign action still reaches each
/// slice's fallback branch.
fn apply_action(reducers: &BTreeMap<String, Reducer>, root: Value, action: &Action) -> Value {
    let mut tree = match root {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    for (key, reducer) in reducers {
        let slice = tree
            .get(key)
            .map(ServiceState::from_value)
            .unwrap_or_default();
        tree.insert(key.clone(), reducer(slice, action).into_value());
    }
    Value::Object(tree)
}

/// Wires named service reducers into a [`StateStore`].
///
/// ```no_run
/// use serde_json::{json, Value};
/// use servicerx::{ActionError, Service, StoreBuilder};
///
/// let countries = Service::build("fetchCountries", |_state: Value, _args: Value| async {
///     Ok::<_, ActionError>(json!({"country": "Brazil"}))
/// })
/// .unwrap();
/// let store = StoreBuilder::new()
///     .service("countries", &countries)
///     .log_actions(true)
///     .build();
/// ```
#[derive(Default)]
pub struct StoreBuilder {
    reducers: BTreeMap<String, Reducer>,
    preloaded: Option<Value>,
    log_actions: bool,
}

impl StoreBuilder {
    pub fn new() -> Self {
        StoreBuilder::default()
    }

    /// Registers `service`'s reducer under `key` in the root tree.
    pub fn service(mut self, key: impl Into<String>, service: &crate::Service) -> Self {
        self.reducers.insert(key.into(), service.reducer());
        self
    }

    /// Registers a bare reducer under `key`.
    pub fn reducer(mut self, key: impl Into<String>, reducer: Reducer) -> Self {
        self.reducers.insert(key.into(), reducer);
        self
    }

    /// Seeds the root tree before the first dispatch.
    pub fn preloaded(mut self, state: Value) -> Self {
        self.preloaded = Some(state);
        self
    }

    /// Emits a `tracing` debug event per dispatch (and the before/after
    /// trees at trace level).
    pub fn log_actions(mut self, enabled: bool) -> Self {
        self.log_actions = enabled;
        self
    }

    /// Spawns the queue task and hands back the store. Must run inside a
    /// tokio runtime.
    pub fn build(self) -> Arc<StateStore> {
        let mut tree = match self.preloaded {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };
        for key in self.reducers.keys() {
            tree.entry(key.clone())
                .or_insert_with(|| ServiceState::default().into_value());
        }
        Arc::new(StateStore::new(
            self.reducers,
            Value::Object(tree),
            self.log_actions,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Service;
    use serde_json::json;

    fn reducers() -> BTreeMap<String, Reducer> {
        let countries = Service::build("fetchCountries", |_state, _args| async {
            Ok(Value::Null)
        })
        .unwrap();
        let profile = Service::build("loadProfile", |_state, _args| async { Ok(Value::Null) })
            .unwrap();
        BTreeMap::from([
            ("countries".to_string(), countries.reducer()),
            ("profile".to_string(), profile.reducer()),
        ])
    }

    #[test]
    fn apply_action_touches_every_slice() {
        let reducers = reducers();
        let root = apply_action(
            &reducers,
            Value::Object(Map::new()),
            &Action::of("FETCH_COUNTRIES_BUSY"),
        );
        assert_eq!(root["countries"]["isLoading"], json!(true));
        // The other slice saw an unknown type: its fallback branch forces
        // the flag low.
        assert_eq!(root["profile"]["isLoading"], json!(false));

        let root = apply_action(
            &reducers,
            json!({"profile": {"data": 1, "isLoading": true, "error": null}}),
            &Action::of("FETCH_COUNTRIES_BUSY"),
        );
        assert_eq!(root["profile"]["isLoading"], json!(false));
        assert_eq!(root["profile"]["data"], json!(1));
    }

    #[test]
    fn apply_action_recovers_from_non_object_roots() {
        let reducers = reducers();
        let root = apply_action(&reducers, Value::Null, &Action::of("NOOP"));
        assert_eq!(root["countries"], ServiceState::default().into_value());
    }
}
