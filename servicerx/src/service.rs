use crate::action_creator::{
    ActionError, AsyncActionCreator, ServiceCallback, SyncActionCreator,
};
use crate::select::is_falsy;
use crate::{Action, ActionKind, ActionTypes, BuildError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;

/// The state slice a service folds its actions into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceState {
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub is_loading: bool,
    #[serde(default)]
    pub error: Value,
}

impl Default for ServiceState {
    fn default() -> Self {
        ServiceState {
            data: Value::Null,
            is_loading: false,
            error: Value::Null,
        }
    }
}

impl ServiceState {
    /// Embeds the slice in the json state tree, `isLoading` spelled the way
    /// selectors address it.
    pub fn into_value(self) -> Value {
        json!({
            "data": self.data,
            "isLoading": self.is_loading,
            "error": self.error,
        })
    }

    /// Reads a slice back out of the state tree. Missing fields take their
    /// defaults, non-object slices reset to the initial state.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => ServiceState {
                data: map.get("data").cloned().unwrap_or(Value::Null),
                is_loading: map
                    .get("isLoading")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
                error: map.get("error").cloned().unwrap_or(Value::Null),
            },
            _ => ServiceState::default(),
        }
    }
}

/// A cloneable per-service reducer, ready for store registration.
pub type Reducer = Arc<dyn Fn(ServiceState, &Action) -> ServiceState + Send + Sync>;

/// The descriptor bundling one service's action types, reducer and action
/// creators. Built once, immutable afterwards.
///
/// ```
/// use serde_json::{json, Value};
/// use servicerx::{ActionError, Service};
///
/// let countries = Service::build("fetchCountries", |_state: Value, _args: Value| async {
///     Ok::<_, ActionError>(json!({"country": "Brazil"}))
/// })
/// .unwrap();
/// assert_eq!(countries.action().action_type(), "FETCH_COUNTRIES_SUCCESS");
/// ```
#[derive(Clone)]
pub struct Service {
    action_types: ActionTypes,
    action: AsyncActionCreator,
    clean_action: AsyncActionCreator,
}

impl Service {
    /// Builds the descriptor for `service_name` around the async `callback`.
    ///
    /// The name must be non-empty camelCase ascii; anything else is a
    /// [`BuildError`], raised here and never recovered later.
    pub fn build<F, Fut>(service_name: &str, callback: F) -> Result<Self, BuildError>
    where
        F: Fn(Value, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ActionError>> + Send + 'static,
    {
        let action_types = ActionTypes::derive(service_name)?;
        let action =
            AsyncActionCreator::new(&action_types, Arc::new(callback), Some("SUCCESS"));
        // The reset goes through the same busy/success wrapper as any other
        // action, so isLoading flickers true before the merge clears it.
        let clean_action = AsyncActionCreator::new(
            &action_types,
            Arc::new(|_state: Value, _args: Value| {
                std::future::ready(Ok::<_, ActionError>(json!({ "data": null, "error": null })))
            }),
            Some("CLEAN"),
        );
        Ok(Service {
            action_types,
            action,
            clean_action,
        })
    }

    pub fn action_types(&self) -> &ActionTypes {
        &self.action_types
    }

    /// The main action creator: the build callback under the `SUCCESS` type.
    pub fn action(&self) -> &AsyncActionCreator {
        &self.action
    }

    /// Resets the slice to `{data: null, error: null}` under the `CLEAN` type.
    pub fn clean_action(&self) -> &AsyncActionCreator {
        &self.clean_action
    }

    /// An additional async creator in this service's namespace. Without a
    /// suffix it dispatches under the update type.
    pub fn new_action<F, Fut>(&self, callback: F, suffix: Option<&str>) -> AsyncActionCreator
    where
        F: Fn(Value, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ActionError>> + Send + 'static,
    {
        AsyncActionCreator::new(&self.action_types, Arc::new(callback), suffix)
    }

    /// Same, from an already boxed callback.
    pub fn new_action_boxed(
        &self,
        callback: Arc<dyn ServiceCallback>,
        suffix: Option<&str>,
    ) -> AsyncActionCreator {
        AsyncActionCreator::new(&self.action_types, callback, suffix)
    }

    /// A synchronous creator: computes its payload from the state snapshot
    /// and dispatches once, with no busy or failure phase.
    pub fn new_action_sync<F>(&self, callback: F, suffix: Option<&str>) -> SyncActionCreator
    where
        F: Fn(Value, Value) -> Value + Send + Sync + 'static,
    {
        SyncActionCreator::new(&self.action_types, callback, suffix)
    }

    /// Folds one action into the slice. Pure.
    pub fn reduce(&self, state: ServiceState, action: &Action) -> ServiceState {
        reduce_slice(&self.action_types, state, action)
    }

    /// The reducer as a cloneable closure for store registration.
    pub fn reducer(&self) -> Reducer {
        let action_types = self.action_types.clone();
        Arc::new(move |state, action| reduce_slice(&action_types, state, action))
    }
}

impl std::fmt::Debug for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Service")
            .field("action_types", &self.action_types)
            .finish_non_exhaustive()
    }
}

fn reduce_slice(types: &ActionTypes, state: ServiceState, action: &Action) -> ServiceState {
    match types.kind(&action.type_name) {
        ActionKind::Busy => ServiceState {
            is_loading: true,
            ..state
        },
        ActionKind::Success => ServiceState {
            is_loading: false,
            data: data_or_null(action.data.clone()),
            ..state
        },
        ActionKind::Failure => ServiceState {
            is_loading: false,
            error: action.error.clone().unwrap_or(Value::Null),
            ..state
        },
        // Update and unrecognized types share this branch: merge the
        // payload's own fields over the slice and drop the loading flag.
        ActionKind::Fallback => {
            let mut next = state;
            if let Some(Value::Object(fields)) = &action.data {
                if let Some(data) = fields.get("data") {
                    next.data = data.clone();
                }
                if let Some(error) = fields.get("error") {
                    next.error = error.clone();
                }
            }
            next.is_loading = false;
            next
        }
    }
}

/// `data || null`: absent or js-falsy success payloads collapse to null.
fn data_or_null(data: Option<Value>) -> Value {
    match data {
        Some(value) if !is_falsy(&value) => value,
        _ => Value::Null,
    }
}
