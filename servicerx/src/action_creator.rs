use crate::{Action, ActionTypes, Store, StoreError};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

pub type ActionFuture = Pin<Box<dyn Future<Output = Result<Value, ActionError>> + Send>>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("{0}")]
    Callback(String),
    #[error("dispatch failed: {0}")]
    Dispatch(#[from] StoreError),
}

impl ActionError {
    pub fn message(message: impl Into<String>) -> Self {
        ActionError::Callback(message.into())
    }

    /// The failure-action payload, the error rendered as its message.
    pub fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }
}

/// The user-supplied computation behind an async action creator.
///
/// Invoked with a snapshot of the store state and the caller's arguments.
/// Implemented for every `Fn(Value, Value) -> Future<Result<Value, ActionError>>`
/// closure, so plain `|state, args| async move { .. }` works.
pub trait ServiceCallback: Send + Sync {
    fn invoke(&self, state: Value, args: Value) -> ActionFuture;
}

impl<F, Fut> ServiceCallback for F
where
    F: Fn(Value, Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, ActionError>> + Send + 'static,
{
    fn invoke(&self, state: Value, args: Value) -> ActionFuture {
        Box::pin(self(state, args))
    }
}

/// An action creator that sequences busy, success and failure dispatches
/// around one awaited callback.
///
/// `dispatch_on` always issues the busy action first. A callback error or a
/// failed success dispatch turns into exactly one failure dispatch and an
/// `Err` result; there is no retry and no way to abort a started callback.
#[derive(Clone)]
pub struct AsyncActionCreator {
    busy_type: String,
    failure_type: String,
    action_type: String,
    callback: Arc<dyn ServiceCallback>,
}

impl AsyncActionCreator {
    pub(crate) fn new(
        types: &ActionTypes,
        callback: Arc<dyn ServiceCallback>,
        suffix: Option<&str>,
    ) -> Self {
        let action_type = match suffix {
            Some(suffix) => types.custom(suffix),
            None => types.update.clone(),
        };
        AsyncActionCreator {
            busy_type: types.busy.clone(),
            failure_type: types.failure.clone(),
            action_type,
            callback,
        }
    }

    /// The type dispatched on success.
    pub fn action_type(&self) -> &str {
        &self.action_type
    }

    pub async fn dispatch_on(&self, store: &dyn Store, args: Value) -> Result<Value, ActionError> {
        store.dispatch(Action::of(&self.busy_type))?;
        let outcome: Result<Value, ActionError> = async {
            let data = self.callback.invoke(store.state(), args).await?;
            store.dispatch(Action::with_data(&self.action_type, data.clone()))?;
            Ok(data)
        }
        .await;
        match outcome {
            Ok(data) => Ok(data),
            Err(error) => {
                store.dispatch(Action::with_error(&self.failure_type, error.to_value()))?;
                Err(error)
            }
        }
    }
}

impl std::fmt::Debug for AsyncActionCreator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncActionCreator")
            .field("action_type", &self.action_type)
            .finish_non_exhaustive()
    }
}

/// An action creator that computes its payload synchronously and dispatches
/// once, with no busy or failure phase.
#[derive(Clone)]
pub struct SyncActionCreator {
    action_type: String,
    callback: Arc<dyn Fn(Value, Value) -> Value + Send + Sync>,
}

impl SyncActionCreator {
    pub(crate) fn new<F>(types: &ActionTypes, callback: F, suffix: Option<&str>) -> Self
    where
        F: Fn(Value, Value) -> Value + Send + Sync + 'static,
    {
        let action_type = match suffix {
            Some(suffix) => types.custom(suffix),
            None => types.update.clone(),
        };
        SyncActionCreator {
            action_type,
            callback: Arc::new(callback),
        }
    }

    pub fn action_type(&self) -> &str {
        &self.action_type
    }

    pub fn dispatch_on(&self, store: &dyn Store, args: Value) -> Result<(), StoreError> {
        let data = (self.callback)(store.state(), args);
        store.dispatch(Action::with_data(&self.action_type, data))
    }
}

impl std::fmt::Debug for SyncActionCreator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncActionCreator")
            .field("action_type", &self.action_type)
            .finish_non_exhaustive()
    }
}
