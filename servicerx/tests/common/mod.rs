#![allow(dead_code)]

use serde_json::Value;
use servicerx::{Action, Store, StoreError};
use std::sync::Mutex;

/// A store double that records every dispatched action and can be armed to
/// fail a specific dispatch.
pub struct RecordingStore {
    state: Mutex<Value>,
    actions: Mutex<Vec<Action>>,
    fail_on: Mutex<Option<usize>>,
}

impl RecordingStore {
    pub fn new(state: Value) -> Self {
        RecordingStore {
            state: Mutex::new(state),
            actions: Mutex::new(Vec::new()),
            fail_on: Mutex::new(None),
        }
    }

    /// Makes the nth dispatch (1-based) return an error. The action is still
    /// recorded, matching a dispatch observed before it throws.
    pub fn fail_on_dispatch(&self, nth: usize) {
        *self.fail_on.lock().unwrap() = Some(nth);
    }

    pub fn actions(&self) -> Vec<Action> {
        self.actions.lock().unwrap().clone()
    }

    pub fn dispatched_types(&self) -> Vec<String> {
        self.actions()
            .into_iter()
            .map(|action| action.type_name)
            .collect()
    }
}

impl Store for RecordingStore {
    fn dispatch(&self, action: Action) -> Result<(), StoreError> {
        let mut actions = self.actions.lock().unwrap();
        actions.push(action);
        if *self.fail_on.lock().unwrap() == Some(actions.len()) {
            return Err(StoreError::QueueClosed);
        }
        Ok(())
    }

    fn state(&self) -> Value {
        self.state.lock().unwrap().clone()
    }
}
