use crate::action_creator::{ActionError, AsyncActionCreator, SyncActionCreator};
use crate::{Service, Store, StoreError};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// A service with its creators bound to one store, so call sites stop
/// threading dispatch and state accessors around.
#[derive(Clone)]
pub struct BoundService {
    service: Service,
    store: Arc<dyn Store>,
}

impl BoundService {
    pub fn new(service: Service, store: Arc<dyn Store>) -> Self {
        BoundService { service, store }
    }

    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Runs the service's main action against the bound store.
    pub async fn call(&self, args: Value) -> Result<Value, ActionError> {
        self.service
            .action()
            .dispatch_on(self.store.as_ref(), args)
            .await
    }

    /// Resets the service's slice via its clean action.
    pub async fn clean(&self) -> Result<Value, ActionError> {
        self.service
            .clean_action()
            .dispatch_on(self.store.as_ref(), Value::Null)
            .await
    }

    /// Runs any async creator from this service against the bound store.
    pub async fn run(
        &self,
        creator: &AsyncActionCreator,
        args: Value,
    ) -> Result<Value, ActionError> {
        creator.dispatch_on(self.store.as_ref(), args).await
    }

    /// Dispatches a sync creator against the bound store.
    pub fn update(&self, creator: &SyncActionCreator, args: Value) -> Result<(), StoreError> {
        creator.dispatch_on(self.store.as_ref(), args)
    }
}

impl std::fmt::Debug for BoundService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundService")
            .field("service", &self.service)
            .finish_non_exhaustive()
    }
}

/// Binds a named collection of services to one store in a single pass.
pub fn bind_services(
    services: impl IntoIterator<Item = (String, Service)>,
    store: &Arc<dyn Store>,
) -> HashMap<String, BoundService> {
    services
        .into_iter()
        .map(|(name, service)| (name, BoundService::new(service, Arc::clone(store))))
        .collect()
}
