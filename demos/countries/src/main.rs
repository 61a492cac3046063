use serde_json::{json, Value};
use servicerx::{get, ActionError, BoundService, Service, StoreBuilder};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    info!("==========================================");
    warn!("demo: fetchCountries service");

    let countries = Service::build("fetchCountries", |_state: Value, args: Value| async move {
        // Stands in for an http call; the library never does networking.
        sleep(Duration::from_millis(200)).await;
        match args.as_str() {
            Some("offline") => Err(ActionError::message("no connection")),
            _ => Ok(json!({"country": "Brazil"})),
        }
    })?;

    let store = StoreBuilder::new()
        .service("countries", &countries)
        .log_actions(true)
        .build();
    let bound = BoundService::new(countries, store.clone());

    let data = bound.call(Value::Null).await?;
    info!("action resolved with: {data}");

    let settled = store.await_state().await?;
    info!("slice after success: {}", settled["countries"]);
    info!(
        "selected country: {}",
        get(&settled, "countries.data.country", json!("unknown"))
    );

    info!("==========================================");
    warn!("demo: failure surfaces once, then clean resets");

    if let Err(error) = bound.call(json!("offline")).await {
        info!("action rejected with: {error}");
    }
    let settled = store.await_state().await?;
    info!("slice after failure: {}", settled["countries"]);

    bound.clean().await?;
    let settled = store.await_state().await?;
    info!("slice after clean: {}", settled["countries"]);

    Ok(())
}
