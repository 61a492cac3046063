use futures::StreamExt;
use futures_signals::signal::SignalExt;
use serde_json::{json, Value};
use servicerx::{BoundService, Service, StoreBuilder};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("==========================================");
    warn!("demo: sync updates and path selection");

    let board = Service::build("loadBoard", |_state: Value, _args: Value| async {
        Ok(json!({"columns": ["todo", "doing", "done"], "filter": null}))
    })?;
    let set_filter = board.new_action_sync(
        |state, args| {
            let mut data = state["board"]["data"].clone();
            data["filter"] = args;
            json!({ "data": data })
        },
        Some("SET_FILTER"),
    );

    let store = StoreBuilder::new()
        .service("board", &board)
        .log_actions(true)
        .build();
    let bound = BoundService::new(board, store.clone());

    bound.call(Value::Null).await?;
    store.await_state().await?;

    bound.update(&set_filter, json!("doing"))?;
    let settled = store.await_state().await?;
    info!("board slice: {}", settled["board"]);

    let filter = store
        .select("board.data.filter", json!("all"))
        .to_stream()
        .next()
        .await;
    info!("selected filter: {filter:?}");

    bound.update(&set_filter, Value::Null)?;
    store.await_state().await?;
    let filter = store
        .select("board.data.filter", json!("all"))
        .to_stream()
        .next()
        .await;
    info!("filter falls back once cleared: {filter:?}");

    Ok(())
}
