//! Integration tests against a running DEX gateway.
//!
//! All tests are `#[ignore]` because they need a gateway with the DAI / BAT
//! catalog deployed. Point them at one with `DEX_API_URL` and `DEX_WS_URL`
//! (a `.env` file is honored).
//!
//! Run with:
//! ```bash
//! cargo test --test remote_integration -- --ignored
//! ```

#![cfg(all(feature = "http", feature = "ws-native"))]

use std::env;
use std::sync::Arc;
use std::time::Duration;

use dex_sync::prelude::*;
use rust_decimal::Decimal;
use tokio::time::timeout;

const TEST_TIMEOUT: Duration = Duration::from_secs(30);

fn client() -> Arc<DexClient> {
    dotenvy::dotenv().ok();
    let api = env::var("DEX_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    let ws = env::var("DEX_WS_URL").unwrap_or_else(|_| DEFAULT_WS_URL.to_string());
    Arc::new(
        DexClient::builder()
            .base_url(&api)
            .ws_url(&ws)
            .read_retry(RetryPolicy::Idempotent)
            .build()
            .expect("client should build"),
    )
}

async fn controller() -> SyncController {
    let client = client();
    timeout(
        TEST_TIMEOUT,
        SyncController::start(client.clone(), client.as_ref(), SyncConfig::default()),
    )
    .await
    .expect("timed out starting session")
    .expect("session should start")
}

#[tokio::test]
#[ignore]
async fn test_catalog_and_accounts() {
    let client = client();
    let catalog = client.get_asset_catalog().await.unwrap();
    assert!(!catalog.is_empty());
    let accounts = client.accounts().await.unwrap();
    assert!(!accounts.is_empty());
}

#[tokio::test]
#[ignore]
async fn test_session_follows_selection() {
    let controller = controller().await;
    let bat = AssetSymbol::new("BAT").unwrap();

    controller.select_asset(&bat).await.unwrap();
    let session = controller.session();
    assert_eq!(session.selected_symbol(), Some(&bat));
    assert_eq!(session.orders.as_ref().unwrap().asset, bat);
    assert_eq!(session.subscription.as_ref().unwrap().asset, bat);

    controller.shutdown().await;
}

#[tokio::test]
#[ignore]
async fn test_limit_order_shows_in_book() {
    let controller = controller().await;
    let bat = AssetSymbol::new("BAT").unwrap();
    controller.select_asset(&bat).await.unwrap();

    let me = controller.account().unwrap();
    let before = controller
        .session()
        .orders_of(&me)
        .map_or(0, |book| book.sell.len());

    controller
        .actions()
        .create_limit_order(Decimal::from(100), Decimal::from(5), Side::Sell)
        .await
        .unwrap();

    let after = controller
        .session()
        .orders_of(&me)
        .map_or(0, |book| book.sell.len());
    assert_eq!(after, before + 1);

    controller.shutdown().await;
}

#[tokio::test]
#[ignore]
async fn test_trade_history_replays() {
    let controller = controller().await;
    controller
        .select_asset(&AssetSymbol::new("BAT").unwrap())
        .await
        .unwrap();

    let mut updates = controller.watch();
    let _ = timeout(Duration::from_secs(5), updates.changed()).await;

    let session = controller.session();
    let mut ids: Vec<_> = session.trades.iter().map(|t| t.trade_id.clone()).collect();
    let total = ids.len();
    ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    ids.dedup();
    assert_eq!(ids.len(), total, "trade ids must be unique");

    controller.shutdown().await;
}
