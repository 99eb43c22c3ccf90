//! Synchronization controller.
//!
//! Turns a change of selected asset into an ordered list of [`Effect`]s and
//! executes them. The plan is a pure function so the ordering can be tested
//! without a ledger:
//!
//! ```text
//! same asset      -> FetchSnapshot, Publish
//! different asset -> ClearTrades, FetchSnapshot, ReleaseSubscription, Subscribe, Publish
//! ```
//!
//! A failed snapshot read does not stop the subscription swap; the read error
//! is reported after the swap so the trade stream still follows the selection.

use crate::domain::asset::Asset;
use crate::error::{SdkError, SubscriptionError};
use crate::ledger::{Ledger, Wallet};
use crate::shared::{Account, AssetSymbol};
use crate::sync::actions::Actions;
use crate::sync::fetcher::{self, Snapshot};
use crate::sync::session::{Session, SessionStore, SubscriptionInfo};
use crate::sync::stream::{
    ResubscribeConfig, StreamStatus, SubscriptionHandle, TradeStreamManager,
};

use futures_util::future::try_join;
use std::sync::Arc;
use tokio::sync::watch;

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Index into the wallet's accounts of the acting account.
    pub account_index: usize,
    /// Asset selected at start. Defaults to the first catalog entry.
    pub initial_asset: Option<AssetSymbol>,
    /// Ticker of the quote asset; order actions on it are rejected.
    pub quote_ticker: Option<String>,
    pub resubscribe: ResubscribeConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            account_index: 0,
            initial_asset: None,
            quote_ticker: Some("DAI".to_string()),
            resubscribe: ResubscribeConfig::default(),
        }
    }
}

// ─── Transition plan ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Bump the epoch and empty everything tied to the previous asset.
    ClearTrades,
    FetchSnapshot,
    ReleaseSubscription,
    Subscribe,
    /// Publish the fetched snapshot if the selection has not moved on.
    Publish,
}

/// Effects needed to move the selection from `previous` to `next`.
pub fn plan(previous: Option<&AssetSymbol>, next: &AssetSymbol) -> Vec<Effect> {
    match previous {
        Some(prev) if prev == next => vec![Effect::FetchSnapshot, Effect::Publish],
        _ => vec![
            Effect::ClearTrades,
            Effect::FetchSnapshot,
            Effect::ReleaseSubscription,
            Effect::Subscribe,
            Effect::Publish,
        ],
    }
}

// ─── Controller ──────────────────────────────────────────────────────────────

/// Owns the session store and the single trade subscription slot.
pub struct SyncController {
    ledger: Arc<dyn Ledger>,
    store: SessionStore,
    streams: TradeStreamManager,
    slot: async_lock::Mutex<Option<SubscriptionHandle>>,
    config: SyncConfig,
}

impl SyncController {
    /// Load the catalog and accounts, then select the initial asset.
    pub async fn start(
        ledger: Arc<dyn Ledger>,
        wallet: &dyn Wallet,
        config: SyncConfig,
    ) -> Result<Self, SdkError> {
        let (catalog, accounts) = try_join(
            fetcher::fetch_catalog(ledger.as_ref()),
            fetcher::fetch_accounts(wallet),
        )
        .await?;

        if accounts.len() <= config.account_index {
            return Err(SdkError::NoAccount);
        }

        let initial = match &config.initial_asset {
            Some(symbol) => symbol.clone(),
            None => catalog
                .first()
                .map(|a| a.symbol.clone())
                .ok_or_else(|| SdkError::UnknownAsset("asset catalog is empty".into()))?,
        };

        tracing::info!(
            "Session starting: {} asset(s), {} account(s), initial asset {}",
            catalog.len(),
            accounts.len(),
            initial
        );

        let store = SessionStore::new(Session::new(accounts, catalog, config.quote_ticker.clone()));
        let controller = Self {
            streams: TradeStreamManager::new(ledger.clone(), config.resubscribe.clone()),
            ledger,
            store,
            slot: async_lock::Mutex::new(None),
            config,
        };

        controller.select_asset(&initial).await?;
        Ok(controller)
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn session(&self) -> Arc<Session> {
        self.store.snapshot()
    }

    pub fn watch(&self) -> watch::Receiver<Arc<Session>> {
        self.store.watch()
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn streams(&self) -> &TradeStreamManager {
        &self.streams
    }

    pub(crate) fn ledger(&self) -> &dyn Ledger {
        self.ledger.as_ref()
    }

    /// Ledger-mutating actions for the selected asset.
    pub fn actions(&self) -> Actions<'_> {
        Actions { controller: self }
    }

    /// The acting account.
    pub fn account(&self) -> Result<Account, SdkError> {
        self.store
            .snapshot()
            .accounts
            .get(self.config.account_index)
            .cloned()
            .ok_or(SdkError::NoAccount)
    }

    pub(crate) fn selected(&self) -> Result<(Asset, u64), SdkError> {
        let session = self.store.snapshot();
        let asset = session.selected.clone().ok_or(SdkError::NoAssetSelected)?;
        Ok((asset, session.epoch))
    }

    // ── Transitions ──────────────────────────────────────────────────────

    /// Change the selected asset. Selecting the current asset refreshes it.
    pub async fn select_asset(&self, symbol: &AssetSymbol) -> Result<(), SdkError> {
        let session = self.store.snapshot();
        let asset = session
            .catalog
            .get(symbol)
            .cloned()
            .ok_or_else(|| SdkError::UnknownAsset(symbol.to_string()))?;

        let effects = plan(session.selected_symbol(), &asset.symbol);
        self.execute(&asset, session.epoch, &effects).await
    }

    /// Refresh balances and orders of the selected asset.
    ///
    /// Also reopens the trade subscription if it is missing or has given up.
    pub async fn refresh(&self) -> Result<(), SdkError> {
        let (asset, epoch) = self.selected()?;
        let effects = plan(Some(&asset.symbol), &asset.symbol);
        let refreshed = self.execute(&asset, epoch, &effects).await;

        if let Err(e) = self.subscription_health().await {
            tracing::info!("Reopening trade subscription on refresh: {}", e);
            let reopened = self.resubscribe().await;
            if let (Err(read), Err(sub)) = (&refreshed, &reopened) {
                tracing::warn!("Refresh failed ({}); trade subscription also failed: {}", read, sub);
            }
            refreshed?;
            return reopened;
        }
        refreshed
    }

    /// Status of the current trade subscription, if one is held.
    pub async fn stream_status(&self) -> Option<StreamStatus> {
        self.slot.lock().await.as_ref().map(|h| h.status())
    }

    /// `Err(Closed)` when no subscription is held or it has given up.
    pub async fn subscription_health(&self) -> Result<(), SubscriptionError> {
        match self.slot.lock().await.as_ref() {
            Some(handle) => handle.health(),
            None => Err(SubscriptionError::Closed),
        }
    }

    pub async fn refresh_balances(&self) -> Result<(), SdkError> {
        let (asset, epoch) = self.selected()?;
        self.refresh_balances_at(&asset.symbol, epoch).await
    }

    pub async fn refresh_orders(&self) -> Result<(), SdkError> {
        let (asset, epoch) = self.selected()?;
        self.refresh_orders_at(&asset.symbol, epoch).await
    }

    pub(crate) async fn refresh_balances_at(
        &self,
        symbol: &AssetSymbol,
        epoch: u64,
    ) -> Result<(), SdkError> {
        let account = self.account()?;
        let balance = fetcher::fetch_balances(self.ledger(), &account, symbol).await?;
        if !self.store.publish_balance(epoch, symbol, balance) {
            tracing::debug!("Discarding stale balance refresh for {}", symbol);
        }
        Ok(())
    }

    pub(crate) async fn refresh_orders_at(
        &self,
        symbol: &AssetSymbol,
        epoch: u64,
    ) -> Result<(), SdkError> {
        let orders = fetcher::fetch_order_book(self.ledger(), symbol).await?;
        if !self.store.publish_orders(epoch, orders) {
            tracing::debug!("Discarding stale order refresh for {}", symbol);
        }
        Ok(())
    }

    /// Replace the trade subscription for the selected asset. The trade log
    /// restarts, since the new stream replays history from genesis.
    pub async fn resubscribe(&self) -> Result<(), SdkError> {
        let mut slot = self.slot.lock().await;
        let (asset, epoch) = self.selected()?;

        if let Some(old) = slot.take() {
            self.store.detach_subscription();
            old.release().await;
        }

        self.store.reset_trades(epoch, &asset.symbol);
        let handle = self.subscribe(&asset.symbol, epoch).await?;
        self.attach(&mut slot, handle, epoch);
        Ok(())
    }

    /// Release the trade subscription. Session data is kept.
    pub async fn shutdown(&self) {
        let mut slot = self.slot.lock().await;
        if let Some(handle) = slot.take() {
            self.store.detach_subscription();
            handle.release().await;
        }
        tracing::info!("Sync controller shut down");
    }

    // ── Execution ────────────────────────────────────────────────────────

    async fn execute(&self, asset: &Asset, epoch: u64, effects: &[Effect]) -> Result<(), SdkError> {
        let account = self.account()?;
        let mut epoch = epoch;
        let mut fetched: Option<Snapshot> = None;
        let mut read_error = None;
        let mut subscribe_error = None;
        let mut slot = None;

        for effect in effects {
            match effect {
                Effect::ClearTrades => {
                    epoch = self.store.begin_selection(asset.clone());
                    tracing::info!("Selected {} (epoch {})", asset.symbol, epoch);
                }
                Effect::FetchSnapshot => {
                    match fetcher::fetch_snapshot(self.ledger(), &account, &asset.symbol).await {
                        Ok(snapshot) => fetched = Some(snapshot),
                        Err(e) => {
                            tracing::warn!("Snapshot read for {} failed: {}", asset.symbol, e);
                            read_error = Some(e);
                        }
                    }
                }
                Effect::ReleaseSubscription => {
                    let mut guard = self.slot.lock().await;
                    if self.store.epoch() != epoch {
                        tracing::debug!(
                            "Selection of {} superseded, keeping newer subscription",
                            asset.symbol
                        );
                    } else if let Some(old) = guard.take() {
                        self.store.detach_subscription();
                        old.release().await;
                    }
                    slot = Some(guard);
                }
                Effect::Subscribe => {
                    if slot.is_none() {
                        slot = Some(self.slot.lock().await);
                    }
                    let Some(guard) = slot.as_mut() else {
                        continue;
                    };
                    if self.store.epoch() != epoch {
                        continue;
                    }
                    match self.subscribe(&asset.symbol, epoch).await {
                        Ok(handle) => self.attach(guard, handle, epoch),
                        Err(e) => {
                            tracing::error!("Trade subscription for {} failed: {}", asset.symbol, e);
                            subscribe_error = Some(e);
                        }
                    }
                }
                Effect::Publish => {
                    drop(slot.take());
                    if let Some(snapshot) = fetched.take() {
                        if !self.store.publish_snapshot(epoch, snapshot) {
                            tracing::debug!("Discarding stale snapshot for {}", asset.symbol);
                        }
                    }
                }
            }
        }

        if let Some(e) = read_error {
            return Err(e.into());
        }
        if let Some(e) = subscribe_error {
            return Err(e.into());
        }
        Ok(())
    }

    async fn subscribe(
        &self,
        symbol: &AssetSymbol,
        epoch: u64,
    ) -> Result<SubscriptionHandle, SubscriptionError> {
        let store = self.store.clone();
        self.streams
            .subscribe(symbol, move |trade| {
                if !store.append_trade(epoch, trade) {
                    tracing::debug!("Dropping trade delivered after selection changed");
                }
            })
            .await
    }

    fn attach(
        &self,
        slot: &mut Option<SubscriptionHandle>,
        handle: SubscriptionHandle,
        epoch: u64,
    ) {
        let info = SubscriptionInfo {
            id: handle.id(),
            asset: handle.asset().clone(),
        };
        if !self.store.attach_subscription(epoch, info) {
            tracing::debug!("Subscription {} attached after selection changed", handle.id());
        }
        *slot = Some(handle);
    }
}
