//! Trade stream manager.
//!
//! Owns the lifetime of a trade subscription. Each subscription runs a pump
//! task that drains the ledger's event stream, drops duplicates by trade id
//! and hands new trades to the caller's callback. When the stream drops, the
//! pump reopens it from genesis with exponential backoff; the duplicate set
//! survives the reopen so replayed history is not delivered twice.

use crate::domain::trade::wire::TradeEvent;
use crate::domain::trade::Trade;
use crate::error::SubscriptionError;
use crate::ledger::{Ledger, TradeEventStream};
use crate::shared::{AssetSymbol, TradeId};

use futures_util::StreamExt;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Backoff used when opening or reopening a trade stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResubscribeConfig {
    /// Total open attempts per (re)subscription, including the first.
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for ResubscribeConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 500,
            max_delay_ms: 30_000,
        }
    }
}

impl ResubscribeConfig {
    /// Delay before retry number `attempt` (1-based), with up to 25% jitter.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(10);
        let base = self.base_delay_ms.saturating_mul(1u64 << exp);
        let jitter = if base > 0 {
            rand::random::<u64>() % (base / 4 + 1)
        } else {
            0
        };
        Duration::from_millis(base.saturating_add(jitter).min(self.max_delay_ms))
    }
}

/// Health of a subscription's pump task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamStatus {
    Live,
    /// The stream dropped and is being reopened.
    Resubscribing { attempt: u32 },
    /// Reopening gave up. No more trades will be delivered on this handle.
    Failed(String),
}

// ─── Manager ─────────────────────────────────────────────────────────────────

/// Opens trade subscriptions against a ledger.
///
/// The manager itself does not enforce a single live subscription; the
/// controller holds the only handle slot and releases before subscribing.
/// [`active_count`](Self::active_count) reports how many pump tasks exist.
pub struct TradeStreamManager {
    ledger: Arc<dyn Ledger>,
    config: ResubscribeConfig,
    next_id: AtomicU64,
    active: Arc<AtomicUsize>,
}

impl TradeStreamManager {
    pub fn new(ledger: Arc<dyn Ledger>, config: ResubscribeConfig) -> Self {
        Self {
            ledger,
            config,
            next_id: AtomicU64::new(0),
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn config(&self) -> &ResubscribeConfig {
        &self.config
    }

    /// Number of subscriptions whose pump task has not finished.
    pub fn active_count(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Subscribe to trades of `asset`, replayed from genesis.
    ///
    /// `on_trade` receives each distinct trade id at most once for the life
    /// of the returned handle, in arrival order.
    pub async fn subscribe<F>(
        &self,
        asset: &AssetSymbol,
        on_trade: F,
    ) -> Result<SubscriptionHandle, SubscriptionError>
    where
        F: FnMut(Trade) + Send + 'static,
    {
        let stream = open_with_retry(self.ledger.as_ref(), asset, &self.config, None).await?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let (status_tx, status_rx) = watch::channel(StreamStatus::Live);

        let pump = Pump {
            id,
            asset: asset.clone(),
            ledger: self.ledger.clone(),
            config: self.config.clone(),
            seen: HashSet::new(),
            status: status_tx,
            _active: ActiveGuard::new(self.active.clone()),
        };
        let task = tokio::spawn(pump.run(stream, on_trade));

        tracing::info!("Subscribed to trades for {} (subscription {})", asset, id);

        Ok(SubscriptionHandle {
            id,
            asset: asset.clone(),
            task: Some(task),
            status: status_rx,
        })
    }

    /// Release a handle. Equivalent to [`SubscriptionHandle::release`].
    pub async fn unsubscribe(&self, handle: SubscriptionHandle) {
        handle.release().await;
    }
}

// ─── Handle ──────────────────────────────────────────────────────────────────

/// A live trade subscription. Dropping it stops delivery; `release` also
/// waits until the pump task is gone.
#[derive(Debug)]
pub struct SubscriptionHandle {
    id: u64,
    asset: AssetSymbol,
    task: Option<JoinHandle<()>>,
    status: watch::Receiver<StreamStatus>,
}

impl SubscriptionHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn asset(&self) -> &AssetSymbol {
        &self.asset
    }

    pub fn status(&self) -> StreamStatus {
        self.status.borrow().clone()
    }

    pub fn watch_status(&self) -> watch::Receiver<StreamStatus> {
        self.status.clone()
    }

    pub fn is_failed(&self) -> bool {
        matches!(*self.status.borrow(), StreamStatus::Failed(_))
    }

    /// `Err(Closed)` once the pump has given up or stopped.
    pub fn health(&self) -> Result<(), SubscriptionError> {
        let stopped = self.task.as_ref().map_or(true, |task| task.is_finished());
        if stopped || self.is_failed() {
            return Err(SubscriptionError::Closed);
        }
        Ok(())
    }

    /// Stop delivery. Once this returns the callback will not run again.
    pub async fn release(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
        tracing::info!(
            "Released trade subscription {} for {}",
            self.id,
            self.asset
        );
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// ─── Pump task ───────────────────────────────────────────────────────────────

struct ActiveGuard(Arc<AtomicUsize>);

impl ActiveGuard {
    fn new(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

struct Pump {
    id: u64,
    asset: AssetSymbol,
    ledger: Arc<dyn Ledger>,
    config: ResubscribeConfig,
    seen: HashSet<TradeId>,
    status: watch::Sender<StreamStatus>,
    _active: ActiveGuard,
}

impl Pump {
    async fn run<F>(mut self, stream: TradeEventStream, mut on_trade: F)
    where
        F: FnMut(Trade) + Send + 'static,
    {
        let mut stream = stream;
        loop {
            self.drain(stream, &mut on_trade).await;

            tracing::warn!(
                "Trade stream for {} dropped (subscription {}), resubscribing",
                self.asset,
                self.id
            );

            match open_with_retry(
                self.ledger.as_ref(),
                &self.asset,
                &self.config,
                Some(&self.status),
            )
            .await
            {
                Ok(reopened) => {
                    stream = reopened;
                    self.status.send_replace(StreamStatus::Live);
                    tracing::info!("Resubscribed to trades for {}", self.asset);
                }
                Err(e) => {
                    tracing::error!("Giving up on trade stream for {}: {}", self.asset, e);
                    self.status.send_replace(StreamStatus::Failed(e.to_string()));
                    return;
                }
            }
        }
    }

    /// Deliver events until the stream ends or errors. The stream is dropped
    /// on return.
    async fn drain<F>(&mut self, mut stream: TradeEventStream, on_trade: &mut F)
    where
        F: FnMut(Trade),
    {
        while let Some(item) = stream.next().await {
            match item {
                Ok(event) => self.deliver(event, on_trade),
                Err(e) => {
                    tracing::warn!("Trade stream error for {}: {}", self.asset, e);
                    return;
                }
            }
        }
    }

    fn deliver<F>(&mut self, event: TradeEvent, on_trade: &mut F)
    where
        F: FnMut(Trade),
    {
        let trade = match Trade::try_from(event) {
            Ok(trade) => trade,
            Err(e) => {
                tracing::warn!("Skipping malformed trade event: {}", e);
                return;
            }
        };

        if trade.asset != self.asset {
            tracing::warn!(
                "Dropping trade {} for {} on {} subscription",
                trade.trade_id,
                trade.asset,
                self.asset
            );
            return;
        }

        if !self.seen.insert(trade.trade_id.clone()) {
            tracing::debug!("Duplicate trade {} ignored", trade.trade_id);
            return;
        }

        on_trade(trade);
    }
}

async fn open_with_retry(
    ledger: &dyn Ledger,
    asset: &AssetSymbol,
    config: &ResubscribeConfig,
    status: Option<&watch::Sender<StreamStatus>>,
) -> Result<TradeEventStream, SubscriptionError> {
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match ledger.subscribe_trade_events(asset, true).await {
            Ok(stream) => return Ok(stream),
            Err(e) if attempt >= max_attempts => {
                return Err(SubscriptionError::Open {
                    asset: asset.clone(),
                    attempts: attempt,
                    source: e,
                });
            }
            Err(e) => {
                let delay = config.delay_for_attempt(attempt);
                tracing::info!(
                    "Trade stream open for {} failed ({}), attempt {}/{} in {}ms",
                    asset,
                    e,
                    attempt,
                    max_attempts,
                    delay.as_millis()
                );
                if let Some(status) = status {
                    status.send_replace(StreamStatus::Resubscribing { attempt });
                }
                tokio::time::sleep(delay).await;
            }
        }
    }
}
