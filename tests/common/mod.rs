//! In-memory ledger used by the sync scenarios.
//!
//! Resting orders, balances and trade history live behind a plain mutex.
//! Every trade stream is an unbounded channel seeded with the asset's history,
//! so opening a stream replays from genesis. A drop guard tracks how many
//! streams are open at once.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

use dex_sync::domain::trade::wire::TradeEvent;
use dex_sync::ledger::{Ledger, TradeEventStream, TxReceipt, Wallet};
use dex_sync::prelude::*;

pub const ALICE: &str = "0xa11ce00000000000000000000000000000000001";
pub const BOB: &str = "0xb0b0000000000000000000000000000000000002";
pub const CUSTODIAN: &str = "0xc057000000000000000000000000000000000003";

pub fn sym(s: &str) -> AssetSymbol {
    AssetSymbol::new(s).unwrap()
}

pub fn asset(ticker: &str) -> Asset {
    Asset {
        symbol: sym(ticker),
        ticker: ticker.to_string(),
        contract: Account::new(format!("0x{}", hex_of(ticker))),
    }
}

fn hex_of(s: &str) -> String {
    s.bytes().map(|b| format!("{b:02x}")).collect()
}

pub fn trade_event(id: &str, symbol: &str, amount: i64, price: i64) -> TradeEvent {
    TradeEvent {
        trade_id: TradeId::new(id),
        order_id: format!("o-{id}"),
        symbol: sym(symbol),
        side: 0,
        trader1: Account::new(BOB),
        trader2: Account::new(ALICE),
        amount: Decimal::from(amount),
        price: Decimal::from(price),
        date: Utc::now(),
    }
}

type Feed = mpsc::UnboundedSender<Result<TradeEvent, LedgerError>>;

#[derive(Default)]
struct State {
    catalog: Vec<Asset>,
    balances: HashMap<(Account, AssetSymbol), Balance>,
    orders: HashMap<AssetSymbol, Vec<Order>>,
    history: HashMap<AssetSymbol, Vec<TradeEvent>>,
    feeds: HashMap<AssetSymbol, Vec<Feed>>,
    read_delays: HashMap<AssetSymbol, Duration>,
    failing_writes: HashSet<&'static str>,
    failing_reads: HashSet<AssetSymbol>,
    subscribe_failures: u32,
    next_order_id: u64,
}

pub struct MockLedger {
    state: Mutex<State>,
    open_streams: Arc<AtomicUsize>,
    max_open_streams: Arc<AtomicUsize>,
    subscribe_calls: AtomicUsize,
    subscribed: Mutex<Vec<AssetSymbol>>,
}

impl MockLedger {
    /// Catalog `[DAI, BAT]`, Alice holding 1000 of each in her wallet.
    pub fn new() -> Arc<Self> {
        let catalog = vec![asset("DAI"), asset("BAT")];
        let mut balances = HashMap::new();
        for a in &catalog {
            balances.insert(
                (Account::new(ALICE), a.symbol.clone()),
                Balance {
                    custodial: Decimal::ZERO,
                    wallet: Decimal::from(1000),
                },
            );
        }
        Arc::new(Self {
            state: Mutex::new(State {
                catalog,
                balances,
                ..Default::default()
            }),
            open_streams: Arc::new(AtomicUsize::new(0)),
            max_open_streams: Arc::new(AtomicUsize::new(0)),
            subscribe_calls: AtomicUsize::new(0),
            subscribed: Mutex::new(Vec::new()),
        })
    }

    // ── Scripting ────────────────────────────────────────────────────────

    /// Record a trade in history and push it to every open stream of its asset.
    pub fn emit(&self, event: TradeEvent) {
        let mut state = self.state.lock().unwrap();
        state
            .history
            .entry(event.symbol.clone())
            .or_default()
            .push(event.clone());
        if let Some(feeds) = state.feeds.get_mut(&event.symbol) {
            feeds.retain(|feed| feed.send(Ok(event.clone())).is_ok());
        }
    }

    /// Push an event to open streams without recording it (a redelivery).
    pub fn redeliver(&self, event: TradeEvent) {
        let mut state = self.state.lock().unwrap();
        if let Some(feeds) = state.feeds.get_mut(&event.symbol) {
            feeds.retain(|feed| feed.send(Ok(event.clone())).is_ok());
        }
    }

    /// Push an event into the streams of another asset.
    pub fn emit_on(&self, stream_asset: &str, event: TradeEvent) {
        let mut state = self.state.lock().unwrap();
        if let Some(feeds) = state.feeds.get_mut(&sym(stream_asset)) {
            feeds.retain(|feed| feed.send(Ok(event.clone())).is_ok());
        }
    }

    /// Close every open stream of `symbol`, as a dropped connection would.
    pub fn drop_streams(&self, symbol: &str) {
        self.state.lock().unwrap().feeds.remove(&sym(symbol));
    }

    pub fn fail_write(&self, op: &'static str) {
        self.state.lock().unwrap().failing_writes.insert(op);
    }

    pub fn fail_custodian(&self) {
        self.fail_write("custodian");
    }

    pub fn fail_reads(&self, symbol: &str) {
        self.state.lock().unwrap().failing_reads.insert(sym(symbol));
    }

    pub fn fail_subscribes(&self, times: u32) {
        self.state.lock().unwrap().subscribe_failures = times;
    }

    pub fn delay_reads(&self, symbol: &str, delay: Duration) {
        self.state
            .lock()
            .unwrap()
            .read_delays
            .insert(sym(symbol), delay);
    }

    pub fn add_order(&self, symbol: &str, trader: &str, side: Side, amount: i64, price: i64) {
        let mut state = self.state.lock().unwrap();
        state.next_order_id += 1;
        let order = Order {
            id: state.next_order_id.to_string(),
            trader: Account::new(trader),
            side,
            amount: Decimal::from(amount),
            filled: Decimal::ZERO,
            price: Decimal::from(price),
            created_at: Some(Utc::now()),
        };
        state.orders.entry(sym(symbol)).or_default().push(order);
    }

    // ── Observation ──────────────────────────────────────────────────────

    pub fn open_streams(&self) -> usize {
        self.open_streams.load(Ordering::SeqCst)
    }

    pub fn max_open_streams(&self) -> usize {
        self.max_open_streams.load(Ordering::SeqCst)
    }

    pub fn subscribe_calls(&self) -> usize {
        self.subscribe_calls.load(Ordering::SeqCst)
    }

    pub fn subscribed_assets(&self) -> Vec<AssetSymbol> {
        self.subscribed.lock().unwrap().clone()
    }

    pub fn balance_of(&self, account: &str, symbol: &str) -> Balance {
        self.state
            .lock()
            .unwrap()
            .balances
            .get(&(Account::new(account), sym(symbol)))
            .copied()
            .unwrap_or_default()
    }

    // ── Internals ────────────────────────────────────────────────────────

    async fn read_gate(&self, symbol: &AssetSymbol) -> Result<(), LedgerError> {
        let (delay, failing) = {
            let state = self.state.lock().unwrap();
            (
                state.read_delays.get(symbol).copied(),
                state.failing_reads.contains(symbol),
            )
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if failing {
            return Err(LedgerError::InvalidResponse(format!("{symbol} unavailable")));
        }
        Ok(())
    }

    fn write_gate(&self, op: &'static str) -> Result<(), LedgerError> {
        if self.state.lock().unwrap().failing_writes.contains(op) {
            return Err(LedgerError::Rejected(format!("{op} reverted")));
        }
        Ok(())
    }

    fn receipt(&self, op: &str) -> TxReceipt {
        TxReceipt::confirmed(format!("0x{}", hex_of(op)))
    }
}

struct StreamGuard(Arc<AtomicUsize>);

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Ledger for MockLedger {
    async fn get_asset_catalog(&self) -> Result<Vec<Asset>, LedgerError> {
        Ok(self.state.lock().unwrap().catalog.clone())
    }

    async fn get_balance(
        &self,
        account: &Account,
        symbol: &AssetSymbol,
    ) -> Result<Balance, LedgerError> {
        self.read_gate(symbol).await?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .balances
            .get(&(account.clone(), symbol.clone()))
            .copied()
            .unwrap_or_default())
    }

    async fn get_order_book(&self, symbol: &AssetSymbol) -> Result<OrderBook, LedgerError> {
        self.read_gate(symbol).await?;
        let state = self.state.lock().unwrap();
        let mut book = OrderBook::empty(symbol.clone());
        for order in state.orders.get(symbol).into_iter().flatten() {
            match order.side {
                Side::Buy => book.buy.push(order.clone()),
                Side::Sell => book.sell.push(order.clone()),
            }
        }
        Ok(book)
    }

    async fn custodian(&self) -> Result<Account, LedgerError> {
        self.write_gate("custodian")?;
        Ok(Account::new(CUSTODIAN))
    }

    async fn approve_transfer(
        &self,
        _from: &Account,
        _symbol: &AssetSymbol,
        _amount: Decimal,
        spender: &Account,
    ) -> Result<TxReceipt, LedgerError> {
        self.write_gate("approve")?;
        assert_eq!(spender, &Account::new(CUSTODIAN));
        Ok(self.receipt("approve"))
    }

    async fn deposit(
        &self,
        from: &Account,
        amount: Decimal,
        symbol: &AssetSymbol,
    ) -> Result<TxReceipt, LedgerError> {
        self.write_gate("deposit")?;
        let mut state = self.state.lock().unwrap();
        let balance = state
            .balances
            .entry((from.clone(), symbol.clone()))
            .or_default();
        if balance.wallet < amount {
            return Err(LedgerError::Rejected("insufficient wallet balance".into()));
        }
        balance.wallet -= amount;
        balance.custodial += amount;
        Ok(self.receipt("deposit"))
    }

    async fn withdraw(
        &self,
        from: &Account,
        amount: Decimal,
        symbol: &AssetSymbol,
    ) -> Result<TxReceipt, LedgerError> {
        self.write_gate("withdraw")?;
        let mut state = self.state.lock().unwrap();
        let balance = state
            .balances
            .entry((from.clone(), symbol.clone()))
            .or_default();
        if balance.custodial < amount {
            return Err(LedgerError::Rejected("insufficient custodial balance".into()));
        }
        balance.custodial -= amount;
        balance.wallet += amount;
        Ok(self.receipt("withdraw"))
    }

    async fn create_market_order(
        &self,
        from: &Account,
        symbol: &AssetSymbol,
        amount: Decimal,
        side: Side,
    ) -> Result<TxReceipt, LedgerError> {
        self.write_gate("market")?;
        let opposite = match side {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        };

        let fills = {
            let mut state = self.state.lock().unwrap();
            let book = state.orders.entry(symbol.clone()).or_default();
            let mut left = amount;
            let mut fills = Vec::new();
            for order in book.iter_mut().filter(|o| o.side == opposite) {
                if left <= Decimal::ZERO {
                    break;
                }
                let take = order.remaining().min(left);
                order.filled += take;
                left -= take;
                fills.push((order.id.clone(), order.trader.clone(), take, order.price));
            }
            book.retain(|o| o.remaining() > Decimal::ZERO);
            let base = state.history.get(symbol).map_or(0, Vec::len);
            fills
                .into_iter()
                .enumerate()
                .map(|(i, (order_id, maker, take, price))| TradeEvent {
                    trade_id: TradeId::new(format!("{}", base + i + 1)),
                    order_id,
                    symbol: symbol.clone(),
                    side: side.as_u8(),
                    trader1: maker,
                    trader2: from.clone(),
                    amount: take,
                    price,
                    date: Utc::now(),
                })
                .collect::<Vec<_>>()
        };

        for event in fills {
            self.emit(event);
        }
        Ok(self.receipt("market"))
    }

    async fn create_limit_order(
        &self,
        from: &Account,
        symbol: &AssetSymbol,
        amount: Decimal,
        price: Decimal,
        side: Side,
    ) -> Result<TxReceipt, LedgerError> {
        self.write_gate("limit")?;
        let mut state = self.state.lock().unwrap();
        state.next_order_id += 1;
        let order = Order {
            id: state.next_order_id.to_string(),
            trader: from.clone(),
            side,
            amount,
            filled: Decimal::ZERO,
            price,
            created_at: Some(Utc::now()),
        };
        state.orders.entry(symbol.clone()).or_default().push(order);
        Ok(self.receipt("limit"))
    }

    async fn subscribe_trade_events(
        &self,
        symbol: &AssetSymbol,
        from_genesis: bool,
    ) -> Result<TradeEventStream, LedgerError> {
        self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
        let (tx, mut rx) = mpsc::unbounded_channel();
        {
            let mut state = self.state.lock().unwrap();
            if state.subscribe_failures > 0 {
                state.subscribe_failures -= 1;
                return Err(LedgerError::InvalidResponse("stream unavailable".into()));
            }
            if from_genesis {
                for event in state.history.get(symbol).into_iter().flatten() {
                    let _ = tx.send(Ok(event.clone()));
                }
            }
            state.feeds.entry(symbol.clone()).or_default().push(tx);
        }
        self.subscribed.lock().unwrap().push(symbol.clone());

        let open = self.open_streams.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_open_streams.fetch_max(open, Ordering::SeqCst);
        let guard = StreamGuard(self.open_streams.clone());

        Ok(Box::pin(async_stream::stream! {
            let _guard = guard;
            while let Some(item) = rx.recv().await {
                yield item;
            }
        }))
    }
}

#[async_trait]
impl Wallet for MockLedger {
    async fn accounts(&self) -> Result<Vec<Account>, LedgerError> {
        Ok(vec![Account::new(ALICE), Account::new(BOB)])
    }
}

/// Poll `check` until it holds or a second passes.
pub async fn eventually<F>(mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}

/// Start a controller over `ledger` with no backoff delays.
pub async fn start(ledger: &Arc<MockLedger>) -> Result<SyncController, SdkError> {
    let config = SyncConfig {
        resubscribe: ResubscribeConfig {
            max_attempts: 3,
            base_delay_ms: 0,
            max_delay_ms: 0,
        },
        ..Default::default()
    };
    SyncController::start(ledger.clone(), ledger.as_ref(), config).await
}
