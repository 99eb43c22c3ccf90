//! Session state.
//!
//! A [`Session`] is an immutable value. The [`SessionStore`] swaps the
//! current `Arc<Session>` as a whole, so readers never see a half-applied
//! update. Each change of selected asset bumps `epoch`; writers that started
//! under an older epoch are turned away, which is how stale refreshes and
//! late trades from a released subscription get dropped.

use crate::domain::asset::{Asset, AssetCatalog};
use crate::domain::balance::Balance;
use crate::domain::order::OrderBook;
use crate::domain::trade::{Trade, TradeLog};
use crate::shared::{Account, AssetSymbol};
use crate::sync::fetcher::Snapshot;

use std::sync::Arc;
use tokio::sync::watch;

/// Identity of the subscription currently feeding `Session::trades`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionInfo {
    pub id: u64,
    pub asset: AssetSymbol,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub accounts: Vec<Account>,
    pub catalog: AssetCatalog,
    pub selected: Option<Asset>,
    /// Balance of the acting account for the selected asset.
    pub balance: Option<Balance>,
    /// Order book of the selected asset; `None` until the first fetch lands.
    pub orders: Option<OrderBook>,
    pub trades: TradeLog,
    pub subscription: Option<SubscriptionInfo>,
    /// Incremented on every change of selected asset.
    pub epoch: u64,
    pub quote_ticker: Option<String>,
}

impl Session {
    pub fn new(accounts: Vec<Account>, catalog: AssetCatalog, quote_ticker: Option<String>) -> Self {
        Self {
            accounts,
            catalog,
            selected: None,
            balance: None,
            orders: None,
            trades: TradeLog::new(),
            subscription: None,
            epoch: 0,
            quote_ticker,
        }
    }

    pub fn selected_symbol(&self) -> Option<&AssetSymbol> {
        self.selected.as_ref().map(|a| &a.symbol)
    }

    /// Whether order actions are allowed for the selected asset.
    pub fn trading_enabled(&self) -> bool {
        self.selected
            .as_ref()
            .is_some_and(|a| !a.is_quote(self.quote_ticker.as_deref()))
    }

    /// Orders of the selected asset owned by `account`.
    pub fn orders_of(&self, account: &Account) -> Option<OrderBook> {
        self.orders.as_ref().map(|book| book.for_trader(account))
    }

    /// Trades of the selected asset that `account` took part in.
    pub fn trades_of<'a>(&'a self, account: &'a Account) -> impl Iterator<Item = &'a Trade> + 'a {
        self.trades.iter().filter(move |t| t.involves(account))
    }

    fn is_current(&self, epoch: u64, symbol: &AssetSymbol) -> bool {
        self.epoch == epoch && self.selected_symbol() == Some(symbol)
    }
}

/// Holder of the current session. Cloning shares the same session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    tx: Arc<watch::Sender<Arc<Session>>>,
}

impl SessionStore {
    pub fn new(session: Session) -> Self {
        let (tx, _) = watch::channel(Arc::new(session));
        Self { tx: Arc::new(tx) }
    }

    /// The current session. Later updates never mutate the returned value.
    pub fn snapshot(&self) -> Arc<Session> {
        self.tx.borrow().clone()
    }

    /// Receiver notified after every published update.
    pub fn watch(&self) -> watch::Receiver<Arc<Session>> {
        self.tx.subscribe()
    }

    pub fn epoch(&self) -> u64 {
        self.tx.borrow().epoch
    }

    /// Select `asset`: bump the epoch and drop everything tied to the
    /// previous asset. Returns the new epoch.
    pub(crate) fn begin_selection(&self, asset: Asset) -> u64 {
        let mut epoch = 0;
        self.tx.send_modify(|current| {
            let session = Arc::make_mut(current);
            session.epoch += 1;
            session.balance = None;
            session.orders = None;
            session.trades.clear();
            session.subscription = None;
            session.selected = Some(asset);
            epoch = session.epoch;
        });
        epoch
    }

    pub(crate) fn publish_snapshot(&self, epoch: u64, snapshot: Snapshot) -> bool {
        self.update_if_current(epoch, &snapshot.orders.asset.clone(), |session| {
            session.balance = Some(snapshot.balance);
            session.orders = Some(snapshot.orders);
        })
    }

    pub(crate) fn publish_balance(&self, epoch: u64, symbol: &AssetSymbol, balance: Balance) -> bool {
        self.update_if_current(epoch, symbol, |session| session.balance = Some(balance))
    }

    pub(crate) fn publish_orders(&self, epoch: u64, orders: OrderBook) -> bool {
        self.update_if_current(epoch, &orders.asset.clone(), |session| {
            session.orders = Some(orders)
        })
    }

    pub(crate) fn append_trade(&self, epoch: u64, trade: Trade) -> bool {
        self.update_if_current(epoch, &trade.asset.clone(), |session| {
            session.trades.push(trade)
        })
    }

    /// Empty the trade log ahead of a fresh subscription to the same asset.
    pub(crate) fn reset_trades(&self, epoch: u64, symbol: &AssetSymbol) -> bool {
        self.update_if_current(epoch, symbol, |session| session.trades.clear())
    }

    pub(crate) fn attach_subscription(&self, epoch: u64, info: SubscriptionInfo) -> bool {
        self.update_if_current(epoch, &info.asset.clone(), |session| {
            session.subscription = Some(info)
        })
    }

    pub(crate) fn detach_subscription(&self) {
        self.tx.send_if_modified(|current| {
            if current.subscription.is_none() {
                return false;
            }
            Arc::make_mut(current).subscription = None;
            true
        });
    }

    fn update_if_current<F>(&self, epoch: u64, symbol: &AssetSymbol, apply: F) -> bool
    where
        F: FnOnce(&mut Session),
    {
        self.tx.send_if_modified(|current| {
            if !current.is_current(epoch, symbol) {
                return false;
            }
            apply(Arc::make_mut(current));
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::{Side, TradeId};
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn asset(symbol: &str) -> Asset {
        Asset {
            symbol: AssetSymbol::new(symbol).unwrap(),
            ticker: symbol.to_string(),
            contract: Account::new(format!("0x{}", symbol.to_lowercase())),
        }
    }

    fn store() -> SessionStore {
        let catalog = AssetCatalog::new(vec![asset("DAI"), asset("BAT")]);
        SessionStore::new(Session::new(
            vec![Account::new("0xa1")],
            catalog,
            Some("DAI".into()),
        ))
    }

    fn trade(id: &str, symbol: &str) -> Trade {
        Trade {
            trade_id: TradeId::new(id),
            order_id: "1".into(),
            asset: AssetSymbol::new(symbol).unwrap(),
            amount: Decimal::from(1),
            price: Decimal::from(2),
            side: Side::Buy,
            timestamp: Utc::now(),
            maker: Account::new("0xa1"),
            taker: Account::new("0xb2"),
        }
    }

    #[test]
    fn test_selection_bumps_epoch_and_clears() {
        let store = store();
        let first = store.begin_selection(asset("BAT"));
        assert!(store.append_trade(first, trade("1", "BAT")));
        assert_eq!(store.snapshot().trades.len(), 1);

        let second = store.begin_selection(asset("DAI"));
        assert_eq!(second, first + 1);
        let session = store.snapshot();
        assert!(session.trades.is_empty());
        assert!(session.balance.is_none());
        assert!(session.orders.is_none());
        assert_eq!(session.selected_symbol().unwrap().as_str(), "DAI");
    }

    #[test]
    fn test_stale_epoch_is_rejected() {
        let store = store();
        let stale = store.begin_selection(asset("BAT"));
        let current = store.begin_selection(asset("DAI"));

        assert!(!store.append_trade(stale, trade("1", "BAT")));
        assert!(!store.publish_balance(stale, &AssetSymbol::new("BAT").unwrap(), Balance::default()));
        assert!(store.publish_balance(current, &AssetSymbol::new("DAI").unwrap(), Balance::default()));
        assert!(store.snapshot().trades.is_empty());
    }

    #[test]
    fn test_foreign_asset_is_rejected() {
        let store = store();
        let epoch = store.begin_selection(asset("BAT"));
        assert!(!store.append_trade(epoch, trade("1", "DAI")));
        assert!(!store.publish_orders(epoch, OrderBook::empty(AssetSymbol::new("DAI").unwrap())));
    }

    #[test]
    fn test_snapshot_is_immutable() {
        let store = store();
        let epoch = store.begin_selection(asset("BAT"));
        let before = store.snapshot();
        store.append_trade(epoch, trade("1", "BAT"));
        assert!(before.trades.is_empty());
        assert_eq!(store.snapshot().trades.len(), 1);
    }

    #[test]
    fn test_trading_enabled() {
        let store = store();
        assert!(!store.snapshot().trading_enabled());
        store.begin_selection(asset("DAI"));
        assert!(!store.snapshot().trading_enabled());
        store.begin_selection(asset("BAT"));
        assert!(store.snapshot().trading_enabled());
    }

    #[tokio::test]
    async fn test_watch_sees_updates() {
        let store = store();
        let mut rx = store.watch();
        store.begin_selection(asset("BAT"));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().selected_symbol().unwrap().as_str(), "BAT");
    }
}
