//! # dex-sync
//!
//! Client-side synchronization layer for a decentralized exchange front-end.
//!
//! Keeps a consistent local snapshot of the user's balances, the resting order
//! book and the executed-trade history for the currently selected asset.
//!
//! ## Architecture
//!
//! The crate is organized in layers:
//!
//! 1. **Core**: Shared newtypes and domain models (always available)
//! 2. **Ledger**: The `Ledger` / `Wallet` contract the core is driven by
//! 3. **HTTP**: `LedgerHttp` gateway client with per-endpoint retry policies
//! 4. **WebSocket**: Native trade event stream over `tokio-tungstenite`
//! 5. **Client**: `DexClient`, a `Ledger` built from layers 3 + 4
//! 6. **Sync**: `SyncController`, trade stream manager, session store, actions
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dex_sync::prelude::*;
//! use std::sync::Arc;
//!
//! let client = Arc::new(DexClient::builder().base_url("http://localhost:9545").build()?);
//! let controller = SyncController::start(client.clone(), client.as_ref(), SyncConfig::default()).await?;
//!
//! controller.select_asset(&AssetSymbol::new("BAT")?).await?;
//! controller.actions().create_limit_order(Decimal::from(100), Decimal::from(5), Side::Sell).await?;
//!
//! let session = controller.session();
//! if let Some(book) = &session.orders {
//!     println!("{} sell orders", book.sell.len());
//! }
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared newtypes used across all domains.
pub mod shared;

/// Domain modules (vertical slices): types, wire types, conversions, state.
pub mod domain;

/// Unified error types.
pub mod error;

/// Network URL constants.
pub mod network;

// ── Layer 2: Ledger contract ─────────────────────────────────────────────────

/// The external ledger and wallet contracts.
pub mod ledger;

// ── Layer 3: HTTP ────────────────────────────────────────────────────────────

/// HTTP gateway client with retry policies.
#[cfg(feature = "http")]
pub mod http;

// ── Layer 4: WebSocket ───────────────────────────────────────────────────────

/// WebSocket messages and the native trade event stream.
pub mod ws;

// ── Layer 5: Client ──────────────────────────────────────────────────────────

/// `DexClient`: gateway-backed `Ledger` + `Wallet`.
#[cfg(all(feature = "http", feature = "ws-native"))]
pub mod client;

// ── Layer 6: Sync core ───────────────────────────────────────────────────────

/// Snapshot fetching, trade streaming, session state and the controller.
pub mod sync;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared newtypes
    pub use crate::shared::{Account, AssetSymbol, Side, TradeId};

    // Domain types
    pub use crate::domain::asset::{Asset, AssetCatalog};
    pub use crate::domain::balance::Balance;
    pub use crate::domain::order::{Order, OrderBook};
    pub use crate::domain::trade::{Trade, TradeLog};

    // Errors
    pub use crate::error::{
        LedgerError, LedgerReadError, LedgerWriteError, ReadOp, SdkError, SubscriptionError,
        WriteOp,
    };

    // Ledger contract
    pub use crate::ledger::{Ledger, StaticWallet, TradeEventStream, TxReceipt, TxStatus, Wallet};

    // Network
    pub use crate::network::{DEFAULT_API_URL, DEFAULT_WS_URL};

    // Gateway client
    #[cfg(all(feature = "http", feature = "ws-native"))]
    pub use crate::client::{DexClient, DexClientBuilder};
    #[cfg(feature = "http")]
    pub use crate::http::retry::{RetryConfig, RetryPolicy};

    // WebSocket config
    pub use crate::ws::WsConfig;

    // Sync core
    pub use crate::sync::actions::Actions;
    pub use crate::sync::controller::{plan, Effect, SyncConfig, SyncController};
    pub use crate::sync::session::{Session, SessionStore, SubscriptionInfo};
    pub use crate::sync::stream::{
        ResubscribeConfig, StreamStatus, SubscriptionHandle, TradeStreamManager,
    };
}
