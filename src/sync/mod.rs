//! Synchronization core.
//!
//! - `fetcher`: concurrent snapshot reads (balances + order book)
//! - `stream`: the single live trade subscription, with deduplication
//! - `session`: the immutable, atomically replaced session snapshot
//! - `controller`: selection transitions and refresh sequencing
//! - `actions`: deposit / withdraw / order pipelines with scoped refresh

pub mod actions;
pub mod controller;
pub mod fetcher;
pub mod session;
pub mod stream;

pub use controller::{SyncConfig, SyncController};
pub use session::{Session, SessionStore};
pub use stream::{SubscriptionHandle, TradeStreamManager};
