//! Error taxonomy: ledger reads, ledger writes, trade subscriptions, and the
//! transport errors underneath them.

use crate::shared::AssetSymbol;
use std::fmt;
use thiserror::Error;

/// Top-level error returned by the sync core.
#[derive(Error, Debug)]
pub enum SdkError {
    #[error(transparent)]
    LedgerRead(#[from] LedgerReadError),

    #[error(transparent)]
    LedgerWrite(#[from] LedgerWriteError),

    #[error(transparent)]
    Subscription(#[from] SubscriptionError),

    #[error("No asset selected")]
    NoAssetSelected,

    #[error("Wallet exposes no account at the configured index")]
    NoAccount,

    #[error("Unknown asset: {0}")]
    UnknownAsset(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

// ─── Ledger operations ───────────────────────────────────────────────────────

/// Identity of a failed read against the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOp {
    AssetCatalog,
    Accounts,
    Balance,
    OrderBook,
    /// Custodian address lookup ahead of a deposit.
    Custodian,
}

impl fmt::Display for ReadOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReadOp::AssetCatalog => "asset_catalog",
            ReadOp::Accounts => "accounts",
            ReadOp::Balance => "balance",
            ReadOp::OrderBook => "order_book",
            ReadOp::Custodian => "custodian",
        };
        f.write_str(name)
    }
}

/// Identity of a failed ledger-mutating step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    ApproveTransfer,
    Deposit,
    Withdraw,
    CreateMarketOrder,
    CreateLimitOrder,
}

impl fmt::Display for WriteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WriteOp::ApproveTransfer => "approve_transfer",
            WriteOp::Deposit => "deposit",
            WriteOp::Withdraw => "withdraw",
            WriteOp::CreateMarketOrder => "create_market_order",
            WriteOp::CreateLimitOrder => "create_limit_order",
        };
        f.write_str(name)
    }
}

/// A snapshot read failed. Transient: the caller may retry or keep stale data.
#[derive(Error, Debug)]
#[error("Ledger read `{op}` failed: {source}")]
pub struct LedgerReadError {
    pub op: ReadOp,
    #[source]
    pub source: LedgerError,
}

impl LedgerReadError {
    pub fn new(op: ReadOp, source: LedgerError) -> Self {
        Self { op, source }
    }
}

/// A mutating transaction was rejected or never confirmed.
#[derive(Error, Debug)]
#[error("Ledger write `{op}` failed: {source}")]
pub struct LedgerWriteError {
    pub op: WriteOp,
    #[source]
    pub source: LedgerError,
}

impl LedgerWriteError {
    pub fn new(op: WriteOp, source: LedgerError) -> Self {
        Self { op, source }
    }
}

/// The trade stream could not be opened, or was closed underneath its handle.
#[derive(Error, Debug)]
pub enum SubscriptionError {
    #[error("Could not open trade stream for {asset} after {attempts} attempt(s): {source}")]
    Open {
        asset: AssetSymbol,
        attempts: u32,
        #[source]
        source: LedgerError,
    },

    #[error("Trade stream closed")]
    Closed,
}

// ─── Transport ───────────────────────────────────────────────────────────────

/// Errors raised by a `Ledger` implementation.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("WebSocket error: {0}")]
    Ws(#[from] WsError),

    #[error("Transaction rejected: {0}")]
    Rejected(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// HTTP-layer errors.
#[derive(Error, Debug)]
pub enum HttpError {
    #[cfg(feature = "http")]
    #[error("Request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Server error {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("Rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Timeout")]
    Timeout,

    #[error("Max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },
}

/// WebSocket errors.
#[derive(Error, Debug)]
pub enum WsError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    #[error("Server error: {message}")]
    ServerError {
        message: String,
        code: Option<String>,
    },

    #[error("Connection closed: code={code:?} reason={reason}")]
    Closed { code: Option<u16>, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_error_carries_operation() {
        let err = LedgerReadError::new(ReadOp::OrderBook, LedgerError::InvalidResponse("x".into()));
        assert_eq!(err.op, ReadOp::OrderBook);
        assert_eq!(
            err.to_string(),
            "Ledger read `order_book` failed: Invalid response: x"
        );
    }

    #[test]
    fn test_write_error_converts_into_sdk_error() {
        let err: SdkError =
            LedgerWriteError::new(WriteOp::Withdraw, LedgerError::Rejected("revert".into())).into();
        match err {
            SdkError::LedgerWrite(inner) => assert_eq!(inner.op, WriteOp::Withdraw),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
