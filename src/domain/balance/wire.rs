//! Wire types for balance responses.

use crate::shared::{Account, AssetSymbol};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// REST response for `GET /api/balances`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BalanceResponse {
    pub account: Account,
    pub symbol: AssetSymbol,
    pub custodial: Decimal,
    pub wallet: Decimal,
}

/// Body of `POST /api/tx/deposit` and `POST /api/tx/withdraw`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransferRequest {
    pub from: Account,
    /// bytes32 hex.
    pub symbol: String,
    pub amount: Decimal,
}

/// Body of `POST /api/tx/approve`: token allowance for the custodian.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApproveRequest {
    pub from: Account,
    /// bytes32 hex.
    pub symbol: String,
    pub amount: Decimal,
    pub spender: Account,
}
