//! Balance domain: custodial and wallet holdings of one account for one asset.

pub mod wire;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Holdings of one (account, asset) pair.
///
/// Always recomputed from a fresh ledger read, never patched incrementally.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Balance {
    /// Balance held in custody by the ledger (available for trading).
    pub custodial: Decimal,
    /// Balance held directly by the account's wallet.
    pub wallet: Decimal,
}

impl Balance {
    pub fn total(&self) -> Decimal {
        self.custodial + self.wallet
    }
}

impl From<wire::BalanceResponse> for Balance {
    fn from(b: wire::BalanceResponse) -> Self {
        Self {
            custodial: b.custodial,
            wallet: b.wallet,
        }
    }
}
