//! Wire types for the asset catalog.

use serde::{Deserialize, Serialize};

/// One entry of `GET /api/assets`.
///
/// `symbol` is the ledger's bytes32 hex form; `ticker` may be hex or plain text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssetResponse {
    pub symbol: String,
    #[serde(default)]
    pub ticker: Option<String>,
    pub token_address: String,
}

/// REST response for the asset catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetsResponse {
    pub assets: Vec<AssetResponse>,
}
