//! Asset domain: the tradable token catalog.

mod convert;
pub mod wire;

use crate::shared::{Account, AssetSymbol, SymbolError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A tradable token listed by the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Asset {
    pub symbol: AssetSymbol,
    /// Display ticker.
    pub ticker: String,
    /// Token contract reference on the ledger.
    pub contract: Account,
}

impl Asset {
    /// Whether this asset is the quote currency every other asset is priced in.
    pub fn is_quote(&self, quote_ticker: Option<&str>) -> bool {
        quote_ticker.is_some_and(|q| self.ticker.eq_ignore_ascii_case(q))
    }
}

/// The asset catalog, fetched once at session start and never mutated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetCatalog {
    assets: Vec<Asset>,
}

impl AssetCatalog {
    pub fn new(assets: Vec<Asset>) -> Self {
        Self { assets }
    }

    pub fn get(&self, symbol: &AssetSymbol) -> Option<&Asset> {
        self.assets.iter().find(|a| &a.symbol == symbol)
    }

    pub fn first(&self) -> Option<&Asset> {
        self.assets.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Asset> {
        self.assets.iter()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

// ─── Validation ──────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum AssetValidationError {
    Symbol(SymbolError),
    Ticker(String),
    MissingContract(String),
}

impl fmt::Display for AssetValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetValidationError::Symbol(e) => write!(f, "Invalid symbol: {e}"),
            AssetValidationError::Ticker(t) => write!(f, "Invalid ticker: {t}"),
            AssetValidationError::MissingContract(s) => {
                write!(f, "Missing token contract for {s}")
            }
        }
    }
}

impl std::error::Error for AssetValidationError {}
