//! Shared newtypes and utilities used across all domain modules.
//!
//! These types are serialization-transparent: they serialize/deserialize as the
//! plain strings the gateway sends, so they can be used directly in wire types.

pub mod serde_util;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

/// Size of the ledger's fixed-width symbol field.
pub const SYMBOL_BYTES: usize = 32;

// ─── AssetSymbol ─────────────────────────────────────────────────────────────

/// Errors building an [`AssetSymbol`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    #[error("Asset symbol is empty")]
    Empty,
    #[error("Asset symbol {0:?} is longer than 32 bytes")]
    TooLong(String),
    #[error("Asset symbol {0:?} is not ASCII")]
    NotAscii(String),
    #[error("Invalid bytes32 symbol encoding: {0}")]
    InvalidEncoding(String),
}

/// Unique short identifier of a tradable asset (e.g. `"BAT"`).
///
/// The ledger stores symbols as 32-byte zero-padded ASCII.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetSymbol(String);

impl AssetSymbol {
    pub fn new(s: impl Into<String>) -> Result<Self, SymbolError> {
        let s = s.into();
        if s.is_empty() {
            return Err(SymbolError::Empty);
        }
        if !s.is_ascii() {
            return Err(SymbolError::NotAscii(s));
        }
        if s.len() > SYMBOL_BYTES {
            return Err(SymbolError::TooLong(s));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Encode as the ledger's bytes32 form: `0x` + 64 hex chars, zero-padded on the right.
    pub fn to_bytes32_hex(&self) -> String {
        let mut bytes = [0u8; SYMBOL_BYTES];
        bytes[..self.0.len()].copy_from_slice(self.0.as_bytes());
        format!("0x{}", hex::encode(bytes))
    }

    /// Decode the ledger's bytes32 form. Trailing zero bytes are padding.
    pub fn from_bytes32_hex(s: &str) -> Result<Self, SymbolError> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(raw).map_err(|e| SymbolError::InvalidEncoding(e.to_string()))?;
        if bytes.len() > SYMBOL_BYTES {
            return Err(SymbolError::InvalidEncoding(format!(
                "{} bytes, expected at most {}",
                bytes.len(),
                SYMBOL_BYTES
            )));
        }
        let end = bytes.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
        let text = String::from_utf8(bytes[..end].to_vec())
            .map_err(|e| SymbolError::InvalidEncoding(e.to_string()))?;
        Self::new(text)
    }
}

impl std::fmt::Display for AssetSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AssetSymbol {
    type Err = SymbolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for AssetSymbol {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for AssetSymbol {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if s.starts_with("0x") {
            AssetSymbol::from_bytes32_hex(&s).map_err(serde::de::Error::custom)
        } else {
            AssetSymbol::new(s).map_err(serde::de::Error::custom)
        }
    }
}

// ─── Account ─────────────────────────────────────────────────────────────────

/// An opaque ledger address (e.g. `"0x5B38Da6a701c568545dCfcB03FcB875f56beddC4"`).
///
/// Equality and hashing ignore ASCII case, so checksummed and lowercase forms
/// of one address compare equal. `Display` keeps the original casing.
#[derive(Debug, Clone, Eq)]
pub struct Account(String);

impl Account {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for Account {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Hash for Account {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.0.bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
    }
}

impl std::fmt::Display for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Account {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Account {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Serialize for Account {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Account {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Account(s))
    }
}

// ─── TradeId ─────────────────────────────────────────────────────────────────

/// Ledger-assigned trade identifier. Unique per trade, stable across redelivery.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TradeId(String);

impl TradeId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TradeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TradeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl<'de> Deserialize<'de> for TradeId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // The ledger emits uint identifiers; some gateways send them as numbers.
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(s) => Ok(TradeId(s)),
            serde_json::Value::Number(n) => Ok(TradeId(n.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "Invalid trade id: {}",
                other
            ))),
        }
    }
}

// ─── Side ────────────────────────────────────────────────────────────────────

/// Order side. The ledger encodes `Buy` as 0 and `Sell` as 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_u8(&self) -> u8 {
        match self {
            Side::Buy => 0,
            Side::Sell => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

impl TryFrom<u8> for Side {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Side::Buy),
            1 => Ok(Side::Sell),
            other => Err(format!("Invalid side: {}", other)),
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "Buy"),
            Side::Sell => write!(f, "Sell"),
        }
    }
}
