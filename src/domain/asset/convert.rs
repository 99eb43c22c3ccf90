//! Conversion: AssetResponse → Asset (TryFrom + validation).

use super::wire::AssetResponse;
use super::{Asset, AssetValidationError};
use crate::shared::{Account, AssetSymbol};

impl TryFrom<AssetResponse> for Asset {
    type Error = AssetValidationError;

    fn try_from(source: AssetResponse) -> Result<Self, Self::Error> {
        let symbol = if source.symbol.starts_with("0x") {
            AssetSymbol::from_bytes32_hex(&source.symbol)
        } else {
            AssetSymbol::new(source.symbol)
        }
        .map_err(AssetValidationError::Symbol)?;

        // Older deployments only store the symbol; it doubles as the ticker.
        let ticker = match source.ticker {
            Some(t) if t.starts_with("0x") => AssetSymbol::from_bytes32_hex(&t)
                .map(|s| s.as_str().to_string())
                .map_err(|e| AssetValidationError::Ticker(e.to_string()))?,
            Some(t) if !t.is_empty() => t,
            _ => symbol.as_str().to_string(),
        };

        if source.token_address.is_empty() {
            return Err(AssetValidationError::MissingContract(symbol.to_string()));
        }

        Ok(Asset {
            symbol,
            ticker,
            contract: Account::new(source.token_address),
        })
    }
}
