//! Low-level HTTP client: `LedgerHttp`.
//!
//! One method per gateway endpoint. Returns wire types; conversion to domain
//! types happens in `DexClient`.

use crate::domain::asset::wire::AssetsResponse;
use crate::domain::balance::wire::{ApproveRequest, BalanceResponse, TransferRequest};
use crate::domain::order::wire::{LimitOrderRequest, MarketOrderRequest, OrdersResponse};
use crate::error::HttpError;
use crate::http::retry::RetryPolicy;
use crate::ledger::TxReceipt;
use crate::shared::{Account, AssetSymbol, Side};

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// REST response for `GET /api/accounts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountsResponse {
    pub accounts: Vec<Account>,
}

/// REST response for `GET /api/custodian`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustodianResponse {
    pub address: Account,
}

/// Low-level HTTP client for the ledger gateway.
#[derive(Clone)]
pub struct LedgerHttp {
    base_url: String,
    client: Client,
    read_retry: RetryPolicy,
}

impl LedgerHttp {
    pub fn new(base_url: &str) -> Self {
        Self::with_read_retry(base_url, RetryPolicy::None)
    }

    pub fn with_read_retry(base_url: &str, read_retry: RetryPolicy) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            read_retry,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── Reads ────────────────────────────────────────────────────────────

    pub async fn get_assets(&self) -> Result<AssetsResponse, HttpError> {
        let url = format!("{}/api/assets", self.base_url);
        self.get(&url).await
    }

    pub async fn get_accounts(&self) -> Result<AccountsResponse, HttpError> {
        let url = format!("{}/api/accounts", self.base_url);
        self.get(&url).await
    }

    pub async fn get_custodian(&self) -> Result<CustodianResponse, HttpError> {
        let url = format!("{}/api/custodian", self.base_url);
        self.get(&url).await
    }

    pub async fn get_balance(
        &self,
        account: &Account,
        symbol: &AssetSymbol,
    ) -> Result<BalanceResponse, HttpError> {
        let url = format!(
            "{}/api/balances?account={}&symbol={}",
            self.base_url,
            urlencoding::encode(account.as_str()),
            symbol.to_bytes32_hex()
        );
        self.get(&url).await
    }

    pub async fn get_orders(
        &self,
        symbol: &AssetSymbol,
        side: Side,
    ) -> Result<OrdersResponse, HttpError> {
        let url = format!(
            "{}/api/orders?symbol={}&side={}",
            self.base_url,
            symbol.to_bytes32_hex(),
            side.as_u8()
        );
        self.get(&url).await
    }

    // ── Writes (never retried) ───────────────────────────────────────────

    pub async fn approve(&self, request: &ApproveRequest) -> Result<TxReceipt, HttpError> {
        let url = format!("{}/api/tx/approve", self.base_url);
        self.post(&url, request).await
    }

    pub async fn deposit(&self, request: &TransferRequest) -> Result<TxReceipt, HttpError> {
        let url = format!("{}/api/tx/deposit", self.base_url);
        self.post(&url, request).await
    }

    pub async fn withdraw(&self, request: &TransferRequest) -> Result<TxReceipt, HttpError> {
        let url = format!("{}/api/tx/withdraw", self.base_url);
        self.post(&url, request).await
    }

    pub async fn market_order(
        &self,
        request: &MarketOrderRequest,
    ) -> Result<TxReceipt, HttpError> {
        let url = format!("{}/api/tx/market-order", self.base_url);
        self.post(&url, request).await
    }

    pub async fn limit_order(&self, request: &LimitOrderRequest) -> Result<TxReceipt, HttpError> {
        let url = format!("{}/api/tx/limit-order", self.base_url);
        self.post(&url, request).await
    }

    // ── Internal HTTP methods ────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, HttpError> {
        self.request_with_retry(reqwest::Method::GET, url, None::<&()>, &self.read_retry)
            .await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, HttpError> {
        self.request_with_retry(reqwest::Method::POST, url, Some(body), &RetryPolicy::None)
            .await
    }

    async fn request_with_retry<T: DeserializeOwned, B: Serialize>(
        &self,
        method: reqwest::Method,
        url: &str,
        body: Option<&B>,
        retry: &RetryPolicy,
    ) -> Result<T, HttpError> {
        let Some(config) = retry.config() else {
            return self.do_request(&method, url, body).await;
        };

        let attempts = config.max_attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let error = match self.do_request::<T, B>(&method, url, body).await {
                Ok(resp) => return Ok(resp),
                Err(e) => e,
            };

            if !config.should_retry(&error) {
                return Err(error);
            }
            if attempt >= attempts {
                return Err(HttpError::MaxRetriesExceeded {
                    attempts,
                    last_error: error.to_string(),
                });
            }

            let delay = match &error {
                HttpError::RateLimited {
                    retry_after_ms: Some(ms),
                } => Duration::from_millis(*ms),
                _ => config.backoff(attempt - 1),
            };
            tracing::debug!(
                attempt,
                max = attempts,
                delay_ms = delay.as_millis() as u64,
                "Retrying {} after: {}",
                url,
                error
            );
            futures_timer::Delay::new(delay).await;
        }
    }

    async fn do_request<T: DeserializeOwned, B: Serialize>(
        &self,
        method: &reqwest::Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<T, HttpError> {
        let mut req = self.client.request(method.clone(), url);
        if let Some(b) = body {
            req = req.json(b);
        }

        let resp = req.send().await?;
        let status = resp.status();

        if status.is_success() {
            return Ok(resp.json::<T>().await?);
        }

        let retry_after_ms = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .map(|secs| secs * 1000);
        let status_code = status.as_u16();
        let body_text = resp.text().await.unwrap_or_default();

        Err(classify_status(status_code, body_text, retry_after_ms))
    }
}

/// Map a non-success status to an `HttpError`.
fn classify_status(status: u16, body: String, retry_after_ms: Option<u64>) -> HttpError {
    match status {
        401 => HttpError::Unauthorized,
        404 => HttpError::NotFound(body),
        408 => HttpError::Timeout,
        429 => HttpError::RateLimited { retry_after_ms },
        400..=499 => HttpError::BadRequest(body),
        _ => HttpError::ServerError { status, body },
    }
}
