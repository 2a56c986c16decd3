//! Binance USD-M Futures REST transport
//!
//! Implements the signed-call collaborator used by the position services:
//! - API key header for authenticated endpoints
//! - HMAC-SHA256 request signing over query string and form body
//! - Exchange error payload decoding for non-success responses

use crate::config::BinanceFuturesConfig;
use crate::domain::errors::FuturesError;
use crate::domain::futures::request::{ApiRequest, SecurityType};
use crate::domain::ports::ApiCaller;
use crate::infrastructure::core::http_client_factory::{
    HttpClientFactory, build_url_with_query, encode_params,
};
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::header::CONTENT_TYPE;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use sha2::Sha256;
use std::time::Duration;
use tracing::{debug, warn};

const API_KEY_HEADER: &str = "X-MBX-APIKEY";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

pub struct BinanceFuturesClient {
    client: ClientWithMiddleware,
    api_key: String,
    api_secret: String,
    base_url: String,
    recv_window: Option<u64>,
}

/// A request after signing, ready to go on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub url: String,
    pub body: Option<String>,
    pub headers: Vec<(String, String)>,
}

impl BinanceFuturesClient {
    pub fn new(api_key: String, api_secret: String, base_url: String) -> Self {
        Self::from_config(&BinanceFuturesConfig {
            api_key,
            secret_key: api_secret,
            base_url,
            ..BinanceFuturesConfig::default()
        })
    }

    pub fn from_config(config: &BinanceFuturesConfig) -> Self {
        let client = HttpClientFactory::create_client(
            Duration::from_secs(config.timeout_secs),
            config.max_retries,
        );

        Self {
            client,
            api_key: config.api_key.clone(),
            api_secret: config.secret_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            recv_window: config.recv_window_ms,
        }
    }

    /// Build URL, body and headers for `request`, signing it when required.
    pub fn prepare(
        &self,
        request: &ApiRequest,
        timestamp_ms: i64,
    ) -> Result<PreparedRequest, FuturesError> {
        let mut query = request.query.clone();
        let mut headers = request.headers.clone();

        if request.security != SecurityType::None {
            if self.api_key.is_empty() {
                return Err(FuturesError::MissingCredentials {
                    endpoint: request.endpoint.to_string(),
                });
            }
            headers.push((API_KEY_HEADER.to_string(), self.api_key.clone()));
        }

        if request.security == SecurityType::Signed {
            if self.api_secret.is_empty() {
                return Err(FuturesError::MissingCredentials {
                    endpoint: request.endpoint.to_string(),
                });
            }
            if let Some(recv_window) = request.recv_window.or(self.recv_window) {
                query.push(("recvWindow".to_string(), recv_window.to_string()));
            }
            query.push(("timestamp".to_string(), timestamp_ms.to_string()));
        }

        let mut query_string = encode_params(&query);
        let body = if request.form.is_empty() {
            None
        } else {
            headers.push((
                CONTENT_TYPE.as_str().to_string(),
                FORM_CONTENT_TYPE.to_string(),
            ));
            Some(encode_params(&request.form))
        };

        if request.security == SecurityType::Signed {
            let payload = format!("{}{}", query_string, body.as_deref().unwrap_or_default());
            let signature = sign_payload(&self.api_secret, &payload)?;
            query_string = format!("{}&signature={}", query_string, signature);
        }

        let url = build_url_with_query(
            &format!("{}{}", self.base_url, request.endpoint),
            &query_string,
        );

        Ok(PreparedRequest { url, body, headers })
    }
}

/// Generate HMAC-SHA256 signature for Binance API requests
pub fn sign_payload(secret: &str, payload: &str) -> Result<String, FuturesError> {
    type HmacSha256 = Hmac<Sha256>;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| FuturesError::Signing(e.to_string()))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Map a non-success response to `FuturesError::Api`.
///
/// Bodies that are not the exchange's `{"code", "msg"}` payload are kept as
/// raw text with code 0.
pub fn api_error(status: u16, body: &[u8]) -> FuturesError {
    #[derive(Debug, Deserialize)]
    struct ErrorPayload {
        code: i64,
        msg: String,
    }

    match serde_json::from_slice::<ErrorPayload>(body) {
        Ok(payload) => FuturesError::Api {
            status,
            code: payload.code,
            message: payload.msg,
        },
        Err(_) => FuturesError::Api {
            status,
            code: 0,
            message: String::from_utf8_lossy(body).into_owned(),
        },
    }
}

#[async_trait]
impl ApiCaller for BinanceFuturesClient {
    async fn call_api(&self, request: ApiRequest) -> Result<Vec<u8>, FuturesError> {
        let timestamp = chrono::Utc::now().timestamp_millis();
        let prepared = self.prepare(&request, timestamp)?;

        debug!(
            method = %request.method,
            endpoint = request.endpoint,
            "Binance futures request"
        );

        let mut builder = self.client.request(request.method.clone(), &prepared.url);
        for (name, value) in &prepared.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = prepared.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let data = response.bytes().await?;

        if !status.is_success() {
            let error = api_error(status.as_u16(), &data);
            warn!(
                "Binance futures {} {} failed - Status: {}, Error: {}",
                request.method, request.endpoint, status, error
            );
            return Err(error);
        }

        Ok(data.to_vec())
    }
}
