//! Request descriptor handed to the signed-call collaborator.

use reqwest::Method;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Ordered key/value pairs; insertion order is the order on the wire.
pub type Params = Vec<(String, String)>;

/// Authentication a request needs before dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityType {
    None,
    ApiKey,
    Signed,
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub endpoint: &'static str,
    pub security: SecurityType,
    pub query: Params,
    pub form: Params,
    pub recv_window: Option<u64>,
    pub headers: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(method: Method, endpoint: &'static str, security: SecurityType) -> Self {
        Self {
            method,
            endpoint,
            security,
            query: Vec::new(),
            form: Vec::new(),
            recv_window: None,
            headers: Vec::new(),
        }
    }

    pub fn with_query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_form(mut self, key: &str, value: impl ToString) -> Self {
        self.form.push((key.to_string(), value.to_string()));
        self
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        lookup(&self.query, key)
    }

    pub fn form_value(&self, key: &str) -> Option<&str> {
        lookup(&self.form, key)
    }

    /// Fold the per-call options that travel with the request.
    ///
    /// Timeout and cancellation are enforced by the caller awaiting the
    /// round trip, not by the transport, so they are ignored here.
    pub fn apply_options(&mut self, options: &[RequestOption]) {
        for option in options {
            match option {
                RequestOption::RecvWindow(ms) => self.recv_window = Some(*ms),
                RequestOption::Header(name, value) => {
                    self.headers.push((name.clone(), value.clone()))
                }
                RequestOption::Timeout(_) | RequestOption::Cancel(_) => {}
            }
        }
    }
}

fn lookup<'a>(params: &'a Params, key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Per-call options accepted by every service.
#[derive(Debug, Clone)]
pub enum RequestOption {
    /// `recvWindow` in milliseconds for signed requests.
    RecvWindow(u64),
    /// Extra HTTP header.
    Header(String, String),
    /// Abort with `FuturesError::Timeout` if the round trip takes longer.
    Timeout(Duration),
    /// Abort with `FuturesError::Cancelled` once the token is cancelled.
    Cancel(CancellationToken),
}
