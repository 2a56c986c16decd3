use crate::domain::errors::FuturesError;
use crate::domain::futures::request::ApiRequest;
use crate::domain::ports::ApiCaller;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory `ApiCaller` that records requests and replays scripted responses.
///
/// Responses are consumed in FIFO order. When the script is exhausted the
/// caller answers with an empty body.
#[derive(Default)]
pub struct MockApiCaller {
    responses: Mutex<VecDeque<Result<Vec<u8>, FuturesError>>>,
    requests: Mutex<Vec<ApiRequest>>,
    delay: Option<Duration>,
}

impl MockApiCaller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold every response for `delay` after recording the request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn push_body(&self, body: impl Into<Vec<u8>>) {
        self.responses.lock().await.push_back(Ok(body.into()));
    }

    pub async fn push_json(&self, value: serde_json::Value) {
        self.push_body(value.to_string()).await;
    }

    pub async fn push_error(&self, error: FuturesError) {
        self.responses.lock().await.push_back(Err(error));
    }

    pub async fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

#[async_trait]
impl ApiCaller for MockApiCaller {
    async fn call_api(&self, request: ApiRequest) -> Result<Vec<u8>, FuturesError> {
        debug!(
            "MockApiCaller: {} {} form={:?}",
            request.method, request.endpoint, request.form
        );
        self.requests.lock().await.push(request);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::futures::request::SecurityType;
    use reqwest::Method;

    #[tokio::test]
    async fn test_mock_replays_in_order_and_records_requests() {
        let mock = MockApiCaller::new();
        mock.push_body("[]").await;
        mock.push_error(FuturesError::Cancelled).await;

        let request = ApiRequest::new(Method::GET, "/fapi/v1/positionRisk", SecurityType::Signed);
        assert_eq!(mock.call_api(request.clone()).await.unwrap(), b"[]".to_vec());
        assert!(matches!(
            mock.call_api(request.clone()).await,
            Err(FuturesError::Cancelled)
        ));
        assert!(mock.call_api(request).await.unwrap().is_empty());
        assert_eq!(mock.request_count().await, 3);
    }
}
