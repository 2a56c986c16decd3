use crate::domain::errors::FuturesError;
use crate::domain::futures::request::ApiRequest;
use async_trait::async_trait;

/// Performs one authenticated round trip against the exchange.
///
/// Implementations own signing, transport and any retry policy; callers only
/// build the request and decode the returned body.
#[async_trait]
pub trait ApiCaller: Send + Sync {
    async fn call_api(&self, request: ApiRequest) -> Result<Vec<u8>, FuturesError>;
}
