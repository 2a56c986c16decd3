use crate::application::position_service::{
    ChangeLeverageRequest, ChangeMarginTypeRequest, FuturesRequest, PositionInformationRequest,
    UpdatePositionMarginRequest,
};
use crate::config::BinanceFuturesConfig;
use crate::domain::errors::FuturesError;
use crate::domain::futures::request::{ApiRequest, RequestOption};
use crate::domain::futures::types::{
    MarginType, PositionInformation, PositionMarginAction, SymbolLeverage,
};
use crate::domain::ports::ApiCaller;
use crate::infrastructure::binance::BinanceFuturesClient;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, warn};

/// Entry point for the futures position endpoints.
///
/// Cheap to clone; clones share the underlying `ApiCaller`, so independent
/// requests may run concurrently.
#[derive(Clone)]
pub struct FuturesClient {
    caller: Arc<dyn ApiCaller>,
}

impl FuturesClient {
    pub fn new(caller: Arc<dyn ApiCaller>) -> Self {
        Self { caller }
    }

    pub fn from_config(config: &BinanceFuturesConfig) -> Self {
        Self::new(Arc::new(BinanceFuturesClient::from_config(config)))
    }

    pub async fn send<R: FuturesRequest>(&self, request: &R) -> Result<R::Output, FuturesError> {
        self.send_with(request, &[]).await
    }

    /// Send `request` with per-call options.
    ///
    /// The result is either the decoded value or an error, never both.
    pub async fn send_with<R: FuturesRequest>(
        &self,
        request: &R,
        options: &[RequestOption],
    ) -> Result<R::Output, FuturesError> {
        let mut api_request = request.to_api_request();
        api_request.apply_options(options);

        let method = api_request.method.clone();
        let endpoint = api_request.endpoint;
        debug!(%method, endpoint, "Dispatching futures request");

        let data = match self.dispatch(api_request, options).await {
            Ok(data) => data,
            Err(e) => {
                warn!("Futures request {} {} failed: {}", method, endpoint, e);
                return Err(e);
            }
        };

        R::decode(&data)
    }

    async fn dispatch(
        &self,
        request: ApiRequest,
        options: &[RequestOption],
    ) -> Result<Vec<u8>, FuturesError> {
        let timeout = options.iter().find_map(|option| match option {
            RequestOption::Timeout(limit) => Some(*limit),
            _ => None,
        });
        let cancel = options.iter().find_map(|option| match option {
            RequestOption::Cancel(token) => Some(token.clone()),
            _ => None,
        });

        let call = self.caller.call_api(request);
        let bounded = async move {
            match timeout {
                Some(limit) => match tokio::time::timeout(limit, call).await {
                    Ok(result) => result,
                    Err(_) => Err(FuturesError::Timeout(limit)),
                },
                None => call.await,
            }
        };

        match cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(FuturesError::Cancelled),
                    result = bounded => result,
                }
            }
            None => bounded.await,
        }
    }

    pub async fn change_leverage(
        &self,
        symbol: &str,
        leverage: u32,
    ) -> Result<SymbolLeverage, FuturesError> {
        let request = ChangeLeverageRequest::builder()
            .symbol(symbol)
            .leverage(leverage)
            .build()?;
        self.send(&request).await
    }

    pub async fn change_margin_type(
        &self,
        symbol: &str,
        margin_type: MarginType,
    ) -> Result<(), FuturesError> {
        let request = ChangeMarginTypeRequest::builder()
            .symbol(symbol)
            .margin_type(margin_type)
            .build()?;
        self.send(&request).await
    }

    pub async fn update_position_margin(
        &self,
        symbol: &str,
        amount: Decimal,
        action: PositionMarginAction,
    ) -> Result<(), FuturesError> {
        let request = UpdatePositionMarginRequest::builder()
            .symbol(symbol)
            .amount(amount)
            .action(action)
            .build()?;
        self.send(&request).await
    }

    pub async fn get_position_information(
        &self,
    ) -> Result<Vec<PositionInformation>, FuturesError> {
        self.send(&PositionInformationRequest).await
    }
}
