//! Position services for the USD-M futures API.
//!
//! Each request is an immutable value built through its builder and sent
//! with [`FuturesClient::send`](crate::application::futures_client::FuturesClient::send):
//! - [`ChangeLeverageRequest`] -> `POST /fapi/v1/leverage`
//! - [`ChangeMarginTypeRequest`] -> `POST /fapi/v1/marginType`
//! - [`UpdatePositionMarginRequest`] -> `POST /fapi/v1/positionMargin`
//! - [`PositionInformationRequest`] -> `GET /fapi/v1/positionRisk`

use crate::domain::errors::FuturesError;
use crate::domain::futures::request::{ApiRequest, SecurityType};
use crate::domain::futures::types::{
    MarginType, PositionInformation, PositionMarginAction, SymbolLeverage,
};
use reqwest::Method;
use rust_decimal::Decimal;
use serde::de::IgnoredAny;
use std::str::FromStr;

/// A request that maps to exactly one exchange endpoint.
pub trait FuturesRequest {
    type Output;

    fn to_api_request(&self) -> ApiRequest;

    fn decode(data: &[u8]) -> Result<Self::Output, FuturesError>;
}

/// Accepts an empty body or any well-formed JSON document.
fn decode_empty(data: &[u8]) -> Result<(), FuturesError> {
    if data.iter().all(u8::is_ascii_whitespace) {
        return Ok(());
    }
    serde_json::from_slice::<IgnoredAny>(data)?;
    Ok(())
}

// ===== Change Leverage =====

/// Change the initial leverage of a symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeLeverageRequest {
    symbol: String,
    leverage: u32,
}

impl ChangeLeverageRequest {
    pub fn builder() -> ChangeLeverageRequestBuilder {
        ChangeLeverageRequestBuilder::default()
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn leverage(&self) -> u32 {
        self.leverage
    }
}

#[derive(Debug, Default)]
pub struct ChangeLeverageRequestBuilder {
    symbol: Option<String>,
    leverage: Option<u32>,
}

impl ChangeLeverageRequestBuilder {
    pub fn symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn leverage(mut self, leverage: u32) -> Self {
        self.leverage = Some(leverage);
        self
    }

    pub fn build(self) -> Result<ChangeLeverageRequest, FuturesError> {
        Ok(ChangeLeverageRequest {
            symbol: self.symbol.ok_or(FuturesError::MissingParameter("symbol"))?,
            leverage: self
                .leverage
                .ok_or(FuturesError::MissingParameter("leverage"))?,
        })
    }
}

impl FuturesRequest for ChangeLeverageRequest {
    type Output = SymbolLeverage;

    fn to_api_request(&self) -> ApiRequest {
        ApiRequest::new(Method::POST, "/fapi/v1/leverage", SecurityType::Signed)
            .with_form("symbol", &self.symbol)
            .with_form("leverage", self.leverage)
    }

    fn decode(data: &[u8]) -> Result<Self::Output, FuturesError> {
        Ok(serde_json::from_slice(data)?)
    }
}

// ===== Change Margin Type =====

/// Switch a symbol between isolated and cross margin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeMarginTypeRequest {
    symbol: String,
    margin_type: MarginType,
}

impl ChangeMarginTypeRequest {
    pub fn builder() -> ChangeMarginTypeRequestBuilder {
        ChangeMarginTypeRequestBuilder::default()
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn margin_type(&self) -> MarginType {
        self.margin_type
    }
}

#[derive(Debug, Default)]
pub struct ChangeMarginTypeRequestBuilder {
    symbol: Option<String>,
    margin_type: Option<MarginType>,
}

impl ChangeMarginTypeRequestBuilder {
    pub fn symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn margin_type(mut self, margin_type: MarginType) -> Self {
        self.margin_type = Some(margin_type);
        self
    }

    pub fn build(self) -> Result<ChangeMarginTypeRequest, FuturesError> {
        Ok(ChangeMarginTypeRequest {
            symbol: self.symbol.ok_or(FuturesError::MissingParameter("symbol"))?,
            margin_type: self
                .margin_type
                .ok_or(FuturesError::MissingParameter("marginType"))?,
        })
    }
}

impl FuturesRequest for ChangeMarginTypeRequest {
    type Output = ();

    fn to_api_request(&self) -> ApiRequest {
        ApiRequest::new(Method::POST, "/fapi/v1/marginType", SecurityType::Signed)
            .with_form("symbol", &self.symbol)
            .with_form("marginType", self.margin_type)
    }

    fn decode(data: &[u8]) -> Result<Self::Output, FuturesError> {
        decode_empty(data)
    }
}

// ===== Update Position Margin =====

/// Add margin to, or remove margin from, an isolated position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePositionMarginRequest {
    symbol: String,
    amount: String,
    action: PositionMarginAction,
}

impl UpdatePositionMarginRequest {
    pub fn builder() -> UpdatePositionMarginRequestBuilder {
        UpdatePositionMarginRequestBuilder::default()
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Amount text exactly as it goes on the wire.
    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn action(&self) -> PositionMarginAction {
        self.action
    }
}

#[derive(Debug, Default)]
pub struct UpdatePositionMarginRequestBuilder {
    symbol: Option<String>,
    amount: Option<Result<String, FuturesError>>,
    action_code: Option<i32>,
}

impl UpdatePositionMarginRequestBuilder {
    pub fn symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(Ok(amount.to_string()));
        self
    }

    /// Amount as decimal text. Only canonical text is accepted, so the value
    /// sent is byte-for-byte what the caller wrote.
    pub fn amount_str(mut self, amount: &str) -> Self {
        self.amount = Some(canonical_amount(amount));
        self
    }

    pub fn action(mut self, action: PositionMarginAction) -> Self {
        self.action_code = Some(action.code());
        self
    }

    /// Raw exchange code: 1 adds margin, 2 reduces it. Checked at `build`.
    pub fn action_code(mut self, code: i32) -> Self {
        self.action_code = Some(code);
        self
    }

    pub fn build(self) -> Result<UpdatePositionMarginRequest, FuturesError> {
        let symbol = self.symbol.ok_or(FuturesError::MissingParameter("symbol"))?;
        let amount = self.amount.ok_or(FuturesError::MissingParameter("amount"))??;
        let code = self.action_code.ok_or(FuturesError::MissingParameter("type"))?;

        Ok(UpdatePositionMarginRequest {
            symbol,
            amount,
            action: PositionMarginAction::try_from(code)?,
        })
    }
}

// Anything `Decimal` would rewrite (`1_5`, `.5`, `+1`, `1.`, more than 28
// fractional digits, out of range) is rejected instead of reformatted.
fn canonical_amount(amount: &str) -> Result<String, FuturesError> {
    let invalid = |reason: String| FuturesError::InvalidParameter {
        name: "amount",
        reason,
    };

    let parsed = Decimal::from_str(amount)
        .map_err(|e| invalid(format!("{:?} is not a decimal: {}", amount, e)))?;
    if parsed.to_string() != amount {
        return Err(invalid(format!(
            "{:?} is not canonical decimal text (reads as {})",
            amount, parsed
        )));
    }
    Ok(amount.to_string())
}

impl FuturesRequest for UpdatePositionMarginRequest {
    type Output = ();

    fn to_api_request(&self) -> ApiRequest {
        ApiRequest::new(Method::POST, "/fapi/v1/positionMargin", SecurityType::Signed)
            .with_form("symbol", &self.symbol)
            .with_form("amount", &self.amount)
            .with_form("type", self.action)
    }

    fn decode(data: &[u8]) -> Result<Self::Output, FuturesError> {
        decode_empty(data)
    }
}

// ===== Position Information =====

/// Position risk records for every symbol on the account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PositionInformationRequest;

impl FuturesRequest for PositionInformationRequest {
    type Output = Vec<PositionInformation>;

    fn to_api_request(&self) -> ApiRequest {
        ApiRequest::new(Method::GET, "/fapi/v1/positionRisk", SecurityType::Signed)
    }

    // A JSON `null` decodes to an empty list.
    fn decode(data: &[u8]) -> Result<Self::Output, FuturesError> {
        let positions: Option<Vec<PositionInformation>> = serde_json::from_slice(data)?;
        Ok(positions.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_leverage_request_shape() {
        let request = ChangeLeverageRequest::builder()
            .symbol("BTCUSDT")
            .leverage(20)
            .build()
            .unwrap();

        let api = request.to_api_request();
        assert_eq!(api.method, Method::POST);
        assert_eq!(api.endpoint, "/fapi/v1/leverage");
        assert_eq!(api.security, SecurityType::Signed);
        assert_eq!(
            api.form,
            vec![
                ("symbol".to_string(), "BTCUSDT".to_string()),
                ("leverage".to_string(), "20".to_string()),
            ]
        );
        assert!(api.query.is_empty());
    }

    #[test]
    fn test_builders_report_missing_fields() {
        let err = ChangeLeverageRequest::builder().leverage(5).build().unwrap_err();
        assert!(matches!(err, FuturesError::MissingParameter("symbol")));

        let err = ChangeMarginTypeRequest::builder()
            .symbol("BTCUSDT")
            .build()
            .unwrap_err();
        assert!(matches!(err, FuturesError::MissingParameter("marginType")));

        let err = UpdatePositionMarginRequest::builder()
            .symbol("BTCUSDT")
            .amount(dec!(1))
            .build()
            .unwrap_err();
        assert!(matches!(err, FuturesError::MissingParameter("type")));
    }

    #[test]
    fn test_margin_type_request_shape() {
        let request = ChangeMarginTypeRequest::builder()
            .symbol("ETHUSDT")
            .margin_type(MarginType::Isolated)
            .build()
            .unwrap();

        let api = request.to_api_request();
        assert_eq!(api.endpoint, "/fapi/v1/marginType");
        assert_eq!(api.form_value("marginType"), Some("ISOLATED"));
    }

    #[test]
    fn test_position_margin_amount_is_not_reformatted() {
        let request = UpdatePositionMarginRequest::builder()
            .symbol("ETHUSDT")
            .amount_str("1.50")
            .action_code(2)
            .build()
            .unwrap();

        let api = request.to_api_request();
        assert_eq!(api.form_value("amount"), Some("1.50"));
        assert_eq!(api.form_value("type"), Some("2"));
        assert_eq!(request.action(), PositionMarginAction::ReduceMargin);
    }

    #[test]
    fn test_position_margin_rejects_bad_amount_text() {
        let err = UpdatePositionMarginRequest::builder()
            .symbol("ETHUSDT")
            .amount_str("1,5")
            .action(PositionMarginAction::AddMargin)
            .build()
            .unwrap_err();
        assert!(matches!(err, FuturesError::InvalidParameter { name: "amount", .. }));
    }

    #[test]
    fn test_position_margin_rejects_text_decimal_would_rewrite() {
        for amount in [
            "1_5",
            ".5",
            "+1.5",
            "1.",
            "0.00000000000000000000000000001234",
            "12345678901234567890123456789.5",
        ] {
            let err = UpdatePositionMarginRequest::builder()
                .symbol("BTCUSDT")
                .amount_str(amount)
                .action_code(1)
                .build()
                .unwrap_err();
            assert!(
                matches!(err, FuturesError::InvalidParameter { name: "amount", .. }),
                "{} should be rejected",
                amount
            );
        }
    }

    #[test]
    fn test_position_margin_amount_text_survives_to_the_wire() {
        for amount in ["15", "0.5", "1.5", "0.10000000", "0.0000000000000000000000000001"] {
            let request = UpdatePositionMarginRequest::builder()
                .symbol("BTCUSDT")
                .amount_str(amount)
                .action_code(1)
                .build()
                .unwrap();
            assert_eq!(request.amount(), amount);
            assert_eq!(request.to_api_request().form_value("amount"), Some(amount));
        }
    }

    #[test]
    fn test_position_information_request_has_no_params() {
        let api = PositionInformationRequest.to_api_request();
        assert_eq!(api.method, Method::GET);
        assert_eq!(api.endpoint, "/fapi/v1/positionRisk");
        assert!(api.form.is_empty());
        assert!(api.query.is_empty());
    }

    #[test]
    fn test_decode_empty_accepts_blank_and_json() {
        assert!(ChangeMarginTypeRequest::decode(b"").is_ok());
        assert!(ChangeMarginTypeRequest::decode(b"  \n").is_ok());
        assert!(ChangeMarginTypeRequest::decode(br#"{"code":200,"msg":"success"}"#).is_ok());
        assert!(ChangeMarginTypeRequest::decode(b"{oops").unwrap_err().is_decode());
    }

    #[test]
    fn test_position_information_null_is_empty() {
        assert!(PositionInformationRequest::decode(b"null").unwrap().is_empty());
        assert!(PositionInformationRequest::decode(b"[]").unwrap().is_empty());
    }
}
