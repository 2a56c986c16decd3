//! Futures position types exchanged with the Binance USD-M API.
//!
//! Decimal-valued fields stay in their wire `String` form so the exchange's
//! precision is never routed through binary floating point. The `*_decimal`
//! accessors parse them on demand.

use crate::domain::errors::FuturesError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Per-symbol margin mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MarginType {
    Isolated,
    Crossed,
}

impl MarginType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarginType::Isolated => "ISOLATED",
            MarginType::Crossed => "CROSSED",
        }
    }
}

impl fmt::Display for MarginType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarginType {
    type Err = FuturesError;

    // positionRisk reports "isolated"/"cross" while marginType takes "ISOLATED"/"CROSSED"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ISOLATED" => Ok(MarginType::Isolated),
            "CROSSED" | "CROSS" => Ok(MarginType::Crossed),
            _ => Err(FuturesError::InvalidParameter {
                name: "marginType",
                reason: format!("unknown margin type {:?}", s),
            }),
        }
    }
}

/// Direction of an isolated position margin update (`type` on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PositionMarginAction {
    AddMargin,
    ReduceMargin,
}

impl PositionMarginAction {
    pub fn code(&self) -> i32 {
        match self {
            PositionMarginAction::AddMargin => 1,
            PositionMarginAction::ReduceMargin => 2,
        }
    }
}

impl TryFrom<i32> for PositionMarginAction {
    type Error = FuturesError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(PositionMarginAction::AddMargin),
            2 => Ok(PositionMarginAction::ReduceMargin),
            other => Err(FuturesError::InvalidParameter {
                name: "type",
                reason: format!("unknown action code {} (expected 1 = add, 2 = reduce)", other),
            }),
        }
    }
}

impl fmt::Display for PositionMarginAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionSide {
    Long,
    Short,
    Flat,
}

/// Leverage applied to a symbol, as echoed back by `/fapi/v1/leverage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolLeverage {
    pub leverage: u32,
    #[serde(rename = "maxNotionalValue")]
    pub max_notional_value: String,
    pub symbol: String,
}

/// One record of `/fapi/v1/positionRisk`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionInformation {
    #[serde(rename = "entryPrice")]
    pub entry_price: String,
    #[serde(rename = "marginType")]
    pub margin_type: String,
    #[serde(rename = "isAutoAddMargin")]
    pub is_auto_add_margin: String,
    #[serde(rename = "isolatedMargin")]
    pub isolated_margin: String,
    pub leverage: String,
    #[serde(rename = "liquidationPrice")]
    pub liquidation_price: String,
    #[serde(rename = "markPrice")]
    pub mark_price: String,
    #[serde(rename = "maxNotionalValue")]
    pub max_notional_value: String,
    #[serde(rename = "positionAmt")]
    pub position_amt: String,
    pub symbol: String,
    #[serde(rename = "unRealizedProfit")]
    pub unrealized_profit: String,
}

impl PositionInformation {
    pub fn entry_price_decimal(&self) -> Result<Decimal, FuturesError> {
        parse_decimal("entryPrice", &self.entry_price)
    }

    pub fn isolated_margin_decimal(&self) -> Result<Decimal, FuturesError> {
        parse_decimal("isolatedMargin", &self.isolated_margin)
    }

    pub fn liquidation_price_decimal(&self) -> Result<Decimal, FuturesError> {
        parse_decimal("liquidationPrice", &self.liquidation_price)
    }

    pub fn mark_price_decimal(&self) -> Result<Decimal, FuturesError> {
        parse_decimal("markPrice", &self.mark_price)
    }

    pub fn position_amt_decimal(&self) -> Result<Decimal, FuturesError> {
        parse_decimal("positionAmt", &self.position_amt)
    }

    pub fn unrealized_profit_decimal(&self) -> Result<Decimal, FuturesError> {
        parse_decimal("unRealizedProfit", &self.unrealized_profit)
    }

    pub fn leverage_value(&self) -> Result<u32, FuturesError> {
        self.leverage
            .parse::<u32>()
            .map_err(|_| FuturesError::InvalidField {
                field: "leverage",
                value: self.leverage.clone(),
            })
    }

    pub fn margin_type_value(&self) -> Result<MarginType, FuturesError> {
        self.margin_type.parse()
    }

    pub fn is_auto_add_margin_enabled(&self) -> bool {
        self.is_auto_add_margin.eq_ignore_ascii_case("true")
    }

    /// Long/short is carried by the sign of `positionAmt`.
    pub fn side(&self) -> Result<PositionSide, FuturesError> {
        let amount = self.position_amt_decimal()?;
        Ok(if amount.is_zero() {
            PositionSide::Flat
        } else if amount.is_sign_negative() {
            PositionSide::Short
        } else {
            PositionSide::Long
        })
    }

    /// Absolute position size valued at the current mark price.
    pub fn notional_at_mark(&self) -> Result<Decimal, FuturesError> {
        self.position_amt_decimal()?
            .abs()
            .checked_mul(self.mark_price_decimal()?)
            .ok_or_else(|| FuturesError::InvalidField {
                field: "markPrice",
                value: self.mark_price.clone(),
            })
    }
}

fn parse_decimal(field: &'static str, raw: &str) -> Result<Decimal, FuturesError> {
    Decimal::from_str(raw).map_err(|_| FuturesError::InvalidField {
        field,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_position(position_amt: &str) -> PositionInformation {
        PositionInformation {
            entry_price: "27012.5".to_string(),
            margin_type: "isolated".to_string(),
            is_auto_add_margin: "false".to_string(),
            isolated_margin: "54.02500000".to_string(),
            leverage: "10".to_string(),
            liquidation_price: "24580.12".to_string(),
            mark_price: "27100.00000000".to_string(),
            max_notional_value: "20000000".to_string(),
            position_amt: position_amt.to_string(),
            symbol: "BTCUSDT".to_string(),
            unrealized_profit: "1.75000000".to_string(),
        }
    }

    #[test]
    fn test_margin_type_wire_format() {
        assert_eq!(MarginType::Isolated.to_string(), "ISOLATED");
        assert_eq!(MarginType::Crossed.to_string(), "CROSSED");
        assert_eq!(
            serde_json::to_string(&MarginType::Crossed).unwrap(),
            "\"CROSSED\""
        );
    }

    #[test]
    fn test_margin_type_parses_position_risk_spelling() {
        assert_eq!("isolated".parse::<MarginType>().unwrap(), MarginType::Isolated);
        assert_eq!("cross".parse::<MarginType>().unwrap(), MarginType::Crossed);
        assert_eq!("CROSSED".parse::<MarginType>().unwrap(), MarginType::Crossed);
        assert!("portfolio".parse::<MarginType>().is_err());
    }

    #[test]
    fn test_position_margin_action_codes() {
        assert_eq!(PositionMarginAction::AddMargin.code(), 1);
        assert_eq!(PositionMarginAction::ReduceMargin.code(), 2);
        assert_eq!(
            PositionMarginAction::try_from(2).unwrap(),
            PositionMarginAction::ReduceMargin
        );
    }

    #[test]
    fn test_position_margin_action_rejects_unknown_code() {
        for code in [0, 3, -1] {
            let err = PositionMarginAction::try_from(code).unwrap_err();
            assert!(matches!(err, FuturesError::InvalidParameter { name: "type", .. }));
        }
    }

    #[test]
    fn test_symbol_leverage_deserialization() {
        let json = r#"{"leverage":21,"maxNotionalValue":"1000000","symbol":"BTCUSDT"}"#;
        let res: SymbolLeverage = serde_json::from_str(json).unwrap();
        assert_eq!(res.leverage, 21);
        assert_eq!(res.max_notional_value, "1000000");
        assert_eq!(res.symbol, "BTCUSDT");
    }

    #[test]
    fn test_position_side_from_amount_sign() {
        assert_eq!(sample_position("0.010").side().unwrap(), PositionSide::Long);
        assert_eq!(sample_position("-0.010").side().unwrap(), PositionSide::Short);
        assert_eq!(sample_position("0.000").side().unwrap(), PositionSide::Flat);
    }

    #[test]
    fn test_position_decimals_keep_scale() {
        let position = sample_position("-0.010");
        assert_eq!(position.position_amt_decimal().unwrap().to_string(), "-0.010");
        assert_eq!(position.isolated_margin_decimal().unwrap().to_string(), "54.02500000");
        assert_eq!(position.leverage_value().unwrap(), 10);
        assert_eq!(position.margin_type_value().unwrap(), MarginType::Isolated);
        assert!(!position.is_auto_add_margin_enabled());
        assert_eq!(position.notional_at_mark().unwrap(), Decimal::new(271, 0));
    }

    #[test]
    fn test_notional_overflow_is_an_error() {
        let mut position = sample_position("79228162514264337593543950335");
        position.mark_price = "2".to_string();

        let err = position.notional_at_mark().unwrap_err();
        assert!(matches!(err, FuturesError::InvalidField { field: "markPrice", .. }));
    }

    #[test]
    fn test_invalid_decimal_field_is_reported() {
        let mut position = sample_position("0.5");
        position.mark_price = "n/a".to_string();
        let err = position.mark_price_decimal().unwrap_err();
        assert!(matches!(err, FuturesError::InvalidField { field: "markPrice", .. }));
    }
}
