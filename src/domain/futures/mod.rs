pub mod request;
pub mod types;

pub use request::{ApiRequest, Params, RequestOption, SecurityType};
pub use types::{MarginType, PositionInformation, PositionMarginAction, PositionSide, SymbolLeverage};
