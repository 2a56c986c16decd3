pub mod binance;
pub mod core;
pub mod mock;

pub use binance::BinanceFuturesClient;
pub use mock::MockApiCaller;
