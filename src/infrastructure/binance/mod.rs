pub mod rest_client;

pub use rest_client::{BinanceFuturesClient, PreparedRequest, api_error, sign_payload};
