pub mod futures_client;
pub mod position_service;

pub use futures_client::FuturesClient;
pub use position_service::{
    ChangeLeverageRequest, ChangeMarginTypeRequest, FuturesRequest, PositionInformationRequest,
    UpdatePositionMarginRequest,
};
