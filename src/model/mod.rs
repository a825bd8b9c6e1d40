pub mod action;
pub mod candle;
pub mod position;
pub mod trade;
