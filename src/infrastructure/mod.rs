pub mod binance;
pub mod mock;
