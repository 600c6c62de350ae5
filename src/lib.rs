pub mod checkout;
pub mod config;
pub mod database;
pub mod domain;
pub mod fixtures;
pub mod http;
pub mod metrics;
pub mod storage;
pub mod utils;
