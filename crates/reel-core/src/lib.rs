pub mod config;
pub mod error;
pub mod filter;
pub mod library;
pub mod models;
pub mod persistence;
pub mod stats;
pub mod storage;
pub mod store;
pub mod tags;
pub mod transfer;
