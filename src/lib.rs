pub mod analysis;
pub mod config;
pub mod error;
pub mod gcp;
pub mod jenkins;
pub mod notify;
pub mod pipeline;
pub mod storage;
