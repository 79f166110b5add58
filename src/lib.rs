pub mod analysis;
pub mod config;
pub mod pose;
pub mod protocol;
pub mod replay;
pub mod server;
