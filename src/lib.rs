pub mod attachment;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod lifecycle;
pub mod service;
pub mod session;
pub mod submission;
pub mod types;

#[cfg(test)]
pub mod testing;
