pub mod artifacts;
pub mod classify;
pub mod config;
pub mod delivery;
pub mod error;
pub mod logging;
pub mod navigator;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod session;
