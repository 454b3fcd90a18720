pub mod checkpoint;
pub mod cli;
pub mod config;
pub mod driver;
pub mod engine;
pub mod report;
pub mod retry;
pub mod store;
pub mod util;
