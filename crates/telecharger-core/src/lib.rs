pub mod config;
pub mod logging;

pub mod controller;
pub mod error;
pub mod job_db;
pub mod notify;
pub mod process;
pub mod progress;
