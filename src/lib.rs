#![forbid(unsafe_code)]
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod notify;
pub mod output;
pub mod task;
pub mod tui;
pub mod voice;
