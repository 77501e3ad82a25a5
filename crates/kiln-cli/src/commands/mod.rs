//! Command handlers. Each one turns parsed arguments into service calls and
//! renders the outcome; no business logic lives here.

pub mod completions;
pub mod config;
pub mod create;
pub mod init;
