//! Library half of the `bloodwork` binary: command runners, their result
//! types and logging setup.

pub mod commands;
pub mod logging;
pub mod types;
