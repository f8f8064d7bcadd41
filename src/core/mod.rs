//! Fundamental building blocks: errors and logging.

pub mod error;
pub mod logging;
