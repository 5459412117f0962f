//! # Utility Modules
//!
//! ## Components
//! - **Logging**: Structured logging configuration via `tracing-subscriber`

pub mod logging;
