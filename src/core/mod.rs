//! Core module - shared infrastructure
//!
//! Configuration, error handling and the wire types shared by the LLM and
//! tool layers.

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{ResearchError, Result};
pub use types::*;
