//! # Tickstream Common Library
//!
//! Shared code for the tickstream services:
//! - Error type and result alias
//! - Bootstrap configuration file resolution
//! - Timestamp formatting for emitted lines

pub mod config;
pub mod error;
pub mod time;

pub use error::{Error, Result};
