//! # LDBT Common Library
//!
//! Shared code for the LookML to DBT Transformer upload tools:
//! - Error type used by configuration loading
//! - Bootstrap configuration resolution (CLI → ENV → TOML → defaults)
//! - Wire types for the remote transformation service

pub mod api;
pub mod config;
pub mod error;

pub use error::{Error, Result};
