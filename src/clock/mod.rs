//! Clock recovery module
//!
//! This module contains the clock synchronization machinery:
//! - Buffer-size/sample-rate configuration ([`config`])
//! - The delay-locked loop tracking wakeup timing ([`dll`])
//! - The lock-free double-buffered publication cell ([`shared`])
//! - The synchronized writer/reader pair built on both ([`sync`])

pub mod config;
pub mod dll;
pub mod shared;
pub mod sync;
