//! `runpad-core` runs untrusted code submissions inside a fixed pool of
//! reusable Docker sandboxes and keeps an append-only version history of
//! saved code per note.
//!
//! # Overview
//!
//! The crate is built from a handful of small pieces:
//!
//! - **Stream codec**: decoding of the daemon's multiplexed attach stream
//!   into plain text
//! - **Pool**: a fixed set of pre-warmed sandboxes with blocking
//!   acquire/release discipline
//! - **Runtime**: the boundary to the container runtime, with a Docker
//!   implementation and an in-tree test double
//! - **Orchestra**: staging, execution, and cleanup of one submission
//! - **Store**: filesystem-backed, time-ordered snapshot history
//!
//! # Modules
//!
//! - [`config`] - Configuration types and validation
//! - [`orchestra`] - Execution orchestration for code submissions
//! - [`pool`] - Sandbox pool and lease discipline
//! - [`runtime`] - Container runtime boundary
//! - [`store`] - Versioned snapshot store
//! - [`stream`] - Multiplexed output stream codec

#![warn(missing_docs)]

mod error;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub mod config;
pub mod orchestra;
pub mod pool;
pub mod runtime;
pub mod store;
pub mod stream;

pub use error::*;
