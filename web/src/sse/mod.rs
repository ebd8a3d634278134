//! SSE HTTP handler for the web layer.
//!
//! This module adapts an axum response into an `sse` transport. The registry,
//! dispatcher and lifecycle live in the `sse` crate.

pub mod handler;
