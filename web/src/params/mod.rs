//! Typed parameters for endpoint inputs.
//!
//! Query strings and request bodies are deserialized into these types before any
//! handler logic runs, and converted into core `sse` types at this boundary.

pub(crate) mod client;
pub(crate) mod event;
