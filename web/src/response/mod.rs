//! Response DTOs.

pub(crate) mod client;
pub(crate) mod delivery;
