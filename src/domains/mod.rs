//! Business logic of the gateway.
//!
//! `tools` owns everything a client can call; `upstream` owns the outbound
//! side. Tools depend on upstream, never the other way round.

pub mod tools;
pub mod upstream;
