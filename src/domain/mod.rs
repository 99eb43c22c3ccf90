//! Domain modules organized as vertical slices.
//!
//! Each sub-module contains:
//! - `mod.rs`: Domain types (validated, ready for the sync core)
//! - `wire.rs`: Raw serde structs matching gateway responses
//! - `convert.rs`: `TryFrom`/`From` conversions with validation
//! - `state.rs`: State containers with update methods (stream-driven data)

pub mod asset;
pub mod balance;
pub mod order;
pub mod trade;
