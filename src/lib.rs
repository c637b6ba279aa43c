//! Swap-routing and quoting engine for a DEX aggregator.
//!
//! Given an input token, an amount and a desired output denom, the router
//! discovers candidate pool chains over a heterogeneous pool snapshot,
//! validates them, simulates per-pool swaps (including tick-crossing
//! simulation for concentrated liquidity) and allocates the input across
//! routes to maximize the total output. The block-synchronized snapshot
//! ingestion, persistent storage and delivery layers live behind the
//! [`services::PoolProvider`] boundary.

pub mod config;
pub mod errors;
pub mod models;
pub mod pools;
pub mod router;
pub mod services;
