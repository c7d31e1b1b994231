// Library root module for unicore-router
// This file defines the public API and module structure: route optimization,
// privacy commitments and swap orchestration for cross-chain swaps
//
// Numan Thabit 2025 Nov

pub mod amount;
pub mod config;
pub mod control;
pub mod errors;
pub mod intent;
pub mod metrics;
pub mod network;
pub mod privacy;
pub mod registry;
pub mod router;
pub mod state;
pub mod venues;
