//! Shared dispensary resources
//!
//! - **ResourcePool**: one finite-capacity FIFO pool per staffed stage
//! - **HoldingStore**: the shelf where finished prescriptions wait for pickup
//!
//! Both are plain state machines. Suspension is modelled by returning
//! `Queued`/`Pending` to the caller; the simulation engine resumes the waiter
//! when a later `release`/`put` hands it what it was waiting for.

pub mod holding_store;
pub mod resource_pool;

pub use holding_store::{Get, HoldingStore};
pub use resource_pool::{Acquire, Permit, ResourcePool};
