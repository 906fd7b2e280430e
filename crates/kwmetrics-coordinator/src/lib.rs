//! Splits an incoming keyword set into chunks, fans out to the two
//! adapters, merges, and write-throughs the cache, per spec §4.5/§4.6.

mod coordinator;
mod fan_out;
mod worker;

pub use coordinator::BatchCoordinator;
pub use worker::run_worker;
