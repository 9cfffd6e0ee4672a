pub mod coalescing_batcher;

pub use coalescing_batcher::{CoalescingBatcher, FlushHandler};
