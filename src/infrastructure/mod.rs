pub mod batch;
pub mod cache;
pub mod database;
pub mod locking;
