pub mod cache;
pub mod repositories;
pub mod unit_of_work;
