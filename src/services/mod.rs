pub mod file_store;
pub mod processor;
pub mod sweeper;
