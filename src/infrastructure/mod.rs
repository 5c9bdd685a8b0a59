pub mod events;
pub mod in_memory;
pub mod lock;
pub mod queue;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
pub mod settings;
pub mod sim;
