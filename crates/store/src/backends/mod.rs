//! Backend implementations of [`DocumentStore`](crate::core::DocumentStore).

pub mod memory;

pub use memory::MemoryBackend;
