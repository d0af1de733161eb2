mod client;
mod in_memory;

pub use client::{GetObjectOutput, ObjectStore, StatusCode};
pub use in_memory::InMemoryObjectStore;
