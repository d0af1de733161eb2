mod builder;
mod engine;

pub use builder::SnapshotStoreBuilder;
pub use engine::ObjectSnapshotStore;
