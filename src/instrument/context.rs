use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::snapshot::PersistenceId;

/// Public operation of the snapshot store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Load,
    Save,
    Delete,
    DeleteByCriteria,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Load,
        Operation::Save,
        Operation::Delete,
        Operation::DeleteByCriteria,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Load => "load",
            Operation::Save => "save",
            Operation::Delete => "delete",
            Operation::DeleteByCriteria => "delete_by_criteria",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Correlation token threaded through the instrumentation hooks of one call.
///
/// Never mutated in place: hooks enrich it by returning a copy built with
/// [`Context::with_attribute`].
#[derive(Clone, Debug)]
pub struct Context {
    id: Uuid,
    persistence_id: PersistenceId,
    operation: Operation,
    started_at: Instant,
    attributes: BTreeMap<String, String>,
}

impl Context {
    pub fn new(persistence_id: PersistenceId, operation: Operation) -> Self {
        Context {
            id: Uuid::new_v4(),
            persistence_id,
            operation,
            started_at: Instant::now(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn persistence_id(&self) -> &PersistenceId {
        &self.persistence_id
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn with_attribute(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut enriched = self.clone();
        enriched.attributes.insert(key.into(), value.into());
        enriched
    }
}
