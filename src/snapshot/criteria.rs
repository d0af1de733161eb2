use serde::{Deserialize, Serialize};

use super::metadata::{SequenceNumber, SnapshotMetadata};

/// Selection window for load and delete queries. All bounds are inclusive.
///
/// Callers are expected to keep `min <= max` on each axis; an inverted window
/// simply matches nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotSelectionCriteria {
    pub min_sequence_number: SequenceNumber,
    pub max_sequence_number: SequenceNumber,
    pub min_timestamp: u64,
    pub max_timestamp: u64,
}

impl Default for SnapshotSelectionCriteria {
    fn default() -> Self {
        Self::latest()
    }
}

impl SnapshotSelectionCriteria {
    /// Matches every snapshot.
    pub const fn latest() -> Self {
        SnapshotSelectionCriteria {
            min_sequence_number: SequenceNumber::MIN,
            max_sequence_number: SequenceNumber::MAX,
            min_timestamp: 0,
            max_timestamp: u64::MAX,
        }
    }

    /// Matches nothing past the origin (sequence 0, timestamp 0).
    pub const fn none() -> Self {
        SnapshotSelectionCriteria {
            min_sequence_number: SequenceNumber::MIN,
            max_sequence_number: SequenceNumber::MIN,
            min_timestamp: 0,
            max_timestamp: 0,
        }
    }

    /// Every snapshot at exactly `sequence_number`, whatever its timestamp.
    pub const fn at_sequence(sequence_number: SequenceNumber) -> Self {
        SnapshotSelectionCriteria {
            min_sequence_number: sequence_number,
            max_sequence_number: sequence_number,
            min_timestamp: 0,
            max_timestamp: u64::MAX,
        }
    }

    pub fn with_max_sequence_number(mut self, max: u64) -> Self {
        self.max_sequence_number = SequenceNumber::new(max);
        self
    }

    pub fn with_min_sequence_number(mut self, min: u64) -> Self {
        self.min_sequence_number = SequenceNumber::new(min);
        self
    }

    pub fn with_max_timestamp(mut self, max: u64) -> Self {
        self.max_timestamp = max;
        self
    }

    pub fn with_min_timestamp(mut self, min: u64) -> Self {
        self.min_timestamp = min;
        self
    }

    pub fn matches(&self, metadata: &SnapshotMetadata) -> bool {
        (self.min_sequence_number..=self.max_sequence_number).contains(&metadata.sequence_number)
            && (self.min_timestamp..=self.max_timestamp).contains(&metadata.timestamp)
    }
}
