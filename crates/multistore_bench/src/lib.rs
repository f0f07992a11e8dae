//! Benchmark utilities.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use rand::Rng;

/// A benchmark record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    /// Unique identifier.
    pub id: u64,
    /// Group shared by many records.
    pub group: u32,
    /// Optional tag; `None` keeps the record out of the tag index.
    pub tag: Option<u16>,
}

impl Record {
    /// Extracts the id.
    pub fn id_key(&self) -> Option<u64> {
        Some(self.id)
    }

    /// Extracts the group.
    pub fn group_key(&self) -> Option<u32> {
        Some(self.group)
    }

    /// Extracts the tag.
    pub fn tag_key(&self) -> Option<u16> {
        self.tag
    }
}

/// Generate `count` records with sequential ids spread over `groups` groups.
pub fn generate_records(count: usize, groups: u32) -> Vec<Record> {
    let mut rng = rand::thread_rng();
    (0..count as u64)
        .map(|id| Record {
            id,
            group: rng.gen_range(0..groups.max(1)),
            tag: if rng.gen_bool(0.5) {
                Some(rng.gen())
            } else {
                None
            },
        })
        .collect()
}

/// Generate records whose ids are drawn from `0..id_space`, so that
/// inserting them into a store with a unique id index keeps evicting.
pub fn generate_colliding_records(count: usize, id_space: u64) -> Vec<Record> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|i| Record {
            id: rng.gen_range(0..id_space.max(1)),
            group: i as u32,
            tag: None,
        })
        .collect()
}
