//! Project API key-set entity and related types

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Privilege tier of an API key
///
/// The ordering is fixed and indexes the parallel partitions of
/// [`KeyPartitions`]. A master key does not implicitly satisfy read or
/// write checks; each tier is matched exactly.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AccessKeyType {
    MasterKey,
    ReadKey,
    WriteKey,
}

impl AccessKeyType {
    /// All tiers in partition order
    pub const ALL: [AccessKeyType; 3] =
        [Self::MasterKey, Self::ReadKey, Self::WriteKey];

    /// Partition index of this tier
    pub fn index(self) -> usize {
        match self {
            Self::MasterKey => 0,
            Self::ReadKey => 1,
            Self::WriteKey => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::MasterKey => "master_key",
            Self::ReadKey => "read_key",
            Self::WriteKey => "write_key",
        }
    }
}

impl std::fmt::Display for AccessKeyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One issued key-set: a project bound to a master/read/write key triple
///
/// Rows are immutable once created; the only lifecycle events are creation
/// and whole-row deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectApiKeys {
    /// Store-assigned identifier
    id: i32,
    /// Project the key-set belongs to
    project: String,
    master_key: String,
    read_key: String,
    write_key: String,
    /// Creation timestamp, assigned by the store
    created_at: DateTime<Utc>,
}

impl ProjectApiKeys {
    pub fn new(
        id: i32,
        project: impl Into<String>,
        master_key: impl Into<String>,
        read_key: impl Into<String>,
        write_key: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            project: project.into(),
            master_key: master_key.into(),
            read_key: read_key.into(),
            write_key: write_key.into(),
            created_at,
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn master_key(&self) -> &str {
        &self.master_key
    }

    pub fn read_key(&self) -> &str {
        &self.read_key
    }

    pub fn write_key(&self) -> &str {
        &self.write_key
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The key of the given tier
    pub fn key_of(&self, key_type: AccessKeyType) -> &str {
        match key_type {
            AccessKeyType::MasterKey => &self.master_key,
            AccessKeyType::ReadKey => &self.read_key,
            AccessKeyType::WriteKey => &self.write_key,
        }
    }
}

/// One project's currently valid keys, partitioned by tier
///
/// Derived state: a key appears in a partition iff some non-deleted row of
/// the durable store carries it in the matching column for that project.
/// A project with several key-sets contributes all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPartitions {
    partitions: [HashSet<String>; 3],
}

impl KeyPartitions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key_type: AccessKeyType, key: impl Into<String>) {
        self.partitions[key_type.index()].insert(key.into());
    }

    /// Add every key of a key-set to its partition
    pub fn insert_set(&mut self, keys: &ProjectApiKeys) {
        for key_type in AccessKeyType::ALL {
            self.insert(key_type, keys.key_of(key_type));
        }
    }

    pub fn contains(&self, key_type: AccessKeyType, key: &str) -> bool {
        self.partitions[key_type.index()].contains(key)
    }

    pub fn keys_of(&self, key_type: AccessKeyType) -> &HashSet<String> {
        &self.partitions[key_type.index()]
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.iter().all(HashSet::is_empty)
    }
}
