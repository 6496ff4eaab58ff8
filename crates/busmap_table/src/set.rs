//! The loaded records of one validation run.

use crate::error::TableError;
use crate::record::ConfigRecord;
use std::collections::HashMap;

/// Records in load order with O(1) lookup by name.
#[derive(Debug, Default, Clone)]
pub struct RecordSet {
    records: Vec<ConfigRecord>,
    index: HashMap<String, usize>,
}

impl RecordSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from records, rejecting duplicate names.
    pub fn from_records(
        records: impl IntoIterator<Item = ConfigRecord>,
    ) -> Result<Self, TableError> {
        let mut set = Self::new();
        for record in records {
            set.insert(record)?;
        }
        Ok(set)
    }

    /// Adds a record. A name already present is a [`TableError::DuplicateRecord`].
    pub fn insert(&mut self, record: ConfigRecord) -> Result<(), TableError> {
        if let Some(&existing) = self.index.get(&record.name) {
            return Err(TableError::DuplicateRecord {
                name: record.name.clone(),
                span: record.origin,
                first: self.records[existing].origin,
            });
        }
        self.index.insert(record.name.clone(), self.records.len());
        self.records.push(record);
        Ok(())
    }

    /// Returns the record named `name`.
    pub fn get(&self, name: &str) -> Option<&ConfigRecord> {
        self.index.get(name).map(|&i| &self.records[i])
    }

    /// Returns `true` if a record named `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Iterates over all records in load order.
    pub fn iter(&self) -> impl Iterator<Item = &ConfigRecord> {
        self.records.iter()
    }

    /// Iterates over the bus records in load order.
    pub fn buses(&self) -> impl Iterator<Item = &ConfigRecord> {
        self.records.iter().filter(|r| r.is_bus())
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no record is loaded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a ConfigRecord;
    type IntoIter = std::slice::Iter<'a, ConfigRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
