use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

/// Set of PO numbers associated with a customer, stored as a JSON column.
///
/// Kept as an ordered vector with set semantics so serialized output is
/// stable across writes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct PoNumberSet(Vec<String>);

impl PoNumberSet {
    pub fn new(numbers: Vec<String>) -> Self {
        let mut set = Self::default();
        for number in numbers {
            set.insert(&number);
        }
        set
    }

    /// Adds a number if absent. Returns true when the set changed.
    pub fn insert(&mut self, po_number: &str) -> bool {
        if self.contains(po_number) {
            return false;
        }
        self.0.push(po_number.to_string());
        true
    }

    /// Removes a number if present. Returns true when the set changed.
    pub fn remove(&mut self, po_number: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|n| n != po_number);
        self.0.len() != before
    }

    pub fn contains(&self, po_number: &str) -> bool {
        self.0.iter().any(|n| n == po_number)
    }

    /// Membership equality. Two sets holding the same numbers in a
    /// different insertion order are the same set.
    pub fn same_members(&self, other: &PoNumberSet) -> bool {
        self.0.len() == other.0.len() && self.0.iter().all(|n| other.contains(n))
    }

    /// Drops every number not accepted by the predicate. Returns the number
    /// of entries removed.
    pub fn retain<F: FnMut(&str) -> bool>(&mut self, mut keep: F) -> usize {
        let before = self.0.len();
        self.0.retain(|n| keep(n));
        before - self.0.len()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
