use serde::{Deserialize, Serialize};

use crate::fix::Fix;

/// [FixBatch] is the ordered result set produced by one scheduling tick:
/// fixes accumulated since the previous delivery, oldest first, newest last.
/// Immutable once built; receivers get shared read-only references.
///
/// Two batches are equal when they have the same length and each positional
/// pair of fixes carries the same timestamp (see [Fix] equality).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixBatch {
    fixes: Vec<Fix>,
}

impl FixBatch {
    /// Builds a [FixBatch] from fixes ordered oldest to newest.
    pub fn new(fixes: Vec<Fix>) -> Self {
        Self { fixes }
    }

    /// Ordered fixes, oldest first.
    pub fn fixes(&self) -> &[Fix] {
        &self.fixes
    }

    /// Most recent [Fix] in this batch, or None when empty.
    /// An empty batch is a zero-length batch, never an absent value.
    pub fn latest(&self) -> Option<&Fix> {
        self.fixes.last()
    }

    pub fn len(&self) -> usize {
        self.fixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty()
    }
}

impl From<Vec<Fix>> for FixBatch {
    fn from(fixes: Vec<Fix>) -> Self {
        Self::new(fixes)
    }
}

impl<'a> IntoIterator for &'a FixBatch {
    type Item = &'a Fix;
    type IntoIter = std::slice::Iter<'a, Fix>;

    fn into_iter(self) -> Self::IntoIter {
        self.fixes.iter()
    }
}

impl IntoIterator for FixBatch {
    type Item = Fix;
    type IntoIter = std::vec::IntoIter<Fix>;

    fn into_iter(self) -> Self::IntoIter {
        self.fixes.into_iter()
    }
}
