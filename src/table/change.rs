use serde::{Deserialize, Serialize};

/// Transition of a single key between two processing instants.
///
/// `old_value` is only filled in when a downstream stage asked for old values.
/// `is_latest` tells downstream stages whether another change for the same key
/// is still pending in the current batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change<V> {
    pub new_value: Option<V>,
    pub old_value: Option<V>,
    pub is_latest: bool,
}

impl<V> Change<V> {
    pub fn new(new_value: Option<V>, old_value: Option<V>, is_latest: bool) -> Self {
        Change {
            new_value,
            old_value,
            is_latest,
        }
    }

    pub fn insert(value: V) -> Self {
        Change::new(Some(value), None, true)
    }

    pub fn update(new_value: V, old_value: V) -> Self {
        Change::new(Some(new_value), Some(old_value), true)
    }

    pub fn delete(old_value: Option<V>) -> Self {
        Change::new(None, old_value, true)
    }

    /// Neither side carries a value
    pub fn is_empty(&self) -> bool {
        self.new_value.is_none() && self.old_value.is_none()
    }
}
