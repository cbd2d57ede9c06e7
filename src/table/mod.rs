use std::rc::Rc;

use crate::error::Result;
use crate::process::ProcessorContext;

pub mod change;
pub mod join;

pub use change::Change;

/// Value of a table entry together with the timestamp it became current at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueAndTimestamp<V> {
    pub value: V,
    pub timestamp: i64,
}

impl<V> ValueAndTimestamp<V> {
    pub fn make(value: V, timestamp: i64) -> Self {
        ValueAndTimestamp { value, timestamp }
    }
}

/// Point lookup into the current contents of a table.
///
/// Views of derived tables hold no state of their own; they answer by
/// querying the views they were built from.
pub trait View<K, V> {
    /// Must be called before the first `get`
    fn init(&mut self, context: &ProcessorContext) -> Result<()>;

    fn get(&self, key: &K) -> Result<Option<ValueAndTimestamp<V>>>;

    /// Whether the table rejects updates older than what it already holds
    fn is_versioned(&self) -> bool;

    fn close(&mut self);
}

pub type BoxedView<K, V> = Box<dyn View<K, V>>;

/// Hands out one fresh view per processor instance
pub trait ViewSupplier<K, V> {
    fn view(&self) -> BoxedView<K, V>;
}

impl<K, V, S: ViewSupplier<K, V> + ?Sized> ViewSupplier<K, V> for Rc<S> {
    fn view(&self) -> BoxedView<K, V> {
        (**self).view()
    }
}
