use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::process::ProcessorContext;
use crate::table::{BoxedView, ValueAndTimestamp, View, ViewSupplier};

/// Latest value per key, with the timestamp it was written at.
///
/// A versioned store keeps whatever is newest: writes older than the current
/// entry are refused.
#[derive(Debug)]
pub struct InMemory<K: Hash, V> {
    name: String,
    versioned: bool,
    inner: HashMap<K, ValueAndTimestamp<V>>,
}

impl<K: Hash + Eq, V> InMemory<K, V> {
    pub fn new(name: &str) -> Self {
        InMemory {
            name: name.to_string(),
            versioned: false,
            inner: HashMap::new(),
        }
    }

    pub fn versioned(name: &str) -> Self {
        InMemory {
            versioned: true,
            ..InMemory::new(name)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_versioned(&self) -> bool {
        self.versioned
    }

    pub fn get(&self, key: &K) -> Option<&ValueAndTimestamp<V>> {
        self.inner.get(key)
    }

    /// Returns false when a versioned store refused an out-of-order write
    pub fn put(&mut self, key: K, value: V, timestamp: i64) -> bool {
        if self.is_stale(&key, timestamp) {
            trace!("Refusing out-of-order put into {} at {}", self.name, timestamp);
            return false;
        }
        self.inner.insert(key, ValueAndTimestamp::make(value, timestamp));
        true
    }

    pub fn delete(&mut self, key: &K, timestamp: i64) -> bool {
        if self.is_stale(key, timestamp) {
            trace!("Refusing out-of-order delete from {} at {}", self.name, timestamp);
            return false;
        }
        self.inner.remove(key);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn is_stale(&self, key: &K, timestamp: i64) -> bool {
        self.versioned && matches!(self.inner.get(key), Some(current) if current.timestamp > timestamp)
    }
}

/// Shares one partition's store between the stage writing it and the views reading it
pub struct StoreSupplier<K: Hash, V> {
    store: Rc<RefCell<InMemory<K, V>>>,
}

impl<K: Hash + Eq, V> StoreSupplier<K, V> {
    pub fn new(store: InMemory<K, V>) -> Self {
        StoreSupplier {
            store: Rc::new(RefCell::new(store)),
        }
    }

    pub fn store(&self) -> Rc<RefCell<InMemory<K, V>>> {
        self.store.clone()
    }
}

impl<K, V> ViewSupplier<K, V> for StoreSupplier<K, V>
where
    K: Hash + Eq + 'static,
    V: Clone + 'static,
{
    fn view(&self) -> BoxedView<K, V> {
        Box::new(StoreView {
            store: self.store.clone(),
            state: ViewState::Created,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ViewState {
    Created,
    Open,
    Closed,
}

/// Leaf view reading a store directly
pub struct StoreView<K: Hash, V> {
    store: Rc<RefCell<InMemory<K, V>>>,
    state: ViewState,
}

impl<K: Hash + Eq, V: Clone> View<K, V> for StoreView<K, V> {
    fn init(&mut self, context: &ProcessorContext) -> Result<()> {
        if self.state == ViewState::Closed {
            return Err(Error::ProcessorState {
                component: "store view",
                state: "closed",
                operation: "init",
            });
        }
        debug!("Opening view on {} for task {}", self.store.borrow().name(), context.task_id());
        self.state = ViewState::Open;
        Ok(())
    }

    fn get(&self, key: &K) -> Result<Option<ValueAndTimestamp<V>>> {
        match self.state {
            ViewState::Open => Ok(self.store.borrow().get(key).cloned()),
            ViewState::Created => Err(Error::ProcessorState {
                component: "store view",
                state: "not initialized",
                operation: "get",
            }),
            ViewState::Closed => Err(Error::ProcessorState {
                component: "store view",
                state: "closed",
                operation: "get",
            }),
        }
    }

    fn is_versioned(&self) -> bool {
        self.store.borrow().is_versioned()
    }

    fn close(&mut self) {
        self.state = ViewState::Closed;
    }
}
