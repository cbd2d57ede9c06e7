#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use ktjoin::error::{Error, Result};
use ktjoin::metrics::StreamsMetrics;
use ktjoin::process::{ProcessorContext, Record, TaskId};
use ktjoin::store::{InMemory, StoreSupplier};
use ktjoin::table::{BoxedView, ValueAndTimestamp, View, ViewSupplier};
use ktjoin::{Change, Config};

pub const TASK: TaskId = TaskId {
    subtopology: 0,
    partition: 0,
};

pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn context(metrics: &StreamsMetrics) -> ProcessorContext {
    ProcessorContext::new(&Config::new(), TASK, metrics.clone())
}

pub fn dropped(metrics: &StreamsMetrics) -> u64 {
    metrics.dropped_records_sensor("ktjoin", TASK).count()
}

pub fn concat(l: &i32, r: &String) -> String {
    format!("{}{}", l, r)
}

/// Stands in for the upstream table source: writes the store and hands out
/// the change it would forward.
pub struct Table<V> {
    supplier: Rc<StoreSupplier<&'static str, V>>,
}

impl<V: Clone + 'static> Table<V> {
    pub fn new(name: &str) -> Self {
        Table {
            supplier: Rc::new(StoreSupplier::new(InMemory::new(name))),
        }
    }

    pub fn versioned(name: &str) -> Self {
        Table {
            supplier: Rc::new(StoreSupplier::new(InMemory::versioned(name))),
        }
    }

    pub fn supplier(&self) -> Rc<StoreSupplier<&'static str, V>> {
        self.supplier.clone()
    }

    pub fn upsert(&self, key: &'static str, value: V, timestamp: i64) -> Record<&'static str, Change<V>> {
        let store = self.supplier.store();
        let old = store.borrow().get(&key).map(|v| v.value.clone());
        store.borrow_mut().put(key, value.clone(), timestamp);
        Record::new(key, Change::new(Some(value), old, true), timestamp)
    }

    pub fn delete(&self, key: &'static str, timestamp: i64) -> Record<&'static str, Change<V>> {
        let store = self.supplier.store();
        let old = store.borrow().get(&key).map(|v| v.value.clone());
        store.borrow_mut().delete(&key, timestamp);
        Record::new(key, Change::delete(old), timestamp)
    }
}

/// View whose storage went away
pub struct Unavailable {
    pub closes: Rc<Cell<u32>>,
}

impl View<&'static str, String> for Unavailable {
    fn init(&mut self, _context: &ProcessorContext) -> Result<()> {
        Ok(())
    }

    fn get(&self, _key: &&'static str) -> Result<Option<ValueAndTimestamp<String>>> {
        Err(Error::Store {
            store: "right".to_string(),
            reason: "unavailable".to_string(),
        })
    }

    fn is_versioned(&self) -> bool {
        false
    }

    fn close(&mut self) {
        self.closes.set(self.closes.get() + 1);
    }
}

/// Supplier of views recording how often they were closed
pub struct Closing<V> {
    pub table: Rc<StoreSupplier<&'static str, V>>,
    pub closes: Rc<Cell<u32>>,
}

struct ClosingView<V> {
    inner: BoxedView<&'static str, V>,
    closes: Rc<Cell<u32>>,
}

impl<V: 'static> View<&'static str, V> for ClosingView<V> {
    fn init(&mut self, context: &ProcessorContext) -> Result<()> {
        self.inner.init(context)
    }

    fn get(&self, key: &&'static str) -> Result<Option<ValueAndTimestamp<V>>> {
        self.inner.get(key)
    }

    fn is_versioned(&self) -> bool {
        self.inner.is_versioned()
    }

    fn close(&mut self) {
        self.closes.set(self.closes.get() + 1);
        self.inner.close();
    }
}

impl<V: Clone + 'static> ViewSupplier<&'static str, V> for Closing<V> {
    fn view(&self) -> BoxedView<&'static str, V> {
        Box::new(ClosingView {
            inner: self.table.view(),
            closes: self.closes.clone(),
        })
    }
}
