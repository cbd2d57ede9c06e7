use std::cmp;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::metrics::Sensor;
use crate::process::{Processor, ProcessorContext, Record};
use crate::table::{BoxedView, Change, ValueAndTimestamp, View, ViewSupplier};
use crate::Config;

/// Combines a value from each side into the joined value.
///
/// Only ever called with two present values.
pub trait ValueJoiner<V1, V2, VOut> {
    fn apply(&self, v1: &V1, v2: &V2) -> VOut;
}

impl<F, V1, V2, VOut> ValueJoiner<V1, V2, VOut> for F
where
    F: Fn(&V1, &V2) -> VOut,
{
    fn apply(&self, v1: &V1, v2: &V2) -> VOut {
        self(v1, v2)
    }
}

/// Lets the right side drive a join while arguments still reach the joiner left first
pub struct Reversed<V1, V2, VOut>(Rc<dyn ValueJoiner<V1, V2, VOut>>);

impl<V1, V2, VOut> ValueJoiner<V2, V1, VOut> for Reversed<V1, V2, VOut> {
    fn apply(&self, v2: &V2, v1: &V1) -> VOut {
        self.0.apply(v1, v2)
    }
}

/// Inner join of two tables sharing a key.
///
/// Hands out a processor for each driving side and, as a [`ViewSupplier`],
/// views of the joined table so the result can feed further joins.
pub struct TableJoin<K, V1, V2, VOut> {
    left: Rc<dyn ViewSupplier<K, V1>>,
    right: Rc<dyn ViewSupplier<K, V2>>,
    joiner: Rc<dyn ValueJoiner<V1, V2, VOut>>,
    send_old_values: bool,
}

impl<K, V1, V2, VOut> TableJoin<K, V1, V2, VOut>
where
    K: Clone + 'static,
    V1: 'static,
    V2: 'static,
    VOut: 'static,
{
    pub fn inner<L, R, J>(left: L, right: R, joiner: J) -> Self
    where
        L: ViewSupplier<K, V1> + 'static,
        R: ViewSupplier<K, V2> + 'static,
        J: ValueJoiner<V1, V2, VOut> + 'static,
    {
        TableJoin {
            left: Rc::new(left),
            right: Rc::new(right),
            joiner: Rc::new(joiner),
            send_old_values: false,
        }
    }

    /// Materialize `old_value` on forwarded changes
    pub fn send_old_values(mut self, enabled: bool) -> Self {
        self.send_old_values = enabled;
        self
    }

    /// Apply join settings found in `cfg`
    pub fn configure(self, cfg: &Config) -> Result<Self> {
        Ok(self.send_old_values(cfg.send_old_values()?))
    }

    pub fn sends_old_values(&self) -> bool {
        self.send_old_values
    }

    /// Processor for changes arriving on the left table
    pub fn left_processor(&self) -> JoinProcessor<K, V1, V2, VOut> {
        JoinProcessor::new(self.left.view(), self.right.view(), self.joiner.clone(), self.send_old_values)
    }

    /// Processor for changes arriving on the right table
    pub fn right_processor(&self) -> JoinProcessor<K, V2, V1, VOut> {
        let joiner: Rc<dyn ValueJoiner<V2, V1, VOut>> = Rc::new(Reversed(self.joiner.clone()));
        JoinProcessor::new(self.right.view(), self.left.view(), joiner, self.send_old_values)
    }
}

impl<K, V1, V2, VOut> ViewSupplier<K, VOut> for TableJoin<K, V1, V2, VOut>
where
    K: Clone + 'static,
    V1: 'static,
    V2: 'static,
    VOut: 'static,
{
    fn view(&self) -> BoxedView<K, VOut> {
        Box::new(InnerJoinView::new(self.left.view(), self.right.view(), self.joiner.clone()))
    }
}

enum Lifecycle {
    Uninitialized,
    Initialized { dropped_records: Sensor },
    Closed,
}

impl Lifecycle {
    fn name(&self) -> &'static str {
        match self {
            Lifecycle::Uninitialized => "not initialized",
            Lifecycle::Initialized { .. } => "already initialized",
            Lifecycle::Closed => "closed",
        }
    }
}

/// Joins changes of the driving table against the current value of the other table.
///
/// Owns both views and closes them exactly once, at the latest when dropped.
pub struct JoinProcessor<K, VThis, VOther, VOut> {
    this_view: BoxedView<K, VThis>,
    other_view: BoxedView<K, VOther>,
    joiner: Rc<dyn ValueJoiner<VThis, VOther, VOut>>,
    send_old_values: bool,
    state: Lifecycle,
}

impl<K, VThis, VOther, VOut> JoinProcessor<K, VThis, VOther, VOut> {
    pub fn new(
        this_view: BoxedView<K, VThis>,
        other_view: BoxedView<K, VOther>,
        joiner: Rc<dyn ValueJoiner<VThis, VOther, VOut>>,
        send_old_values: bool,
    ) -> Self {
        JoinProcessor {
            this_view,
            other_view,
            joiner,
            send_old_values,
            state: Lifecycle::Uninitialized,
        }
    }

    fn state_error(&self, operation: &'static str) -> Error {
        Error::ProcessorState {
            component: "join processor",
            state: self.state.name(),
            operation,
        }
    }
}

impl<K, VThis, VOther, VOut> Processor for JoinProcessor<K, VThis, VOther, VOut> {
    type KeyIn = K;
    type ValueIn = Change<VThis>;
    type KeyOut = K;
    type ValueOut = Change<VOut>;

    fn init(&mut self, context: &ProcessorContext) -> Result<()> {
        if !matches!(self.state, Lifecycle::Uninitialized) {
            return Err(self.state_error("init"));
        }
        let dropped_records = context.dropped_records_sensor();

        // only views whose init succeeded get closed again
        if let Err(e) = self.this_view.init(context) {
            self.state = Lifecycle::Closed;
            return Err(e);
        }
        if let Err(e) = self.other_view.init(context) {
            self.this_view.close();
            self.state = Lifecycle::Closed;
            return Err(e);
        }
        debug!("Initialized join processor for task {}", context.task_id());
        self.state = Lifecycle::Initialized { dropped_records };
        Ok(())
    }

    fn process(&mut self, record: Record<K, Change<VThis>>) -> Result<Option<Record<K, Change<VOut>>>> {
        let dropped_records = match &self.state {
            Lifecycle::Initialized { dropped_records } => dropped_records,
            _ => return Err(self.state_error("process")),
        };

        // equality of keys is what we join on, a missing key can't match anything
        let key = match &record.key {
            Some(key) => key,
            None => {
                match &record.metadata {
                    Some(metadata) => warn!("Dropping record with null key. {}", metadata),
                    None => warn!("Dropping record with null key. Topic, partition and offset unknown."),
                }
                dropped_records.record();
                return Ok(None);
            }
        };

        if self.this_view.is_versioned() {
            if let Some(current) = self.this_view.get(key)? {
                if current.timestamp > record.timestamp {
                    info!(
                        "Dropping out-of-order record from versioned table, record at {} but table at {}",
                        record.timestamp, current.timestamp
                    );
                    dropped_records.record();
                    return Ok(None);
                }
            }
        }

        let other = match self.other_view.get(key)? {
            Some(other) => other,
            None => return Ok(None),
        };

        let timestamp = cmp::max(record.timestamp, other.timestamp);
        let change = &record.value;
        let new_value = change.new_value.as_ref().map(|v| self.joiner.apply(v, &other.value));
        let old_value = if self.send_old_values {
            change.old_value.as_ref().map(|v| self.joiner.apply(v, &other.value))
        } else {
            None
        };
        let is_latest = change.is_latest;

        Ok(Some(
            record
                .with_value(Change::new(new_value, old_value, is_latest))
                .with_timestamp(timestamp),
        ))
    }

    fn close(&mut self) {
        if let Lifecycle::Initialized { .. } = self.state {
            self.this_view.close();
            self.other_view.close();
        }
        self.state = Lifecycle::Closed;
    }
}

impl<K, VThis, VOther, VOut> Drop for JoinProcessor<K, VThis, VOther, VOut> {
    fn drop(&mut self) {
        self.close();
    }
}

/// View of the joined table, answered from the two parent views
pub struct InnerJoinView<K, V1, V2, VOut> {
    left: BoxedView<K, V1>,
    right: BoxedView<K, V2>,
    joiner: Rc<dyn ValueJoiner<V1, V2, VOut>>,
    key_mapper: Rc<dyn Fn(&K, &V1) -> K>,
    closed: bool,
}

impl<K: Clone + 'static, V1: 'static, V2, VOut> InnerJoinView<K, V1, V2, VOut> {
    pub fn new(
        left: BoxedView<K, V1>,
        right: BoxedView<K, V2>,
        joiner: Rc<dyn ValueJoiner<V1, V2, VOut>>,
    ) -> Self {
        InnerJoinView {
            left,
            right,
            joiner,
            key_mapper: Rc::new(|key: &K, _: &V1| key.clone()),
            closed: false,
        }
    }

    /// Derive the right side lookup key from the left key and value
    pub fn with_key_mapper<M>(mut self, key_mapper: M) -> Self
    where
        M: Fn(&K, &V1) -> K + 'static,
    {
        self.key_mapper = Rc::new(key_mapper);
        self
    }
}

impl<K, V1, V2, VOut> View<K, VOut> for InnerJoinView<K, V1, V2, VOut> {
    fn init(&mut self, context: &ProcessorContext) -> Result<()> {
        if let Err(e) = self.left.init(context) {
            self.closed = true;
            return Err(e);
        }
        if let Err(e) = self.right.init(context) {
            self.left.close();
            self.closed = true;
            return Err(e);
        }
        Ok(())
    }

    fn get(&self, key: &K) -> Result<Option<ValueAndTimestamp<VOut>>> {
        let left = match self.left.get(key)? {
            Some(left) => left,
            None => return Ok(None),
        };
        let right_key = (self.key_mapper)(key, &left.value);
        let right = match self.right.get(&right_key)? {
            Some(right) => right,
            None => return Ok(None),
        };
        Ok(Some(ValueAndTimestamp::make(
            self.joiner.apply(&left.value, &right.value),
            cmp::max(left.timestamp, right.timestamp),
        )))
    }

    fn is_versioned(&self) -> bool {
        // two versioned inputs don't make a versioned join result
        false
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.left.close();
        self.right.close();
        self.closed = true;
    }
}
