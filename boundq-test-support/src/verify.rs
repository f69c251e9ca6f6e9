//! Delivery checks over values observed by consumers.

use std::collections::HashMap;

use boundq::Value;

/// Checks that values from each producer arrive in the order it inserted them.
///
/// Assumes the stress tagging scheme: producer `p` inserts increasing values in
/// `p * items_per_producer..(p + 1) * items_per_producer`. A FIFO queue hands
/// them to any single consumer in that same relative order.
pub struct SequenceChecker {
    items_per_producer: usize,
    last_seen: HashMap<usize, Value>,
    violations: Vec<(Value, Value)>,
}

impl SequenceChecker {
    pub fn new(items_per_producer: usize) -> Self {
        Self {
            items_per_producer: items_per_producer.max(1),
            last_seen: HashMap::new(),
            violations: Vec::new(),
        }
    }

    pub fn observe(&mut self, value: Value) {
        let producer = (value as usize) / self.items_per_producer;
        if let Some(previous) = self.last_seen.insert(producer, value) {
            if previous >= value {
                self.violations.push((previous, value));
            }
        }
    }

    pub fn observe_all(&mut self, values: &[Value]) {
        for &v in values {
            self.observe(v);
        }
    }

    /// `(earlier, later)` pairs that arrived out of order
    pub fn violations(&self) -> &[(Value, Value)] {
        &self.violations
    }

    pub fn is_ordered(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Exactly-once delivery: every expected value observed once, nothing extra.
#[derive(Default)]
pub struct MultisetChecker {
    balance: HashMap<Value, i64>,
}

impl MultisetChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect(&mut self, values: impl IntoIterator<Item = Value>) {
        for v in values {
            *self.balance.entry(v).or_default() += 1;
        }
    }

    pub fn observe(&mut self, values: impl IntoIterator<Item = Value>) {
        for v in values {
            *self.balance.entry(v).or_default() -= 1;
        }
    }

    /// Expected but never observed
    pub fn missing(&self) -> Vec<Value> {
        self.sorted_where(|balance| balance > 0)
    }

    /// Observed more often than expected
    pub fn duplicated(&self) -> Vec<Value> {
        self.sorted_where(|balance| balance < 0)
    }

    pub fn is_exact(&self) -> bool {
        self.balance.values().all(|&b| b == 0)
    }

    fn sorted_where(&self, keep: impl Fn(i64) -> bool) -> Vec<Value> {
        let mut out: Vec<Value> = self.balance
            .iter()
            .filter(|&(_, &b)| keep(b))
            .map(|(&v, _)| v)
            .collect();
        out.sort_unstable();
        out
    }
}
