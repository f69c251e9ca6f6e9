//! Construction-time selection of storage, strategy and admission limit.

use std::time::Duration;

use serde::{ Deserialize, Serialize };

use crate::buffer::{ BoundedBuffer, RingBuffer, SlotRingBuffer };
use crate::constants::{ DEFAULT_CAPACITY, DEFAULT_INTERRUPT_POLL };
use crate::error::{ QueueError, Result };
use crate::policy::{
    AdmissionLimitPolicy,
    ConditionPairPolicy,
    MonitorPolicy,
    SemaphorePolicy,
    SyncPolicy,
};

/// Blocking strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyKind {
    Monitor,
    Semaphore,
    #[default]
    ConditionPair,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 3] = [PolicyKind::Monitor, PolicyKind::Semaphore, PolicyKind::ConditionPair];

    /// Same string the built policy reports from `SyncPolicy::name`
    pub fn name(self) -> &'static str {
        match self {
            PolicyKind::Monitor => "monitor",
            PolicyKind::Semaphore => "semaphore",
            PolicyKind::ConditionPair => "condition-pair",
        }
    }
}

impl std::fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Buffer representation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageKind {
    #[default]
    Ring,
    Slots,
}

impl StorageKind {
    pub const ALL: [StorageKind; 2] = [StorageKind::Ring, StorageKind::Slots];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Number of slots
    pub capacity: usize,
    pub policy: PolicyKind,
    pub storage: StorageKind,
    /// Maximum concurrent callers; `None` disables admission control
    pub admission_limit: Option<usize>,
    /// Re-check interval for waits holding an armed `Interrupt`
    pub interrupt_poll: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            policy: PolicyKind::default(),
            storage: StorageKind::default(),
            admission_limit: None,
            interrupt_poll: DEFAULT_INTERRUPT_POLL,
        }
    }
}

impl QueueConfig {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(QueueError::InvalidCapacity { capacity });
        }

        Ok(Self {
            capacity,
            ..Default::default()
        })
    }

    pub fn with_policy(mut self, policy: PolicyKind) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_storage(mut self, storage: StorageKind) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_admission_limit(mut self, limit: usize) -> Result<Self> {
        if limit == 0 {
            return Err(QueueError::InvalidLimit { limit });
        }

        self.admission_limit = Some(limit);
        Ok(self)
    }

    pub fn with_interrupt_poll(mut self, poll: Duration) -> Result<Self> {
        if poll.is_zero() {
            return Err(QueueError::config("Interrupt poll interval must be greater than 0"));
        }

        self.interrupt_poll = poll;
        Ok(self)
    }

    /// Re-validate fields that may have been set directly or deserialized.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(QueueError::InvalidCapacity { capacity: self.capacity });
        }
        if self.admission_limit == Some(0) {
            return Err(QueueError::InvalidLimit { limit: 0 });
        }
        if self.interrupt_poll.is_zero() {
            return Err(QueueError::config("Interrupt poll interval must be greater than 0"));
        }
        Ok(())
    }

    /// Build the configured policy stack.
    pub fn build(&self) -> Result<Box<dyn SyncPolicy>> {
        self.validate()?;

        let policy = match self.storage {
            StorageKind::Ring => self.wrap(RingBuffer::new(self.capacity)?),
            StorageKind::Slots => self.wrap(SlotRingBuffer::new(self.capacity)?),
        };

        match self.admission_limit {
            Some(limit) => Ok(Box::new(AdmissionLimitPolicy::new(policy, limit)?)),
            None => Ok(policy),
        }
    }

    fn wrap<B: BoundedBuffer + 'static>(&self, buffer: B) -> Box<dyn SyncPolicy> {
        let poll = self.interrupt_poll;
        match self.policy {
            PolicyKind::Monitor => Box::new(MonitorPolicy::with_poll(buffer, poll)),
            PolicyKind::Semaphore => Box::new(SemaphorePolicy::with_poll(buffer, poll)),
            PolicyKind::ConditionPair => Box::new(ConditionPairPolicy::with_poll(buffer, poll)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = QueueConfig::new(8).unwrap();
        assert_eq!(config.capacity, 8);
        assert_eq!(config.policy, PolicyKind::ConditionPair);
        assert_eq!(config.storage, StorageKind::Ring);
        assert_eq!(config.admission_limit, None);
    }

    #[test]
    fn test_config_invalid_values() {
        assert_eq!(QueueConfig::new(0), Err(QueueError::InvalidCapacity { capacity: 0 }));
        assert_eq!(
            QueueConfig::new(4).unwrap().with_admission_limit(0),
            Err(QueueError::InvalidLimit { limit: 0 })
        );
        assert!(QueueConfig::new(4).unwrap().with_interrupt_poll(Duration::ZERO).is_err());

        let tampered = QueueConfig { capacity: 0, ..Default::default() };
        assert!(tampered.build().is_err());
    }

    #[test]
    fn test_build_every_combination() {
        for policy in PolicyKind::ALL {
            for storage in StorageKind::ALL {
                let queue = QueueConfig::new(2)
                    .unwrap()
                    .with_policy(policy)
                    .with_storage(storage)
                    .build()
                    .unwrap();

                queue.insert(1).unwrap();
                queue.insert(2).unwrap();
                assert!(queue.is_full());
                assert_eq!(queue.retrieve().unwrap(), 1);
                assert_eq!(queue.retrieve().unwrap(), 2);
                assert_eq!(queue.size(), 2);
                assert_eq!(queue.name(), policy.name());
            }
        }
    }

    #[test]
    fn test_build_with_admission_limit() {
        let queue = QueueConfig::new(3)
            .unwrap()
            .with_policy(PolicyKind::Monitor)
            .with_admission_limit(2)
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(queue.name(), "admission-limit");
        queue.insert(4).unwrap();
        assert_eq!(queue.retrieve().unwrap(), 4);
        assert_eq!(queue.metrics().peak_in_flight, 1);
    }
}
