//! Injectable id generation.

use crate::model::EntityId;
use uuid::Uuid;

/// Source of fresh entity ids.
pub trait IdFactory: Send {
    fn next_id(&mut self) -> EntityId;
}

/// Deterministic `prefix1`, `prefix2`, ... ids.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("e")
    }
}

impl IdFactory for SequentialIds {
    fn next_id(&mut self) -> EntityId {
        let id = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

/// Random v4 UUID ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdFactory for UuidIds {
    fn next_id(&mut self) -> EntityId {
        Uuid::new_v4().to_string()
    }
}
