use uuid::Uuid;

use crate::models::JobId;

/// Source of provisional identifiers for entries awaiting their permanent id.
pub trait IdGenerator: Send + Sync {
    /// Must not repeat within the session.
    fn temporary_id(&self) -> JobId;
}

/// Random v4 ids behind a recognisable prefix.
pub struct UuidIdGenerator {
    prefix: String,
}

impl UuidIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for UuidIdGenerator {
    fn default() -> Self {
        Self::new("temp-")
    }
}

impl IdGenerator for UuidIdGenerator {
    fn temporary_id(&self) -> JobId {
        JobId::new(format!("{}{}", self.prefix, Uuid::new_v4()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temporary_ids_are_prefixed_and_unique() {
        let ids = UuidIdGenerator::new("tmp_");
        let a = ids.temporary_id();
        let b = ids.temporary_id();
        assert!(a.as_str().starts_with("tmp_"));
        assert_ne!(a, b);
    }
}
