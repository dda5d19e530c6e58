use serde::{Deserialize, Serialize};

/// Engine-assigned identifier of a single job.
///
/// The key stays stable across redeliveries of the same job, so it doubles
/// as an idempotency key for side effects performed on the job's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobKey(i64);

impl JobKey {
    /// Wraps a raw engine key.
    pub fn new(key: i64) -> Self {
        Self(key)
    }

    /// Returns the raw key.
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for JobKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for JobKey {
    fn from(key: i64) -> Self {
        Self(key)
    }
}

/// Identifier of the saga instance that owns a job. Opaque to the workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessInstanceKey(i64);

impl ProcessInstanceKey {
    pub fn new(key: i64) -> Self {
        Self(key)
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for ProcessInstanceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ProcessInstanceKey {
    fn from(key: i64) -> Self {
        Self(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_key_preserves_value() {
        let key = JobKey::new(2251799813685249);
        assert_eq!(key.get(), 2251799813685249);
        assert_eq!(key.to_string(), "2251799813685249");
    }

    #[test]
    fn job_key_serializes_as_plain_number() {
        let json = serde_json::to_string(&JobKey::new(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn process_instance_key_from_i64() {
        let key: ProcessInstanceKey = 7.into();
        assert_eq!(key, ProcessInstanceKey::new(7));
    }
}
