// Job id source

use std::sync::atomic::{AtomicU64, Ordering};

/// Names each print job; ids show up in every per-job log line
pub trait IdProvider: Send + Sync {
    fn generate_id(&self) -> String;
}

/// Random v4 UUIDs
pub struct UuidProvider;

impl IdProvider for UuidProvider {
    fn generate_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Yields `job-1`, `job-2`, ...
#[derive(Default)]
pub struct SequentialIdProvider {
    next: AtomicU64,
}

impl IdProvider for SequentialIdProvider {
    fn generate_id(&self) -> String {
        format!("job-{}", self.next.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids() {
        let ids = SequentialIdProvider::default();
        assert_eq!(ids.generate_id(), "job-1");
        assert_eq!(ids.generate_id(), "job-2");
    }

    #[test]
    fn test_uuid_ids_are_unique() {
        assert_ne!(UuidProvider.generate_id(), UuidProvider.generate_id());
    }
}
