//! Cache-slot registration.
//!
//! The slot is the child mapping binding the fingerprint's record type to
//! the parent type. It must exist before any uncached-filter query runs;
//! without it the store's `has_child` filtering is undefined.

use tracing::{debug, info};

use anncache_common::Fingerprint;

use crate::error::SlotError;
use crate::store::DocumentStore;

/// Ensure the child mapping for `fingerprint` exists, registering it if
/// absent.
///
/// Safe to call on every run, including concurrently from independent
/// runs: when another run registers the mapping between our check and our
/// create, the store's "already exists" rejection resolves as success.
pub async fn ensure_slot(
    store: &dyn DocumentStore,
    fingerprint: &Fingerprint,
) -> Result<(), SlotError> {
    if store.child_mapping_exists(fingerprint).await? {
        debug!(%fingerprint, "cache slot already registered");
        return Ok(());
    }

    info!(%fingerprint, "registering cache slot");
    match store.put_child_mapping(fingerprint).await {
        Ok(()) => Ok(()),
        Err(SlotError::AlreadyExists(_)) => {
            debug!(%fingerprint, "lost registration race, slot exists");
            Ok(())
        },
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::error::QueryError;
    use crate::store::SampledBatch;

    /// Store double that scripts the mapping state and the create outcome.
    struct MappingStore {
        exists: bool,
        create_result: fn(&Fingerprint) -> Result<(), SlotError>,
        creates: AtomicUsize,
    }

    impl MappingStore {
        fn new(exists: bool, create_result: fn(&Fingerprint) -> Result<(), SlotError>) -> Self {
            Self {
                exists,
                create_result,
                creates: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl DocumentStore for MappingStore {
        async fn sample_uncached(
            &self,
            _set_id: i64,
            _fingerprint: &Fingerprint,
            _size: usize,
        ) -> Result<SampledBatch, QueryError> {
            unreachable!("slot registration never samples")
        }

        async fn child_mapping_exists(
            &self,
            _fingerprint: &Fingerprint,
        ) -> Result<bool, SlotError> {
            Ok(self.exists)
        }

        async fn put_child_mapping(&self, fingerprint: &Fingerprint) -> Result<(), SlotError> {
            self.creates.fetch_add(1, Ordering::SeqCst);
            (self.create_result)(fingerprint)
        }
    }

    fn fingerprint() -> Fingerprint {
        let spec = anncache_common::PipelineSpec::new(vec!["tokenize".into()]).expect("non-empty");
        Fingerprint::derive("article", &spec)
    }

    #[tokio::test]
    async fn test_registers_missing_slot() {
        let store = MappingStore::new(false, |_| Ok(()));

        ensure_slot(&store, &fingerprint()).await.expect("registered");
        assert_eq!(store.creates.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_existing_slot_skips_create() {
        let store = MappingStore::new(true, |_| panic!("must not create"));

        ensure_slot(&store, &fingerprint()).await.expect("no-op");
        assert_eq!(store.creates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_losing_create_race_is_success() {
        let store = MappingStore::new(false, |fp| Err(SlotError::AlreadyExists(fp.to_string())));

        ensure_slot(&store, &fingerprint()).await.expect("race resolves as success");
        assert_eq!(store.creates.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_hard_rejection_is_fatal() {
        let store = MappingStore::new(false, |_| {
            Err(SlotError::Rejected {
                status: 403,
                body: "forbidden".to_string(),
            })
        });

        let result = ensure_slot(&store, &fingerprint()).await;
        assert!(matches!(result, Err(SlotError::Rejected { status: 403, .. })));
    }
}
