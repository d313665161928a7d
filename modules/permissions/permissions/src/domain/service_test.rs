//! Service tests against in-memory doubles of the store and cache ports.

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet, HashMap};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use permissions_sdk::{ErrorCode, Permission, PermissionSet, PermissionsError};
    use tracing_test::traced_test;

    use crate::domain::cache::{CacheError, PermissionCache};
    use crate::domain::error::DomainError;
    use crate::domain::model::Grant;
    use crate::domain::repo::{PermissionStore, StoreError};
    use crate::domain::service::Service;
    use crate::domain::validation::ActionCatalog;

    #[derive(Default)]
    struct MemStore {
        rows: Mutex<BTreeSet<(String, String, String)>>,
        lists: AtomicUsize,
        down: AtomicBool,
        broken_lists: AtomicBool,
    }

    impl MemStore {
        fn reads(&self) -> usize {
            self.lists.load(Ordering::SeqCst)
        }

        fn go_down(&self) {
            self.down.store(true, Ordering::SeqCst);
        }

        fn check_up(&self) -> Result<(), StoreError> {
            if self.down.load(Ordering::SeqCst) {
                Err(StoreError::unavailable("connection refused"))
            } else {
                Ok(())
            }
        }

        fn key(g: &Grant<'_>) -> (String, String, String) {
            (g.api_key.to_owned(), g.module.to_owned(), g.action.to_owned())
        }
    }

    #[async_trait]
    impl PermissionStore for MemStore {
        async fn grant(&self, grant: &Grant<'_>) -> Result<(), StoreError> {
            self.check_up()?;
            self.rows.lock().unwrap().insert(Self::key(grant));
            Ok(())
        }

        async fn revoke(&self, grant: &Grant<'_>) -> Result<(), StoreError> {
            self.check_up()?;
            if self.rows.lock().unwrap().remove(&Self::key(grant)) {
                Ok(())
            } else {
                Err(StoreError::NotFound)
            }
        }

        async fn list(&self, api_key: &str) -> Result<PermissionSet, StoreError> {
            self.lists.fetch_add(1, Ordering::SeqCst);
            self.check_up()?;
            if self.broken_lists.load(Ordering::SeqCst) {
                return Err(StoreError::unavailable("read replica lost"));
            }
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|(k, _, _)| k == api_key)
                .map(|(_, m, a)| Permission::new(m.as_str(), a.as_str()))
                .collect())
        }

        async fn exists(&self, grant: &Grant<'_>) -> Result<bool, StoreError> {
            self.check_up()?;
            Ok(self.rows.lock().unwrap().contains(&Self::key(grant)))
        }
    }

    /// Cache double; `broken_reads` / `broken_writes` make the matching calls fail.
    #[derive(Default)]
    struct MemCache {
        entries: Mutex<HashMap<String, PermissionSet>>,
        broken_reads: AtomicBool,
        broken_writes: AtomicBool,
        invalidations: AtomicUsize,
    }

    impl MemCache {
        fn entry(&self, api_key: &str) -> Option<PermissionSet> {
            self.entries.lock().unwrap().get(api_key).cloned()
        }

        fn seed(&self, api_key: &str, permissions: PermissionSet) {
            self.entries
                .lock()
                .unwrap()
                .insert(api_key.to_owned(), permissions);
        }
    }

    #[async_trait]
    impl PermissionCache for MemCache {
        async fn get(&self, api_key: &str) -> Result<Option<PermissionSet>, CacheError> {
            if self.broken_reads.load(Ordering::SeqCst) {
                return Err(CacheError::unavailable("cache down"));
            }
            Ok(self.entry(api_key))
        }

        async fn put(&self, api_key: &str, permissions: &PermissionSet) -> Result<(), CacheError> {
            if self.broken_writes.load(Ordering::SeqCst) {
                return Err(CacheError::unavailable("cache down"));
            }
            self.seed(api_key, permissions.clone());
            Ok(())
        }

        async fn invalidate(&self, api_key: &str) -> Result<(), CacheError> {
            self.invalidations.fetch_add(1, Ordering::SeqCst);
            self.entries.lock().unwrap().remove(api_key);
            Ok(())
        }
    }

    struct Fixture {
        svc: Service,
        store: Arc<MemStore>,
        cache: Arc<MemCache>,
    }

    fn fixture_with(catalog: ActionCatalog) -> Fixture {
        let store = Arc::new(MemStore::default());
        let cache = Arc::new(MemCache::default());
        let svc = Service::new(store.clone(), cache.clone(), catalog);
        Fixture { svc, store, cache }
    }

    fn fixture() -> Fixture {
        fixture_with(ActionCatalog::default())
    }

    fn set(pairs: &[(&str, &str)]) -> PermissionSet {
        pairs.iter().map(|(m, a)| Permission::new(*m, *a)).collect()
    }

    fn wire_code(e: DomainError) -> ErrorCode {
        PermissionsError::from(e).code()
    }

    #[tokio::test]
    async fn grant_then_check_allows() {
        let f = fixture();
        f.svc.grant("k1", "inventory", "read").await.unwrap();

        assert!(f.svc.check("k1", "inventory", "read").await.unwrap());
        assert!(!f.svc.check("k1", "inventory", "write").await.unwrap());
        assert!(!f.svc.check("k2", "inventory", "read").await.unwrap());
    }

    #[tokio::test]
    async fn grant_is_idempotent() {
        let f = fixture();
        f.svc.grant("k1", "inventory", "read").await.unwrap();
        f.svc.grant("k1", "inventory", "read").await.unwrap();

        let listed = f.svc.list("k1").await.unwrap();
        assert_eq!(listed, set(&[("inventory", "read")]));
    }

    #[tokio::test]
    async fn grant_refreshes_cache_with_full_set() {
        let f = fixture();
        f.svc.grant("k1", "inventory", "read").await.unwrap();
        f.svc.grant("k1", "billing", "write").await.unwrap();

        let cached = f.cache.entry("k1").unwrap();
        assert_eq!(cached.len(), 2);
        assert!(cached.contains("inventory", "read"));
        assert!(cached.contains("billing", "write"));
    }

    #[tokio::test]
    async fn revoke_then_check_denies() {
        let f = fixture();
        f.svc.grant("k1", "inventory", "read").await.unwrap();
        f.svc.revoke("k1", "inventory", "read").await.unwrap();

        assert!(!f.svc.check("k1", "inventory", "read").await.unwrap());
        assert!(f.cache.entry("k1").unwrap().is_empty());
    }

    #[tokio::test]
    async fn revoke_missing_is_permission_not_found() {
        let f = fixture();
        let err = f.svc.revoke("k1", "inventory", "read").await.unwrap_err();

        assert!(matches!(err, DomainError::PermissionNotFound { .. }));
        assert_eq!(wire_code(err), ErrorCode::PermissionNotFound);
    }

    #[tokio::test]
    async fn check_hit_skips_store() {
        let f = fixture();
        f.cache.seed("k1", set(&[("inventory", "read")]));

        assert!(f.svc.check("k1", "inventory", "read").await.unwrap());
        assert_eq!(f.store.reads(), 0);
    }

    #[tokio::test]
    async fn check_miss_populates_cache() {
        let f = fixture();
        f.store
            .grant(&Grant::new("k1", "inventory", "read"))
            .await
            .unwrap();

        assert!(f.svc.check("k1", "inventory", "read").await.unwrap());
        assert_eq!(f.store.reads(), 1);
        assert_eq!(f.cache.entry("k1"), Some(set(&[("inventory", "read")])));

        assert!(f.svc.check("k1", "inventory", "read").await.unwrap());
        assert_eq!(f.store.reads(), 1);
    }

    #[tokio::test]
    async fn unknown_key_lists_empty_and_caches_it() {
        let f = fixture();

        assert!(f.svc.list("nobody").await.unwrap().is_empty());
        assert_eq!(f.cache.entry("nobody"), Some(PermissionSet::new()));
    }

    #[tokio::test]
    #[traced_test]
    async fn cache_read_failure_falls_back_to_store() {
        let f = fixture();
        f.svc.grant("k1", "inventory", "read").await.unwrap();
        f.cache.broken_reads.store(true, Ordering::SeqCst);

        assert!(f.svc.check("k1", "inventory", "read").await.unwrap());
        assert_eq!(f.svc.list("k1").await.unwrap().len(), 1);
        assert!(logs_contain("Permission cache read failed"));
    }

    #[tokio::test]
    #[traced_test]
    async fn cache_write_failure_does_not_fail_grant() {
        let f = fixture();
        f.cache.seed("k1", PermissionSet::new());
        f.cache.broken_writes.store(true, Ordering::SeqCst);

        f.svc.grant("k1", "inventory", "read").await.unwrap();

        // Stale entry was dropped rather than left behind.
        assert_eq!(f.cache.entry("k1"), None);
        assert_eq!(f.cache.invalidations.load(Ordering::SeqCst), 1);
        assert!(logs_contain("Permission cache refresh failed"));

        f.cache.broken_writes.store(false, Ordering::SeqCst);
        assert!(f.svc.check("k1", "inventory", "read").await.unwrap());
    }

    #[tokio::test]
    #[traced_test]
    async fn store_reread_failure_after_grant_invalidates_entry() {
        let f = fixture();
        f.cache.seed("k1", set(&[("billing", "write")]));
        f.store.broken_lists.store(true, Ordering::SeqCst);

        f.svc.grant("k1", "inventory", "read").await.unwrap();

        assert_eq!(f.cache.entry("k1"), None);
        assert_eq!(f.cache.invalidations.load(Ordering::SeqCst), 1);
        assert!(logs_contain("Permission cache refresh failed"));

        // The write itself landed; the next read rebuilds the entry.
        f.store.broken_lists.store(false, Ordering::SeqCst);
        assert!(f.svc.check("k1", "inventory", "read").await.unwrap());
        assert_eq!(f.cache.entry("k1"), Some(set(&[("inventory", "read")])));
    }

    #[tokio::test]
    async fn store_failure_on_grant_is_db_error() {
        let f = fixture();
        f.store.go_down();

        let err = f.svc.grant("k1", "inventory", "read").await.unwrap_err();
        assert_eq!(wire_code(err), ErrorCode::DbError);
        assert_eq!(f.cache.entry("k1"), None);
    }

    #[tokio::test]
    async fn store_failure_on_miss_is_db_error() {
        let f = fixture();
        f.store.go_down();

        let err = f.svc.check("k1", "inventory", "read").await.unwrap_err();
        assert_eq!(wire_code(err), ErrorCode::DbError);
    }

    #[tokio::test]
    async fn cached_answer_survives_store_outage() {
        let f = fixture();
        f.svc.grant("k1", "inventory", "read").await.unwrap();
        f.store.go_down();

        assert!(f.svc.check("k1", "inventory", "read").await.unwrap());
    }

    #[tokio::test]
    async fn empty_fields_are_rejected_before_any_io() {
        let f = fixture();

        let err = f.svc.grant("", "inventory", "read").await.unwrap_err();
        assert!(matches!(
            &err,
            DomainError::Validation { message } if message == "Missing required field: apiKey"
        ));

        let err = f.svc.check("k1", "", "").await.unwrap_err();
        let expected = "Missing required fields: module, action";
        assert!(matches!(&err, DomainError::Validation { message } if message == expected));
        assert_eq!(wire_code(err), ErrorCode::InvalidPayload);

        assert!(f.svc.list("").await.is_err());
        assert!(f.svc.revoke("k1", "inventory", "").await.is_err());
        assert_eq!(f.store.reads(), 0);
        assert!(f.store.rows.lock().unwrap().is_empty());
        assert!(f.cache.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn second_list_is_served_from_cache() {
        let f = fixture();
        f.store
            .grant(&Grant::new("k1", "inventory", "read"))
            .await
            .unwrap();

        assert_eq!(f.svc.list("k1").await.unwrap().len(), 1);
        assert_eq!(f.store.reads(), 1);
        assert_eq!(f.svc.list("k1").await.unwrap().len(), 1);
        assert_eq!(f.store.reads(), 1);
    }

    #[tokio::test]
    async fn matching_is_exact() {
        let f = fixture();
        f.svc.grant("k1", "Inventory", "Read").await.unwrap();

        assert!(!f.svc.check("k1", "inventory", "read").await.unwrap());
        assert!(!f.svc.check("k1", "Inventory", "Read ").await.unwrap());
        assert!(f.svc.check("k1", "Inventory", "Read").await.unwrap());
    }

    #[tokio::test]
    async fn catalog_restricts_grant_only() {
        let mut actions = BTreeMap::new();
        actions.insert("inventory".to_owned(), vec!["read".to_owned()]);
        let f = fixture_with(ActionCatalog::from_config(&actions));

        let err = f.svc.grant("k1", "inventory", "write").await.unwrap_err();
        assert_eq!(wire_code(err), ErrorCode::InvalidPayload);
        let err = f.svc.grant("k1", "billing", "read").await.unwrap_err();
        assert_eq!(wire_code(err), ErrorCode::InvalidPayload);

        f.svc.grant("k1", "inventory", "read").await.unwrap();
        assert!(!f.svc.check("k1", "billing", "read").await.unwrap());
    }

    #[tokio::test]
    async fn keys_are_isolated() {
        let f = fixture();
        f.svc.grant("k1", "inventory", "read").await.unwrap();
        f.svc.grant("k2", "billing", "write").await.unwrap();
        f.svc.revoke("k2", "billing", "write").await.unwrap();

        assert_eq!(f.svc.list("k1").await.unwrap(), set(&[("inventory", "read")]));
        assert!(f.svc.list("k2").await.unwrap().is_empty());
    }
}
