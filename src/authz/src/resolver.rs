//! Role-based permission resolution with a TTL cache.
//!
//! The cache is pull-based and lazily refreshed: a resolved permission set is
//! reused until its age exceeds the TTL, so role/permission edits take up to
//! the TTL to become visible. That propagation delay is an accepted trade
//! against store load, not a bug. Entries expire on read; there is no
//! background eviction.

use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::error::Result;
use crate::role::{RoleStore, MANAGE_ACTION};
use crate::types::Principal;

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Time-to-live for resolved permission sets
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
        }
    }
}

/// Cached permission set with its fetch timestamp
#[derive(Clone)]
struct CachedEntry {
    permissions: Arc<HashSet<String>>,
    fetched_at: Instant,
}

impl CachedEntry {
    fn new(permissions: Arc<HashSet<String>>) -> Self {
        Self {
            permissions,
            fetched_at: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() >= ttl
    }
}

/// Cache statistics snapshot
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    pub entries: usize,
}

/// Resolves a principal's roles to permission sets and answers
/// resource:action queries.
///
/// The cache is the one piece of process-wide shared mutable state in the
/// pipeline; `DashMap` keeps concurrent reads and population safe without an
/// outer lock.
pub struct PermissionResolver {
    store: Arc<dyn RoleStore>,
    cache: DashMap<String, CachedEntry>,
    config: CacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
    expirations: AtomicU64,
}

impl PermissionResolver {
    pub fn new(store: Arc<dyn RoleStore>) -> Self {
        Self::with_config(store, CacheConfig::default())
    }

    pub fn with_config(store: Arc<dyn RoleStore>, config: CacheConfig) -> Self {
        Self {
            store,
            cache: DashMap::new(),
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            expirations: AtomicU64::new(0),
        }
    }

    /// Whether any of the principal's roles grants `resource:action`.
    ///
    /// A `{resource}:manage` grant covers every action on the resource. The
    /// check short-circuits across roles on the first grant and fails closed:
    /// no grant means `Ok(false)`, and a store failure propagates as an error
    /// rather than becoming a decision.
    pub async fn check_permission(
        &self,
        principal: &Principal,
        resource: &str,
        action: &str,
    ) -> Result<bool> {
        let grant = format!("{resource}:{action}");
        let wildcard = format!("{resource}:{MANAGE_ACTION}");

        for role in &principal.roles {
            let permissions = self.resolve_role(&principal.tenant_id, role).await?;
            if permissions.contains(&grant) || permissions.contains(&wildcard) {
                debug!("role '{}' grants {}", role, grant);
                return Ok(true);
            }
        }

        debug!(
            "no role of user '{}' grants {}",
            principal.user_id, grant
        );
        Ok(false)
    }

    /// Resolve one role's permission set, consulting the cache first.
    async fn resolve_role(&self, tenant_id: &str, role: &str) -> Result<Arc<HashSet<String>>> {
        let key = format!("{tenant_id}:{role}");

        if let Some(entry) = self.cache.get(&key) {
            if !entry.is_expired(self.config.ttl) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(entry.permissions.clone());
            }
            drop(entry);
            self.cache.remove(&key);
            self.expirations.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }

        let permissions = Arc::new(self.fetch_permissions(tenant_id, role).await?);
        self.cache
            .insert(key, CachedEntry::new(permissions.clone()));
        Ok(permissions)
    }

    async fn fetch_permissions(&self, tenant_id: &str, role: &str) -> Result<HashSet<String>> {
        let Some(role_record) = self.store.find_role(tenant_id, role).await? else {
            debug!("role '{}' not found in tenant '{}', grants nothing", role, tenant_id);
            return Ok(HashSet::new());
        };

        Ok(role_record
            .permissions
            .iter()
            .map(|p| format!("{}:{}", p.resource, p.action))
            .collect())
    }

    /// Drop every cached permission set, forcing fresh fetches.
    ///
    /// For callers that cannot wait out the TTL after a bulk role change.
    pub fn invalidate(&self) {
        self.cache.clear();
    }

    /// Cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            entries: self.cache.len(),
        }
    }
}
