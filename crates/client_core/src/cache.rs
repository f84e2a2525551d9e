//! Shared request cache. Lists read through it; mutations invalidate the
//! affected keys and the next read refetches from the gateway.

use std::{fmt, future::Future, sync::Arc, time::Duration};

use moka::future::Cache;
use shared::{
    domain::EmployeeId,
    protocol::{ClientRanking, EvaluationItem, ProjectWithClientEvalStatus, Skill, StaffMember},
};
use tracing::debug;

use crate::error::{GatewayError, GatewayResult};

const MAX_ENTRIES: u64 = 256;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    CompletedProjects(EmployeeId),
    EvaluationItems,
    ClientRankings,
    Employees,
    /// Sorted, de-duplicated skill names.
    DeveloperSearch(Vec<String>),
    Skills,
}

impl QueryKey {
    pub fn is_roster(&self) -> bool {
        matches!(self, Self::Employees | Self::DeveloperSearch(_))
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CompletedProjects(id) => write!(f, "completed_projects/{id}"),
            Self::EvaluationItems => f.write_str("evaluation_items"),
            Self::ClientRankings => f.write_str("client_rankings"),
            Self::Employees => f.write_str("employees"),
            Self::DeveloperSearch(skills) => write!(f, "developer_search/{}", skills.join(",")),
            Self::Skills => f.write_str("skills"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum CachedValue {
    Projects(Arc<Vec<ProjectWithClientEvalStatus>>),
    Items(Arc<Vec<EvaluationItem>>),
    Rankings(Arc<Vec<ClientRanking>>),
    Roster(Arc<Vec<StaffMember>>),
    Skills(Arc<Vec<Skill>>),
}

/// Maps a query result type onto its `CachedValue` variant.
pub trait Cacheable: Sized + Send + Sync + 'static {
    fn wrap(value: Arc<Self>) -> CachedValue;
    fn unwrap(value: CachedValue) -> Option<Arc<Self>>;
}

macro_rules! cacheable {
    ($ty:ty, $variant:ident) => {
        impl Cacheable for $ty {
            fn wrap(value: Arc<Self>) -> CachedValue {
                CachedValue::$variant(value)
            }

            fn unwrap(value: CachedValue) -> Option<Arc<Self>> {
                match value {
                    CachedValue::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

cacheable!(Vec<ProjectWithClientEvalStatus>, Projects);
cacheable!(Vec<EvaluationItem>, Items);
cacheable!(Vec<ClientRanking>, Rankings);
cacheable!(Vec<StaffMember>, Roster);
cacheable!(Vec<Skill>, Skills);

#[derive(Clone)]
pub struct QueryCache {
    entries: Cache<QueryKey, CachedValue>,
}

impl QueryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Cache::builder()
                .time_to_live(ttl)
                .max_capacity(MAX_ENTRIES)
                .build(),
        }
    }

    /// Cached value for `key`, or the result of `fetch`. Concurrent callers
    /// for the same key share one fetch; failures are not cached.
    pub async fn get_or_fetch<T, F, Fut>(&self, key: QueryKey, fetch: F) -> GatewayResult<Arc<T>>
    where
        T: Cacheable,
        F: FnOnce() -> Fut,
        Fut: Future<Output = GatewayResult<T>>,
    {
        let label = key.to_string();
        let value = self
            .entries
            .try_get_with(key.clone(), async move {
                debug!(key = %label, "cache: miss");
                fetch().await.map(|value| T::wrap(Arc::new(value)))
            })
            .await
            .map_err(|err: Arc<GatewayError>| (*err).clone())?;
        T::unwrap(value).ok_or_else(|| type_mismatch(&key))
    }

    pub async fn peek<T: Cacheable>(&self, key: &QueryKey) -> Option<Arc<T>> {
        self.entries.get(key).await.and_then(T::unwrap)
    }

    pub async fn invalidate(&self, key: &QueryKey) {
        debug!(key = %key, "cache: invalidate");
        self.entries.invalidate(key).await;
    }

    pub async fn invalidate_where(&self, predicate: impl Fn(&QueryKey) -> bool) {
        let keys: Vec<QueryKey> = self
            .entries
            .iter()
            .filter(|(key, _)| predicate(key.as_ref()))
            .map(|(key, _)| (*key).clone())
            .collect();
        for key in keys {
            self.invalidate(&key).await;
        }
    }

    pub fn invalidate_all(&self) {
        self.entries.invalidate_all();
    }
}

fn type_mismatch(key: &QueryKey) -> GatewayError {
    GatewayError::Decode {
        endpoint: key.to_string(),
        message: "cached value has an unexpected type".to_string(),
    }
}

#[cfg(test)]
#[path = "tests/cache_tests.rs"]
mod tests;
