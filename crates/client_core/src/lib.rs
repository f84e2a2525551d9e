use std::sync::Arc;

use shared::domain::EmployeeId;

pub mod cache;
pub mod config;
pub mod directory;
pub mod error;
pub mod evaluation;
pub mod gateway;
pub mod navigation;
pub mod notify;
pub mod staffing;

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;

pub use cache::{QueryCache, QueryKey};
pub use config::Settings;
pub use error::{GatewayError, GatewayResult};
pub use gateway::{DataGateway, HttpGateway, InMemoryGateway};
pub use navigation::{EvaluationContext, Route};
pub use notify::{Notice, NoticeLevel, Notifier};

/// Everything a page controller needs: the injected gateway, the shared
/// request cache, the notice channel and the acting employee.
#[derive(Clone)]
pub struct ClientContext {
    pub gateway: Arc<dyn DataGateway>,
    pub cache: QueryCache,
    pub notifier: Notifier,
    pub employee_id: EmployeeId,
}

impl ClientContext {
    pub fn new(gateway: Arc<dyn DataGateway>, settings: &Settings) -> Self {
        Self {
            gateway,
            cache: QueryCache::new(settings.cache_ttl()),
            notifier: Notifier::new(),
            employee_id: settings.employee_id,
        }
    }

    pub fn over_http(settings: &Settings) -> GatewayResult<Self> {
        let gateway = HttpGateway::new(&settings.api_base_url)?;
        Ok(Self::new(Arc::new(gateway), settings))
    }
}
