//! Per-resource reads and mutations.
//!
//! Reads go through the shared [`QueryCache`]; mutations go straight to the
//! gateway and, once they succeed, invalidate the keys whose data they
//! changed. A failed mutation invalidates nothing.

pub mod attendance;
pub mod documents;
pub mod employees;
pub mod leave_requests;
pub mod payroll;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::cache::{QueryCache, Resource};
use crate::error::{HrmError, Result};
use crate::gateway::{Gateway, GatewayError};
use crate::model::payroll::PayrollPolicy;

/// Object-storage buckets for employee binaries.
#[derive(Debug, Clone)]
pub struct Buckets {
    pub avatars: String,
    pub documents: String,
}

impl Default for Buckets {
    fn default() -> Self {
        Self {
            avatars: "employee-avatars".into(),
            documents: "employee-documents".into(),
        }
    }
}

/// Everything a resource operation needs: the remote store, the shared
/// cache, and a little configuration.
pub struct DataContext {
    gateway: Arc<dyn Gateway>,
    cache: QueryCache,
    buckets: Buckets,
    payroll_policy: PayrollPolicy,
}

impl DataContext {
    pub fn new(gateway: Arc<dyn Gateway>, cache: QueryCache) -> Self {
        Self {
            gateway,
            cache,
            buckets: Buckets::default(),
            payroll_policy: PayrollPolicy::default(),
        }
    }

    pub fn with_buckets(mut self, buckets: Buckets) -> Self {
        self.buckets = buckets;
        self
    }

    pub fn with_payroll_policy(mut self, policy: PayrollPolicy) -> Self {
        self.payroll_policy = policy;
        self
    }

    pub fn gateway(&self) -> &dyn Gateway {
        self.gateway.as_ref()
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn buckets(&self) -> &Buckets {
        &self.buckets
    }

    pub fn payroll_policy(&self) -> PayrollPolicy {
        self.payroll_policy
    }

    pub(crate) async fn invalidate(&self, resources: &[Resource]) {
        for resource in resources {
            debug!(%resource, "Invalidating after mutation");
            self.cache.invalidate_resource(*resource).await;
        }
    }
}

/// Decodes the row a by-id write returned, or reports the id as unknown.
pub(crate) fn single<T: DeserializeOwned>(
    rows: Vec<Value>,
    resource: &'static str,
    id: &str,
) -> Result<T> {
    let row = rows
        .into_iter()
        .next()
        .ok_or_else(|| HrmError::not_found(resource, id))?;
    Ok(serde_json::from_value(row).map_err(GatewayError::from)?)
}
