use std::sync::Arc;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::cache::CacheKey;
use crate::gateway::GatewayError;
use crate::model::leave_request::LeaveStatus;
use crate::model::payroll::PayPeriod;

pub type Result<T, E = HrmError> = std::result::Result<T, E>;

/// Every failure the sync layer can surface. None of them is fatal to the
/// process; callers decide how to present them.
#[derive(Debug, Error)]
pub enum HrmError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Caught before any gateway call; the operation was never issued.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{resource} `{id}` not found")]
    NotFound { resource: &'static str, id: String },

    #[error("leave request `{id}` is {from}, only Pending requests can become {to}")]
    InvalidTransition {
        id: String,
        from: LeaveStatus,
        to: LeaveStatus,
    },

    #[error("payroll for {0} has already been generated")]
    PeriodAlreadyGenerated(PayPeriod),

    #[error("view was unmounted before `{0}` resolved")]
    Cancelled(CacheKey),

    /// A fetch failure shared by every reader that was coalesced onto it.
    #[error("fetching `{key}` failed: {source}")]
    Fetch {
        key: CacheKey,
        #[source]
        source: Arc<HrmError>,
    },

    #[error("export failed: {0}")]
    Export(String),

    #[error("preferences: {0}")]
    Preferences(String),
}

impl HrmError {
    pub fn validation(msg: impl Into<String>) -> Self {
        HrmError::Validation(msg.into())
    }

    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        HrmError::NotFound {
            resource,
            id: id.into(),
        }
    }

    /// Looks through shared fetch failures to the error that caused them.
    pub fn root(&self) -> &HrmError {
        match self {
            HrmError::Fetch { source, .. } => source.root(),
            other => other,
        }
    }
}

impl ResponseError for HrmError {
    fn status_code(&self) -> StatusCode {
        match self.root() {
            HrmError::Validation(_) => StatusCode::BAD_REQUEST,
            HrmError::NotFound { .. } => StatusCode::NOT_FOUND,
            HrmError::InvalidTransition { .. } | HrmError::PeriodAlreadyGenerated(_) => {
                StatusCode::CONFLICT
            }
            HrmError::Gateway(GatewayError::NotFound(_)) => StatusCode::NOT_FOUND,
            HrmError::Gateway(GatewayError::Conflict(_)) => StatusCode::CONFLICT,
            HrmError::Gateway(_) => StatusCode::BAD_GATEWAY,
            // client closed request
            HrmError::Cancelled(_) => {
                StatusCode::from_u16(499).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            HrmError::Fetch { .. } | HrmError::Export(_) | HrmError::Preferences(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        HttpResponse::build(status).json(json!({
            "message": self.root().to_string()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheKey, Resource};

    #[test]
    fn shared_fetch_failure_maps_to_root_status() {
        let err = HrmError::Fetch {
            key: CacheKey::of(Resource::Employees),
            source: Arc::new(HrmError::Gateway(GatewayError::Api {
                status: 500,
                message: "boom".into(),
            })),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn invalid_transition_is_conflict() {
        let err = HrmError::InvalidTransition {
            id: "l-1".into(),
            from: LeaveStatus::Approved,
            to: LeaveStatus::Rejected,
        };
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            err.to_string(),
            "leave request `l-1` is Approved, only Pending requests can become Rejected"
        );
    }

    #[test]
    fn validation_is_bad_request() {
        assert_eq!(
            HrmError::validation("email is required").status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
