use std::sync::Arc;

use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{Scope, web};
use anyhow::Context;

use crate::api::{attendance, dashboard, document, employee, leave_request, payroll, settings};

pub type ApiLimiter = Governor<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-peer-IP limiter allowing `requests_per_min` with an equal burst.
pub fn build_limiter(requests_per_min: u32) -> anyhow::Result<ApiLimiter> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .context("invalid rate limit configuration")?;
    Ok(Governor::new(&cfg))
}

pub fn configure(cfg: &mut web::ServiceConfig, api_prefix: &str, limiter: Arc<ApiLimiter>) {
    cfg.service(api(api_prefix).wrap(limiter));
}

/// Every API route under `prefix`, without rate limiting.
pub fn api(prefix: &str) -> Scope {
    web::scope(prefix)
        .service(
            web::scope("/employees")
                // /employees
                .service(
                    web::resource("")
                        .route(web::get().to(employee::list_employees))
                        .route(web::post().to(employee::create_employee)),
                )
                // /employees/{id}
                .service(
                    web::resource("/{id}")
                        .route(web::get().to(employee::get_employee))
                        .route(web::put().to(employee::update_employee))
                        .route(web::delete().to(employee::delete_employee)),
                )
                // /employees/{id}/avatar
                .service(
                    web::resource("/{id}/avatar").route(web::post().to(employee::upload_avatar)),
                ),
        )
        .service(
            web::scope("/attendance")
                .service(
                    web::resource("")
                        .route(web::get().to(attendance::list_attendance))
                        .route(web::post().to(attendance::record_attendance)),
                )
                .service(
                    web::resource("/mark-daily").route(web::post().to(attendance::mark_daily)),
                )
                .service(
                    web::resource("/summary").route(web::get().to(attendance::attendance_summary)),
                ),
        )
        .service(
            web::scope("/leave")
                .service(web::resource("").route(web::get().to(leave_request::leave_list)))
                // /leave/{id}/approve
                .service(
                    web::resource("/{id}/approve")
                        .route(web::put().to(leave_request::approve_leave)),
                )
                // /leave/{id}/reject
                .service(
                    web::resource("/{id}/reject").route(web::put().to(leave_request::reject_leave)),
                ),
        )
        .service(
            web::scope("/payroll")
                .service(web::resource("").route(web::get().to(payroll::list_payrolls)))
                .service(
                    web::resource("/generate").route(web::post().to(payroll::generate_payroll)),
                ),
        )
        .service(
            web::scope("/documents")
                .service(web::resource("").route(web::get().to(document::list_documents)))
                .service(
                    web::resource("/{id}/download")
                        .route(web::get().to(document::download_document)),
                ),
        )
        .service(web::resource("/dashboard").route(web::get().to(dashboard::dashboard)))
        .service(
            web::scope("/reports")
                // must precede /{kind}
                .service(
                    web::resource("/departments")
                        .route(web::get().to(dashboard::department_analytics)),
                )
                .service(web::resource("/{kind}").route(web::get().to(dashboard::download_report))),
        )
        .service(
            web::resource("/preferences")
                .route(web::get().to(settings::get_preferences))
                .route(web::put().to(settings::update_preferences)),
        )
        .service(web::resource("/cache").route(web::get().to(settings::cache_status)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0)]
    #[case(60)]
    #[case(120_000)]
    fn limiter_builds_for_any_rate(#[case] per_min: u32) {
        assert!(build_limiter(per_min).is_ok());
    }
}
