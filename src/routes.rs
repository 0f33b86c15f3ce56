use crate::{
    api::{attendance, health},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::web;

/// Prefix of every attendance route; the OpenAPI paths use the same value.
pub const API_PREFIX: &str = "/v1";

/// Per-IP limiter allowing `requests_per_min` with the same burst size.
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg: GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware> = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_default();
    Governor::new(&cfg)
}

/// Attendance resources, relative to the API prefix.
pub fn attendance_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(attendance::json_config())
        // /checkin
        .service(web::resource("/checkin").route(web::post().to(attendance::check_in)))
        // /checkout/{record_id}
        .service(
            web::resource("/checkout/{record_id}").route(web::put().to(attendance::check_out)),
        )
        // /attendance
        .service(
            web::resource("/attendance").route(web::get().to(attendance::get_all_attendance)),
        )
        // /attendance/{user_id}
        .service(
            web::resource("/attendance/{user_id}")
                .route(web::get().to(attendance::get_attendance)),
        );
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    cfg.service(web::resource("/health").route(web::get().to(health::health)));

    cfg.service(
        web::scope(API_PREFIX)
            .wrap(build_limiter(config.rate_per_min)) // rate limiting
            .configure(attendance_routes),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limiter_builds_for_any_rate() {
        for rate in [0, 1, 60, 1000, 120_000] {
            let _ = build_limiter(rate);
        }
    }
}
