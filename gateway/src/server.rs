//! Router assembly: routes plus the transport middleware every route shares.
//!
//! Layers, outermost first: CORS, hardening headers, panic capture. Panic
//! responses therefore still carry the CORS and hardening headers.

use std::any::Any;

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use axum::response::Response;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{self, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::dispatch::GatewayError;
use crate::envelope::{StatusPolicy, failure};
use crate::routes::{self, AppState};

fn hardening_headers() -> [(HeaderName, &'static str); 5] {
    [
        (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        (header::X_FRAME_OPTIONS, "SAMEORIGIN"),
        (header::X_DNS_PREFETCH_CONTROL, "off"),
        (header::REFERRER_POLICY, "no-referrer"),
        (
            header::STRICT_TRANSPORT_SECURITY,
            "max-age=15552000; includeSubDomains",
        ),
    ]
}

/// Builds the full application router.
pub fn app(state: AppState) -> Router {
    let policy = state.policy;
    with_middleware(routes::routes().with_state(state), policy)
}

fn with_middleware(router: Router, policy: StatusPolicy) -> Router {
    let mut router = router.layer(CatchPanicLayer::custom(
        move |_: Box<dyn Any + Send + 'static>| panic_response(policy),
    ));
    for (name, value) in hardening_headers() {
        router = router.layer(SetResponseHeaderLayer::if_not_present(
            name,
            HeaderValue::from_static(value),
        ));
    }
    router.layer(
        CorsLayer::new()
            .allow_origin(cors::Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(cors::Any),
    )
}

fn panic_response(policy: StatusPolicy) -> Response {
    tracing::error!("request handler panicked");
    failure(
        policy,
        &GatewayError::Internal("request handler panicked".to_owned()),
    )
}
