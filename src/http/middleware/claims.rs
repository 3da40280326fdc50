//! Claim header middleware.
//! Runs the claims pipeline on every request before it is forwarded.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};

use crate::http::response::Rejection;
use crate::observability::metrics;
use crate::pipeline::{ClaimsPipeline, Outcome};
use crate::security::headers::Injection;

/// Mount the claims middleware on `router`.
pub fn apply(router: Router, pipeline: Arc<ClaimsPipeline>) -> Router {
    router.layer(middleware::from_fn_with_state(pipeline, claims_middleware))
}

pub async fn claims_middleware(
    State(pipeline): State<Arc<ClaimsPipeline>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let outcome = pipeline.process(req.headers_mut());

    metrics::record_outcome(&outcome);
    log_outcome(&pipeline, &outcome);

    if let Outcome::Reject(err) = &outcome {
        return Rejection::from(err).into_response();
    }
    drop(outcome);

    next.run(req).await
}

fn log_outcome(pipeline: &ClaimsPipeline, outcome: &Outcome<'_>) {
    let config = pipeline.config();

    match outcome {
        Outcome::Processed(report) => {
            for entry in &report.mappings {
                let path = entry.mapping.path.as_str();
                let header = entry.mapping.header.as_str();

                match &entry.result {
                    Ok(Injection::Inserted | Injection::Replaced) => {
                        tracing::debug!(claim = %path, header = %header, section = ?entry.section, "Injected header");
                    }
                    Ok(Injection::Preserved) => {
                        tracing::debug!(header = %header, "Header already set, preserving existing value");
                    }
                    Ok(Injection::Protected) => {
                        tracing::debug!(header = %header, "Skipped protected header");
                    }
                    Err(err) if err.is_unresolved() && !config.log_missing_claims => {
                        tracing::debug!(claim = %path, error = %err, "Claim not resolved");
                    }
                    Err(err) => {
                        tracing::warn!(claim = %path, header = %header, error = %err, "Claim mapping skipped");
                    }
                }
            }
            if report.source_removed {
                tracing::debug!(header = %config.source_header, "Removed source header");
            }
        }
        Outcome::PassThrough(err) => {
            tracing::warn!(error = %err, "Credential error, forwarding request unmodified");
        }
        Outcome::Reject(err) => {
            tracing::warn!(error = %err, "Credential error, rejecting request");
        }
    }
}
