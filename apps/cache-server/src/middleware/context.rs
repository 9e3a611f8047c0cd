//! Request context middleware - request IDs and caller deadlines.

use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header::{HeaderMap, HeaderName, HeaderValue},
};
use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::time::Duration;

use cachet_core::Deadline;
use tracing::Instrument;
use uuid::Uuid;

use super::error::RpcError;

/// Header carrying the request ID, generated when the client sends none.
pub static REQUEST_ID_HEADER: &str = "x-request-id";

/// Header carrying the caller's time budget in milliseconds.
pub static REQUEST_TIMEOUT_HEADER: &str = "x-request-timeout-ms";

/// Per-request data handed to every handler.
#[derive(Debug, Clone)]
pub struct CallContext {
    pub request_id: String,
    /// Starts counting when the request enters the middleware.
    pub deadline: Deadline,
}

/// What the middleware stored; the deadline header may have been malformed.
#[derive(Debug, Clone)]
struct ParsedContext {
    request_id: String,
    deadline: Result<Deadline, String>,
}

impl ParsedContext {
    fn from_headers(headers: &HeaderMap) -> Self {
        let request_id = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(String::from)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Self {
            request_id,
            deadline: parse_deadline(headers),
        }
    }
}

fn parse_deadline(headers: &HeaderMap) -> Result<Deadline, String> {
    let Some(raw) = headers.get(REQUEST_TIMEOUT_HEADER) else {
        return Ok(Deadline::none());
    };

    let millis = raw
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .ok_or_else(|| format!("{REQUEST_TIMEOUT_HEADER} must be a positive integer"))?;

    Ok(Deadline::after(Duration::from_millis(millis)))
}

/// Middleware that assigns a request ID and starts the caller's deadline clock.
/// The ID is echoed in the response headers and recorded on a tracing span.
pub struct RequestContextMiddleware;

impl<S, B> Transform<S, ServiceRequest> for RequestContextMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RequestContextService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestContextService { service }))
    }
}

pub struct RequestContextService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestContextService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let parsed = ParsedContext::from_headers(req.headers());
        let request_id = parsed.request_id.clone();
        req.extensions_mut().insert(parsed);

        let span = tracing::info_span!("call", request_id = %request_id);
        let fut = {
            let _guard = span.enter();
            self.service.call(req)
        };

        Box::pin(
            async move {
                let mut res = fut.await?;

                res.headers_mut().insert(
                    HeaderName::from_static(REQUEST_ID_HEADER),
                    HeaderValue::from_str(&request_id)
                        .unwrap_or_else(|_| HeaderValue::from_static("unknown")),
                );

                Ok(res)
            }
            .instrument(span),
        )
    }
}

/// Extractor for handlers. Works with or without the middleware installed;
/// without it the deadline starts at extraction time.
impl actix_web::FromRequest for CallContext {
    type Error = RpcError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &actix_web::HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let parsed = req
            .extensions()
            .get::<ParsedContext>()
            .cloned()
            .unwrap_or_else(|| ParsedContext::from_headers(req.headers()));

        ready(match parsed.deadline {
            Ok(deadline) => Ok(CallContext {
                request_id: parsed.request_id,
                deadline,
            }),
            Err(reason) => Err(RpcError::InvalidArgument(reason)),
        })
    }
}
