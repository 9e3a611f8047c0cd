//! Cache operation handlers - one thin delegation per repository operation.

use actix_web::{HttpResponse, web};

use cachet_core::Outcome;
use cachet_shared::dto::{
    DeleteRequest, DeleteResponse, ExistsRequest, ExistsResponse, ExpireRequest, ExpireResponse,
    GetRequest, GetResponse, SetRequest, SetResponse,
};

use crate::middleware::context::CallContext;
use crate::middleware::error::{RpcError, RpcResult};
use crate::state::AppState;

/// POST /api/cache/set
pub async fn set(
    state: web::Data<AppState>,
    ctx: CallContext,
    body: web::Json<SetRequest>,
) -> RpcResult<HttpResponse> {
    let req = body.into_inner();
    tracing::debug!(
        request_id = %ctx.request_id,
        key = %req.key,
        ttl_seconds = req.ttl_seconds,
        "Set"
    );

    state
        .repo
        .set(&req.key, &req.value, req.ttl_seconds, ctx.deadline)
        .await
        .map_err(|e| RpcError::from_cache("set", e))?;

    Ok(HttpResponse::Ok().json(SetResponse {
        success: true,
        message: "OK".to_string(),
    }))
}

/// POST /api/cache/get
pub async fn get(
    state: web::Data<AppState>,
    ctx: CallContext,
    body: web::Json<GetRequest>,
) -> RpcResult<HttpResponse> {
    let req = body.into_inner();
    tracing::debug!(request_id = %ctx.request_id, key = %req.key, "Get");

    let outcome = state
        .repo
        .get(&req.key, ctx.deadline)
        .await
        .map_err(|e| RpcError::from_cache("get", e))?;

    let response = match outcome {
        Outcome::Success(value) => GetResponse { found: true, value },
        Outcome::NotFound => GetResponse {
            found: false,
            value: String::new(),
        },
    };

    Ok(HttpResponse::Ok().json(response))
}

/// POST /api/cache/delete
pub async fn delete(
    state: web::Data<AppState>,
    ctx: CallContext,
    body: web::Json<DeleteRequest>,
) -> RpcResult<HttpResponse> {
    let req = body.into_inner();
    tracing::debug!(request_id = %ctx.request_id, key = %req.key, "Delete");

    state
        .repo
        .delete(&req.key, ctx.deadline)
        .await
        .map_err(|e| RpcError::from_cache("delete", e))?;

    Ok(HttpResponse::Ok().json(DeleteResponse { success: true }))
}

/// POST /api/cache/exists
pub async fn exists(
    state: web::Data<AppState>,
    ctx: CallContext,
    body: web::Json<ExistsRequest>,
) -> RpcResult<HttpResponse> {
    let req = body.into_inner();
    tracing::debug!(request_id = %ctx.request_id, key = %req.key, "Exists");

    let exists = state
        .repo
        .exists(&req.key, ctx.deadline)
        .await
        .map_err(|e| RpcError::from_cache("check existence", e))?;

    Ok(HttpResponse::Ok().json(ExistsResponse { exists }))
}

/// POST /api/cache/expire
pub async fn expire(
    state: web::Data<AppState>,
    ctx: CallContext,
    body: web::Json<ExpireRequest>,
) -> RpcResult<HttpResponse> {
    let req = body.into_inner();
    tracing::debug!(
        request_id = %ctx.request_id,
        key = %req.key,
        ttl_seconds = req.ttl_seconds,
        "Expire"
    );

    let outcome = state
        .repo
        .expire(&req.key, req.ttl_seconds, ctx.deadline)
        .await
        .map_err(|e| RpcError::from_cache("expire", e))?;

    Ok(HttpResponse::Ok().json(ExpireResponse {
        success: outcome.is_found(),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use actix_web::{App, http::StatusCode, test, web};
    use serde_json::{Value, json};

    use cachet_core::CacheRepository;
    use cachet_infra::InMemoryBackend;
    use cachet_shared::{RpcCode, RpcStatus};

    use crate::handlers::{configure_routes, json_config};
    use crate::middleware::context::{REQUEST_ID_HEADER, RequestContextMiddleware};
    use crate::state::AppState;

    fn test_state() -> AppState {
        let repo = CacheRepository::new(Arc::new(InMemoryBackend::new()), Duration::from_secs(5));
        AppState::new(Arc::new(repo))
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .wrap(RequestContextMiddleware)
                    .app_data(web::Data::new($state))
                    .app_data(json_config())
                    .configure(configure_routes),
            )
            .await
        };
    }

    macro_rules! call {
        ($app:expr, $path:expr, $body:expr) => {{
            let req = test::TestRequest::post()
                .uri($path)
                .set_json($body)
                .to_request();
            let value: Value = test::call_and_read_body_json(&$app, req).await;
            value
        }};
    }

    #[actix_web::test]
    async fn test_user_lifecycle_scenario() {
        let app = app!(test_state());

        let body = json!({"key": "user:42", "value": "alice", "ttl_seconds": 60});
        let set = call!(app, "/api/cache/set", body);
        assert_eq!(set, json!({"success": true, "message": "OK"}));

        let get = call!(app, "/api/cache/get", json!({"key": "user:42"}));
        assert_eq!(get, json!({"found": true, "value": "alice"}));

        let exists = call!(app, "/api/cache/exists", json!({"key": "user:42"}));
        assert_eq!(exists, json!({"exists": true}));

        let delete = call!(app, "/api/cache/delete", json!({"key": "user:42"}));
        assert_eq!(delete, json!({"success": true}));

        let get = call!(app, "/api/cache/get", json!({"key": "user:42"}));
        assert_eq!(get["found"], false);

        // Second delete of the same key is still a success.
        let delete = call!(app, "/api/cache/delete", json!({"key": "user:42"}));
        assert_eq!(delete, json!({"success": true}));
    }

    #[actix_web::test]
    async fn test_missing_key_is_found_false_not_error() {
        let app = app!(test_state());

        let get = call!(app, "/api/cache/get", json!({"key": "never-set"}));
        assert_eq!(get, json!({"found": false, "value": ""}));

        let exists = call!(app, "/api/cache/exists", json!({"key": "never-set"}));
        assert_eq!(exists, json!({"exists": false}));

        let body = json!({"key": "never-set", "ttl_seconds": 10});
        let expire = call!(app, "/api/cache/expire", body);
        assert_eq!(expire, json!({"success": false}));
    }

    #[actix_web::test]
    async fn test_empty_key_is_invalid_argument() {
        let app = app!(test_state());

        for path in ["/api/cache/set", "/api/cache/get", "/api/cache/delete", "/api/cache/exists"] {
            let req = test::TestRequest::post()
                .uri(path)
                .set_json(json!({"key": "", "value": "v"}))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{path}");

            let status: RpcStatus = test::read_body_json(resp).await;
            assert_eq!(status.code, RpcCode::InvalidArgument);
        }
    }

    #[actix_web::test]
    async fn test_absent_key_field_is_invalid_argument() {
        let app = app!(test_state());

        let req = test::TestRequest::post()
            .uri("/api/cache/get")
            .set_json(json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_malformed_body_is_invalid_argument() {
        let app = app!(test_state());

        let req = test::TestRequest::post()
            .uri("/api/cache/set")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let status: RpcStatus = test::read_body_json(resp).await;
        assert_eq!(status.code, RpcCode::InvalidArgument);
    }

    #[actix_web::test]
    async fn test_closed_repository_is_unavailable() {
        let state = test_state();
        state.repo.close().await;
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/cache/get")
            .set_json(json!({"key": "user:42"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let status: RpcStatus = test::read_body_json(resp).await;
        assert_eq!(status.code, RpcCode::Unavailable);
        assert!(status.message.starts_with("failed to get"));
    }

    #[actix_web::test]
    async fn test_request_id_is_echoed() {
        let app = app!(test_state());

        let req = test::TestRequest::post()
            .uri("/api/cache/exists")
            .insert_header((REQUEST_ID_HEADER, "trace-me"))
            .set_json(json!({"key": "k"}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get(REQUEST_ID_HEADER).unwrap(), "trace-me");
    }

    #[actix_web::test]
    async fn test_bad_timeout_header_is_invalid_argument() {
        let app = app!(test_state());

        let req = test::TestRequest::post()
            .uri("/api/cache/get")
            .insert_header(("x-request-timeout-ms", "soon"))
            .set_json(json!({"key": "k"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
