use crate::app::config::TagsConfig;
use crate::app::lifecycle::context::StartupContext;
use crate::app::pipeline::capture::{CaptureContext, CaptureOutcome};
use crate::core::bootstrap::tags;
use crate::core::models::event::TrackEventRequest;
use crate::core::pipeline::{AsyncTask, Pipeline};
use crate::core::transport::client_context::ClientContext;
use crate::sample_or_attach_root_span;
use actix_web::http::{Method, StatusCode};
use actix_web::{App, HttpRequest, HttpResponse, HttpResponseBuilder, HttpServer, web};
use anyhow::{Error, anyhow};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::log::debug;
use tracing::{Instrument, info, instrument};

/// Path the emitter posts events to
pub const CAPTURE_PATH: &str = "/capture";

/// Capture bodies are open-shaped but not unbounded
const MAX_BODY_BYTES: usize = 64 * 1024;

pub struct AppState {
    pipeline: Arc<Pipeline<CaptureContext, Error>>,
    span_sample_rate: f32,
    tags: TagsConfig,
}

/// Capture responses are consumed cross-origin by funnel pages on
/// other domains, so every response from the route carries the
/// same permissive headers, error shapes included
fn with_cors(mut builder: HttpResponseBuilder) -> HttpResponseBuilder {
    builder
        .insert_header(("Access-Control-Allow-Origin", "*"))
        .insert_header(("Access-Control-Allow-Methods", "POST, OPTIONS"))
        .insert_header(("Access-Control-Allow-Headers", "Content-Type"));

    builder
}

async fn run_capture(
    request: TrackEventRequest,
    client: ClientContext,
    pipeline: Arc<Pipeline<CaptureContext, Error>>,
    span_sample_rate: f32,
) -> CaptureOutcome {
    let root_span = sample_or_attach_root_span!(
        span_sample_rate,
        "capture_request",
        event_name = %request.event_name,
    );

    let ctx = CaptureContext::new(request, client);

    let pipeline_result = pipeline.run(&ctx).instrument(root_span).await;

    match &pipeline_result {
        Ok(_) => debug!("Capture pipeline success"),
        Err(e) => debug!("Capture pipeline aborted: {}", e),
    }

    ctx.outcome.get().cloned().unwrap_or_else(|| {
        // A task failed before any outcome was recorded
        CaptureOutcome::Failed {
            message: match pipeline_result {
                Err(e) => e.to_string(),
                Ok(_) => "No capture outcome produced".to_string(),
            },
        }
    })
}

async fn capture_handler(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> HttpResponse {
    // Body decoding is done by hand: a missing event name must be
    // a clean 400 from the pipeline, while a body that is not even
    // an event shape is an internal error
    let request: TrackEventRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            return with_cors(HttpResponse::InternalServerError()).json(json!({
                "error": "Internal server error",
                "message": e.to_string(),
            }));
        }
    };

    let client = ClientContext::from_headers(req.headers());

    let outcome = run_capture(
        request,
        client,
        state.pipeline.clone(),
        state.span_sample_rate,
    )
    .await;

    match outcome {
        CaptureOutcome::Accepted {
            event_id,
            meta_response,
        } => with_cors(HttpResponse::Ok()).json(json!({
            "success": true,
            "event_id": event_id,
            "meta_response": meta_response,
        })),
        CaptureOutcome::Rejected { error } => {
            with_cors(HttpResponse::BadRequest()).json(json!({ "error": error }))
        }
        CaptureOutcome::UpstreamError { status, details } => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);

            with_cors(HttpResponse::build(status)).json(json!({
                "error": "Meta API error",
                "details": details,
            }))
        }
        CaptureOutcome::Failed { message } => {
            with_cors(HttpResponse::InternalServerError()).json(json!({
                "error": "Internal server error",
                "message": message,
            }))
        }
    }
}

/// Pre-flight succeeds with no body and no side effects
async fn preflight_handler() -> HttpResponse {
    with_cors(HttpResponse::Ok()).finish()
}

async fn method_not_allowed() -> HttpResponse {
    with_cors(HttpResponse::MethodNotAllowed()).json(json!({ "error": "Method not allowed" }))
}

/// Serves the third-party bootstrap snippets for host pages to
/// inline once at page load
async fn tags_handler(state: web::Data<AppState>) -> HttpResponse {
    let html = tags::bootstrap_fragment(
        &state.tags.gtm_container,
        &state.tags.utmify_pixel,
        state.tags.first_party_host.as_deref(),
    );

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html)
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/hi", web::get().to(|| async { "hi!" }))
        .route("/tags", web::get().to(tags_handler))
        .route(CAPTURE_PATH, web::post().to(capture_handler))
        .route(
            CAPTURE_PATH,
            web::method(Method::OPTIONS).to(preflight_handler),
        )
        .route(CAPTURE_PATH, web::route().to(method_not_allowed));
}

pub struct StartServerTask;

#[async_trait]
impl AsyncTask<StartupContext, anyhow::Error> for StartServerTask {
    #[instrument(skip_all, name = "start_server_task")]
    async fn run(&self, ctx: &StartupContext) -> Result<(), Error> {
        let cfg = ctx
            .config
            .get()
            .ok_or_else(|| anyhow!("Config not loaded before server start"))?;

        let pipeline = ctx
            .capture_pipeline
            .get()
            .ok_or_else(|| anyhow!("Capture pipeline not built before server start"))?
            .clone();

        let state = web::Data::new(AppState {
            pipeline,
            span_sample_rate: cfg.logging.span_sample_rate,
            tags: cfg.tags.clone(),
        });

        let http_port = cfg.server.http_port;

        let server = HttpServer::new(move || {
            App::new()
                .app_data(state.clone())
                .app_data(web::PayloadConfig::new(MAX_BODY_BYTES))
                .configure(configure_routes)
        })
        .bind(("0.0.0.0", http_port))
        .map_err(|e| anyhow!("Failed to bind http port {}: {}", http_port, e))?
        .run();

        ctx.server
            .set(server.handle())
            .map_err(|_| anyhow!("Could not set server handle"))?;

        actix_web::rt::spawn(server);

        info!("Started http server on port {}, ready for requests", http_port);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::capture::build_capture_pipeline;
    use crate::core::upstream::sink::testing::RecordingSink;
    use actix_web::test;
    use serde_json::Value;

    fn test_state(sink: Arc<RecordingSink>) -> web::Data<AppState> {
        web::Data::new(AppState {
            pipeline: Arc::new(build_capture_pipeline(sink).unwrap()),
            span_sample_rate: 0.0,
            tags: TagsConfig {
                gtm_container: "GTM-T8M558NG".into(),
                utmify_pixel: "683e4507be02a8b1bece6041".into(),
                first_party_host: None,
            },
        })
    }

    macro_rules! test_app {
        ($sink:expr) => {
            test::init_service(
                App::new()
                    .app_data(test_state($sink))
                    .configure(configure_routes),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn preflight_succeeds_empty_with_cors_headers() {
        let app = test_app!(RecordingSink::accepting());

        let req = test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri(CAPTURE_PATH)
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers().get("Access-Control-Allow-Origin").unwrap(),
            "*"
        );
        assert_eq!(
            res.headers().get("Access-Control-Allow-Methods").unwrap(),
            "POST, OPTIONS"
        );

        let body = test::read_body(res).await;
        assert!(body.is_empty());
    }

    #[actix_web::test]
    async fn disallowed_method_is_405() {
        let app = test_app!(RecordingSink::accepting());

        let req = test::TestRequest::get().uri(CAPTURE_PATH).to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[actix_web::test]
    async fn empty_body_is_400_with_no_forwarding() {
        let sink = RecordingSink::accepting();
        let app = test_app!(sink.clone());

        let req = test::TestRequest::post()
            .uri(CAPTURE_PATH)
            .set_json(json!({}))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(res).await;
        assert_eq!(body, json!({ "error": "event_name is required" }));
        assert_eq!(sink.delivery_count(), 0);
    }

    #[actix_web::test]
    async fn lead_event_is_captured_and_forwarded() {
        let sink = RecordingSink::accepting();
        let app = test_app!(sink.clone());

        let req = test::TestRequest::post()
            .uri(CAPTURE_PATH)
            .insert_header(("x-forwarded-for", "203.0.113.7"))
            .insert_header(("user-agent", "Mozilla/5.0"))
            .set_json(json!({
                "event_name": "Lead",
                "event_id": "evt_7_cafe",
                "user_data": { "email": "  Test@Example.com " },
            }))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);

        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["event_id"], "evt_7_cafe");
        assert_eq!(body["meta_response"], json!({ "events_received": 1 }));

        let sent = sink.deliveries.lock()[0].clone();
        assert_eq!(
            sent["data"][0]["user_data"]["em"],
            "973dfe463ec85785f5f95af5ba3906eedb2d931c24e69824a89ea65dba4e813b"
        );
        assert_eq!(sent["data"][0]["user_data"]["client_ip_address"], "203.0.113.7");
    }

    #[actix_web::test]
    async fn malformed_body_is_internal_error() {
        let sink = RecordingSink::accepting();
        let app = test_app!(sink.clone());

        let req = test::TestRequest::post()
            .uri(CAPTURE_PATH)
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["error"], "Internal server error");
        assert_eq!(sink.delivery_count(), 0);
    }

    #[actix_web::test]
    async fn upstream_rejection_passes_through() {
        let sink = RecordingSink::rejecting(400, json!({ "error": { "message": "bad param" } }));
        let app = test_app!(sink);

        let req = test::TestRequest::post()
            .uri(CAPTURE_PATH)
            .set_json(json!({ "event_name": "Purchase" }))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(res).await;
        assert_eq!(
            body,
            json!({
                "error": "Meta API error",
                "details": { "error": { "message": "bad param" } },
            })
        );
    }

    #[actix_web::test]
    async fn tags_route_serves_bootstrap_fragment() {
        let app = test_app!(RecordingSink::accepting());

        let req = test::TestRequest::get().uri("/tags").to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);

        let body = test::read_body(res).await;
        let html = std::str::from_utf8(&body).unwrap();

        assert!(html.contains("GTM-T8M558NG"));
        assert!(html.contains("683e4507be02a8b1bece6041"));
    }
}
