use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Json},
    routing::{get, post},
};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::{OpenApi, ToSchema};

use report_core::constants::DOCX_MIME_TYPE;
use report_core::{CoreConfig, ExportRequest, Exporter, ReportError, resolve_output_dir};

/// Application state shared across REST API handlers
#[derive(Clone)]
struct AppState {
    exporter: Exporter,
}

#[derive(Serialize, ToSchema)]
struct HealthRes {
    ok: bool,
    message: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(health, export_document, export_narrative),
    components(schemas(HealthRes))
)]
struct ApiDoc;

/// Main entry point for the report export service
///
/// # Environment Variables
/// - `REPORT_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `REPORT_OUTPUT_DIR`: Directory for persisted artefacts (default: "exports")
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("report=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("REPORT_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let output_dir = resolve_output_dir(std::env::var_os("REPORT_OUTPUT_DIR").map(Into::into))?;
    let exporter = Exporter::new(CoreConfig::new(output_dir)?);

    tracing::info!("++ Starting report REST on {}", rest_addr);

    let app = Router::new()
        .route("/health", get(health))
        .route("/reports/document", post(export_document))
        .route("/reports/narrative", post(export_narrative))
        .route("/api-docs/openapi.json", get(openapi))
        .layer(CorsLayer::permissive())
        .with_state(AppState { exporter });

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn error_response(e: ReportError) -> (StatusCode, &'static str) {
    match e {
        ReportError::InvalidInput(_)
        | ReportError::JsonDeserialization(_)
        | ReportError::YamlDeserialization(_) => {
            tracing::warn!("Rejected export request: {}", e);
            (StatusCode::BAD_REQUEST, "Invalid export request")
        }
        other => {
            tracing::error!("Export error: {:?}", other);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        }
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
async fn health() -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "report export service is alive".into(),
    })
}

#[utoipa::path(
    post,
    path = "/reports/document",
    responses(
        (status = 200, description = "Word-processing letter package"),
        (status = 400, description = "Bad request"),
        (status = 500, description = "Internal server error")
    )
)]
/// Build a letter document from an export request
///
/// Malformed or invalid requests are answered with 400. Responds with the complete
/// package bytes once synthesis has finished.
async fn export_document(
    State(state): State<AppState>,
    body: String,
) -> Result<impl IntoResponse, (StatusCode, &'static str)> {
    let req = ExportRequest::from_json_str(&body).map_err(error_response)?;
    let bytes = state
        .exporter
        .spawn_document(req.sections, req.signature)
        .await
        .map_err(error_response)?;

    Ok(([(header::CONTENT_TYPE, DOCX_MIME_TYPE)], bytes))
}

#[utoipa::path(
    post,
    path = "/reports/narrative",
    responses(
        (status = 200, description = "Plain-text risk summary"),
        (status = 400, description = "Bad request"),
        (status = 500, description = "Internal server error")
    )
)]
/// Build the plain-text risk narrative from an export request
async fn export_narrative(
    State(state): State<AppState>,
    body: String,
) -> Result<impl IntoResponse, (StatusCode, &'static str)> {
    let req = ExportRequest::from_json_str(&body).map_err(error_response)?;
    let text = state
        .exporter
        .spawn_narrative(req.narrative)
        .await
        .map_err(error_response)?;

    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text))
}

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::Response;

    const REQUEST: &str = r#"{
        "sections": [{"kind": "plan", "content": "Review in clinic"}],
        "signature": {"name": "Dr A Jones"},
        "narrative": {
            "patient": {"first_name": "Sam", "pronouns": {"subject": "she", "possessive": "her"}},
            "episodes": [{"kind": "inpatient", "start": "2023-03-01", "end": "2023-03-15"}],
            "overall_risk": "Moderate"
        }
    }"#;

    fn state(dir: &std::path::Path) -> State<AppState> {
        let exporter = Exporter::new(CoreConfig::new(dir.to_path_buf()).unwrap());
        State(AppState { exporter })
    }

    fn status(res: Result<impl IntoResponse, (StatusCode, &'static str)>) -> StatusCode {
        let res: Response = match res {
            Ok(ok) => ok.into_response(),
            Err(err) => err.into_response(),
        };
        res.status()
    }

    #[tokio::test]
    async fn valid_requests_are_exported() {
        let tmp = tempfile::tempdir().unwrap();
        let res = export_document(state(tmp.path()), REQUEST.to_string()).await;
        assert_eq!(status(res), StatusCode::OK);
        let res = export_narrative(state(tmp.path()), REQUEST.to_string()).await;
        assert_eq!(status(res), StatusCode::OK);
    }

    #[tokio::test]
    async fn invalid_requests_are_bad_requests() {
        let tmp = tempfile::tempdir().unwrap();
        let invalid = [
            REQUEST.replace("\"end\": \"2023-03-15\"", "\"end\": \"2023-02-15\""),
            REQUEST.replace("\"Dr A Jones\"", "\"  \""),
            REQUEST.replace("\"plan\"", "\"discharge\""),
            "not json".to_string(),
        ];
        for body in invalid {
            let res = export_document(state(tmp.path()), body.clone()).await;
            assert_eq!(status(res), StatusCode::BAD_REQUEST, "{body}");
            let res = export_narrative(state(tmp.path()), body.clone()).await;
            assert_eq!(status(res), StatusCode::BAD_REQUEST, "{body}");
        }
    }
}
