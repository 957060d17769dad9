// SPDX-License-Identifier: MIT

//! HTTP adapter over [`PathwayEvaluator`]

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::opptak::orchestrator::{PathwayDecision, PathwayEvaluator, PathwayExplanation};
use crate::store::AdmissionError;

type AppState = Arc<PathwayEvaluator>;

pub fn router(evaluator: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/pathways/{id}/explain", get(explain_pathway))
        .route("/api/evaluations", post(create_evaluation))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(evaluator)
}

pub async fn serve(evaluator: AppState, port: u16) -> Result<(), AdmissionError> {
    let app = router(evaluator);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    log::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

impl IntoResponse for AdmissionError {
    fn into_response(self) -> Response {
        let status = match self {
            AdmissionError::NotFound { .. } => StatusCode::NOT_FOUND,
            AdmissionError::MalformedTree(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AdmissionError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn explain_pathway(
    State(evaluator): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PathwayExplanation>, AdmissionError> {
    Ok(Json(evaluator.explain_pathway(&id).await?))
}

#[derive(Deserialize)]
struct EvaluationRequest {
    applicant_id: String,
    pathway_id: String,
}

async fn create_evaluation(
    State(evaluator): State<AppState>,
    Json(payload): Json<EvaluationRequest>,
) -> Result<Json<PathwayDecision>, AdmissionError> {
    let decision = evaluator
        .evaluate_pathway(&payload.applicant_id, &payload.pathway_id)
        .await?;
    Ok(Json(decision))
}
