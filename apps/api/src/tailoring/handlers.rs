//! Axum route handlers for tailoring and export.

use std::time::Duration;

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info_span, Instrument};
use uuid::Uuid;

use crate::errors::{AppError, TailorError};
use crate::models::resume::Resume;
use crate::render::{render, Dialect};
use crate::state::AppState;
use crate::tailoring::trim::TrimLimits;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TailorRequest {
    pub resume: Value,
    #[serde(default)]
    pub job_description: String,
    pub exp_bullet_count: Option<i64>,
    pub proj_bullet_count: Option<i64>,
    pub vol_bullet_count: Option<i64>,
    pub tech_count: Option<i64>,
    pub lang_count: Option<i64>,
}

impl TailorRequest {
    /// Requested counts with defaults filled in; negative counts are rejected.
    pub fn limits(&self) -> Result<TrimLimits, TailorError> {
        let d = TrimLimits::default();
        TrimLimits::new(
            self.exp_bullet_count.unwrap_or(d.experience_bullets as i64),
            self.proj_bullet_count.unwrap_or(d.project_bullets as i64),
            self.vol_bullet_count.unwrap_or(d.volunteer_bullets as i64),
            self.tech_count.unwrap_or(d.technologies as i64),
            self.lang_count.unwrap_or(d.languages as i64),
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub resume: Value,
    #[serde(default)]
    pub template: Option<String>,
}

impl ExportRequest {
    fn dialect(&self) -> Result<Dialect, TailorError> {
        match self.template.as_deref() {
            Some(name) => name.parse(),
            None => Ok(Dialect::default()),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /tailor
///
/// Scores, sorts and trims the resume against the job description and returns it
/// with metrics populated. Bounded by `TAILOR_TIMEOUT_SECS`.
pub async fn handle_tailor(
    State(state): State<AppState>,
    Json(request): Json<TailorRequest>,
) -> Result<Json<Resume>, AppError> {
    let limits = request.limits()?;
    let mut resume = Resume::from_json(request.resume)?;

    let request_id = Uuid::new_v4();
    let span = info_span!("tailor", %request_id);
    let timeout_secs = state.config.tailor_timeout_secs;

    tokio::time::timeout(
        Duration::from_secs(timeout_secs),
        state
            .pipeline
            .tailor(&mut resume, &request.job_description, &limits)
            .instrument(span.clone()),
    )
    .await
    .map_err(|_| AppError::Timeout(timeout_secs))??;

    span.in_scope(|| debug!("Tailored resume:\n{resume}"));

    Ok(Json(resume))
}

/// POST /export/latex
///
/// Renders the resume into the requested template (default `jake`).
pub async fn handle_export_latex(
    State(state): State<AppState>,
    Json(request): Json<ExportRequest>,
) -> Result<Response, AppError> {
    let markup = render_request(&state, request)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=resume.tex"),
        ],
        markup,
    )
        .into_response())
}

/// POST /export/pdf
///
/// Renders, then compiles through the configured document compiler.
pub async fn handle_export_pdf(
    State(state): State<AppState>,
    Json(request): Json<ExportRequest>,
) -> Result<Response, AppError> {
    let markup = render_request(&state, request)?;
    let pdf = state.compiler.compile(&markup).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (header::CONTENT_DISPOSITION, "attachment; filename=resume.pdf"),
        ],
        pdf,
    )
        .into_response())
}

/// GET /templates
pub async fn handle_list_templates() -> Json<Value> {
    let names: Vec<&str> = Dialect::ALL.iter().map(|d| d.name()).collect();
    Json(json!({ "templates": names }))
}

fn render_request(state: &AppState, request: ExportRequest) -> Result<String, TailorError> {
    let dialect = request.dialect()?;
    let resume = Resume::from_json(request.resume)?;
    Ok(render(&resume, state.templates.get(dialect), dialect))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tailor_request(extra: Value) -> TailorRequest {
        let mut body = json!({"resume": {}, "job_description": "Rust"});
        if let (Some(target), Some(source)) = (body.as_object_mut(), extra.as_object()) {
            target.extend(source.clone());
        }
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_limits_default_when_absent() {
        assert_eq!(
            tailor_request(json!({})).limits().unwrap(),
            TrimLimits::default()
        );
    }

    #[test]
    fn test_limits_override_individually() {
        let limits = tailor_request(json!({"exp_bullet_count": 2, "lang_count": 0}))
            .limits()
            .unwrap();
        assert_eq!(limits.experience_bullets, 2);
        assert_eq!(limits.languages, 0);
        assert_eq!(limits.project_bullets, 5);
    }

    #[test]
    fn test_negative_limit_rejected() {
        assert!(matches!(
            tailor_request(json!({"tech_count": -3})).limits(),
            Err(TailorError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_export_dialect_defaults_to_jake() {
        let request: ExportRequest = serde_json::from_value(json!({"resume": {}})).unwrap();
        assert_eq!(request.dialect().unwrap(), Dialect::Jake);
        let request: ExportRequest =
            serde_json::from_value(json!({"resume": {}, "template": "nope"})).unwrap();
        assert!(request.dialect().is_err());
    }
}
