//! 筛选表单的 HTTP 服务。

pub mod render;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use log::{error, info};
use serde::Deserialize;
use std::sync::Arc;

use crate::errors::{Result, ScreenerError};
use crate::services::screen_service::{ScreenRequest, ScreenService};
use crate::util;
use render::FormValues;

/// 表单提交的查询参数，空字符串视为未填写
#[derive(Debug, Default, Deserialize)]
pub struct ScreenQuery {
    #[serde(default)]
    pub threshold: Option<String>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

impl ScreenQuery {
    fn form_values(&self, default_threshold: f64) -> FormValues {
        FormValues {
            threshold: self
                .threshold
                .as_deref()
                .and_then(|t| t.trim().parse().ok())
                .unwrap_or(default_threshold),
            start: self.start.clone().unwrap_or_default(),
            end: self.end.clone().unwrap_or_default(),
        }
    }

    /// 转换为筛选请求，阈值缺省时取配置值
    pub fn to_request(&self, default_threshold: f64) -> Result<ScreenRequest> {
        let threshold = match self.threshold.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t
                .parse::<f64>()
                .map_err(|_| ScreenerError::ConfigError(format!("Invalid threshold: {}", t)))?,
            _ => default_threshold,
        };

        Ok(ScreenRequest {
            threshold,
            start: util::parse_user_date(self.start.as_deref().unwrap_or_default())?,
            end: util::parse_user_date(self.end.as_deref().unwrap_or_default())?,
        })
    }
}

fn error_status(e: &ScreenerError) -> StatusCode {
    if e.is_user_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::BAD_GATEWAY
    }
}

/// 构建路由
pub fn router(service: Arc<ScreenService>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/screen", get(screen_page))
        .route("/api/screen", get(screen_json))
        .route("/health", get(health))
        .with_state(service)
}

/// 启动 Web 服务
pub async fn serve(service: Arc<ScreenService>) -> Result<()> {
    let addr = service.config().bind_addr.clone();
    let listener = tokio::net::TcpListener::bind(addr.as_str()).await?;
    info!("Serving DKBY screener on http://{}", addr);
    axum::serve(listener, router(service)).await?;
    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn index(State(service): State<Arc<ScreenService>>) -> Html<String> {
    let values = FormValues {
        threshold: service.config().threshold,
        ..FormValues::default()
    };
    Html(render::render_form(&values))
}

async fn screen_page(
    State(service): State<Arc<ScreenService>>,
    Query(query): Query<ScreenQuery>,
) -> Response {
    let values = query.form_values(service.config().threshold);

    let request = match query.to_request(service.config().threshold) {
        Ok(request) => request,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, Html(render::render_error(&values, &e.to_string())))
                .into_response();
        }
    };

    match service.screen(&request).await {
        Ok(report) => Html(render::render_report(&values, &report)).into_response(),
        Err(e) => {
            error!("Screening failed: {}", e);
            (error_status(&e), Html(render::render_error(&values, &e.to_string()))).into_response()
        }
    }
}

async fn screen_json(
    State(service): State<Arc<ScreenService>>,
    Query(query): Query<ScreenQuery>,
) -> Response {
    let request = match query.to_request(service.config().threshold) {
        Ok(request) => request,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, Json(serde_json::json!({ "error": e.to_string() })))
                .into_response();
        }
    };

    match service.screen(&request).await {
        Ok(report) => Json(report).into_response(),
        Err(e) => {
            error!("Screening failed: {}", e);
            (error_status(&e), Json(serde_json::json!({ "error": e.to_string() }))).into_response()
        }
    }
}
