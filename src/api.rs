// Job Market Dashboard - REST API
//
// Every request recomputes its page from the shared read-only table; the
// server holds no per-session state.

use crate::config::Config;
use crate::dataset::{to_csv, Record, EXPORT_MIME};
use crate::error::DashboardError;
use crate::filter::{apply_filter, FilteredView, SliderBounds};
use crate::pages::{render_page, ControlOverrides, Page, PageView};
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub records: Arc<Vec<Record>>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(records: Vec<Record>, config: Config) -> Self {
        Self {
            records: Arc::new(records),
            config: Arc::new(config),
        }
    }
}

/// API Response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Handler error, rendered as a JSON envelope with a matching status
pub struct ApiError(DashboardError);

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        Self(err)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(DashboardError::InvalidQuery(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            DashboardError::UnknownPage(_) => StatusCode::NOT_FOUND,
            DashboardError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }
        (status, Json(ApiResponse::<()>::err(self.0.to_string()))).into_response()
    }
}

/// Page list entry
#[derive(Debug, Serialize, Deserialize)]
pub struct PageEntry {
    pub slug: String,
    pub title: String,
}

/// Sidebar heading plus its page entries
#[derive(Debug, Serialize, Deserialize)]
pub struct Sidebar {
    pub title: String,
    pub pages: Vec<PageEntry>,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/pages - Sidebar title and entries in order
async fn list_pages(State(state): State<AppState>) -> Json<ApiResponse<Sidebar>> {
    let pages = Page::ALL
        .iter()
        .map(|p| PageEntry {
            slug: p.slug().to_string(),
            title: p.title().to_string(),
        })
        .collect();
    Json(ApiResponse::ok(Sidebar {
        title: state.config.general.title.clone(),
        pages,
    }))
}

/// GET /api/pages/:slug - Render one page
async fn get_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    query: Result<Query<ControlOverrides>, QueryRejection>,
) -> Result<Json<ApiResponse<PageView>>, ApiError> {
    let page = Page::from_slug(&slug)?;
    let Query(query) = query?;
    let mut ctx = state.config.page_context(&state.records);
    query.apply(&mut ctx, &state.records);
    debug!(page = page.slug(), thresholds = ?ctx.thresholds, "page requested");
    Ok(Json(ApiResponse::ok(render_page(page, &state.records, &ctx))))
}

/// GET /api/records - Full table
async fn get_records(State(state): State<AppState>) -> Json<ApiResponse<Vec<Record>>> {
    Json(ApiResponse::ok(state.records.as_ref().clone()))
}

/// GET /api/filter - Filtered rows and summary, thresholds taken as given
async fn filter_records(
    State(state): State<AppState>,
    query: Result<Query<ControlOverrides>, QueryRejection>,
) -> Result<Json<ApiResponse<FilteredView>>, ApiError> {
    let Query(query) = query?;
    let defaults = SliderBounds::from_records(&state.records).defaults();
    let thresholds = query.thresholds(defaults);
    Ok(Json(ApiResponse::ok(apply_filter(&state.records, &thresholds))))
}

/// GET /api/export - Full table as a CSV download
async fn export_csv(State(state): State<AppState>) -> Result<Response, ApiError> {
    let body = to_csv(&state.records)?;
    let file_name = &state.config.export.file_name;
    let disposition = format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        file_name,
        urlencoding::encode(file_name)
    );
    debug!(bytes = body.len(), "CSV export served");

    Ok((
        [
            (header::CONTENT_TYPE, EXPORT_MIME.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// GET / - Serve index.html
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

/// Build the full application router
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/pages", get(list_pages))
        .route("/pages/:slug", get(get_page))
        .route("/records", get(get_records))
        .route("/filter", get(filter_records))
        .route("/export", get(export_csv))
        .with_state(state);

    Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .nest_service("/static", ServeDir::new("web"))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{parse_csv, sample_records};
    use axum_test::TestServer;

    fn server() -> TestServer {
        TestServer::new(build_router(AppState::new(sample_records(), Config::default()))).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = server().get("/api/health").await;
        response.assert_status_ok();

        let json: serde_json::Value = response.json();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], "OK");
    }

    #[tokio::test]
    async fn test_list_pages() {
        let json: serde_json::Value = server().get("/api/pages").await.json();
        assert_eq!(json["data"]["title"], "China Jobs Market");
        let pages = json["data"]["pages"].as_array().unwrap();
        assert_eq!(pages.len(), Page::ALL.len());
        assert_eq!(pages[0]["slug"], "overview");
        assert_eq!(pages[5]["title"], "Skills & Job Recommendations");
    }

    #[tokio::test]
    async fn test_sidebar_title_from_config() {
        let mut config = Config::default();
        config.general.title = "Shanghai Jobs".to_string();
        let server = TestServer::new(build_router(AppState::new(sample_records(), config))).unwrap();

        let body: ApiResponse<Sidebar> = server.get("/api/pages").await.json();
        assert_eq!(body.data.unwrap().title, "Shanghai Jobs");
    }

    #[tokio::test]
    async fn test_fractional_salary_matches_filter_endpoint() {
        let server = server();
        let page: ApiResponse<PageView> =
            server.get("/api/pages/filters?min_salary=9000.5").await.json();
        let filtered: ApiResponse<FilteredView> = server.get("/api/filter?min_salary=9000.5").await.json();

        let view = page.data.unwrap();
        assert_eq!(filtered.data.unwrap().records.len(), 40);
        assert_eq!(view.metric("Total Jobs").unwrap().display(), "40");
    }

    #[tokio::test]
    async fn test_bad_query_keeps_envelope() {
        for uri in ["/api/pages/filters?min_experience=-1", "/api/filter?min_salary=lots"] {
            let response = server().get(uri).expect_failure().await;
            response.assert_status(StatusCode::BAD_REQUEST);

            let json: serde_json::Value = response.json();
            assert_eq!(json["success"], false, "{}", uri);
            assert!(json["error"].as_str().unwrap().starts_with("invalid query:"), "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_data_view_rows_snap_to_step() {
        let body: ApiResponse<PageView> = server().get("/api/pages/data-view?rows=7").await.json();
        assert_eq!(body.data.unwrap().table.unwrap().records.len(), 5);
    }

    #[tokio::test]
    async fn test_filters_page_with_query() {
        let response = server()
            .get("/api/pages/filters?min_experience=2&min_salary=9000&min_demand=70")
            .await;
        response.assert_status_ok();

        let body: ApiResponse<PageView> = response.json();
        let view = body.data.unwrap();
        assert_eq!(view.metric("Total Jobs").unwrap().display(), "30");
        assert_eq!(view.metric("Avg Salary (CNY)").unwrap().display(), "11000");
    }

    #[tokio::test]
    async fn test_filters_page_clamps_sliders() {
        let body: ApiResponse<PageView> = server().get("/api/pages/filters?min_demand=500").await.json();
        let view = body.data.unwrap();
        // 500 is pulled back to the slider maximum of 80
        assert_eq!(view.controls[2].value, 80);
        assert_eq!(view.metric("Total Jobs").unwrap().display(), "10");
    }

    #[tokio::test]
    async fn test_data_view_rows_query() {
        let body: ApiResponse<PageView> = server().get("/api/pages/data-view?rows=10").await.json();
        let view = body.data.unwrap();
        assert_eq!(view.table.unwrap().records.len(), 10);
        assert_eq!(view.download.unwrap().file_name, "job_market_data.csv");
    }

    #[tokio::test]
    async fn test_filter_endpoint_reports_no_data() {
        let response = server().get("/api/filter?min_demand=500").await;
        response.assert_status_ok();

        let json: serde_json::Value = response.json();
        assert_eq!(json["data"]["summary"]["count"], 0);
        assert_eq!(json["data"]["summary"]["mean_salary"]["kind"], "no_data");
    }

    #[tokio::test]
    async fn test_unknown_page_is_404() {
        let response = server().get("/api/pages/nowhere").expect_failure().await;
        response.assert_status_not_found();

        let json: serde_json::Value = response.json();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "unknown page: nowhere");
    }

    #[tokio::test]
    async fn test_export_download() {
        let response = server().get("/api/export").await;
        response.assert_status_ok();
        assert_eq!(response.header(header::CONTENT_TYPE), "text/csv");
        assert!(response
            .header(header::CONTENT_DISPOSITION)
            .to_str()
            .unwrap()
            .starts_with("attachment; filename=\"job_market_data.csv\""));

        let parsed = parse_csv(response.as_bytes().as_ref()).unwrap();
        assert_eq!(parsed, sample_records());
    }

    #[tokio::test]
    async fn test_records() {
        let json: serde_json::Value = server().get("/api/records").await.json();
        assert_eq!(json["data"].as_array().unwrap().len(), 50);
    }

    #[tokio::test]
    async fn test_index_served() {
        let response = server().get("/").await;
        response.assert_status_ok();
        assert!(response.text().contains("<html"));
    }
}
