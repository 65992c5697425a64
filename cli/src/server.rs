use std::sync::{Arc, Mutex};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Path, Query, Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get},
};
use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info};

use crate::commands::Service;
use fitsphere_core::aggregate;
use fitsphere_core::chart::ChartProjection;
use fitsphere_core::foods::{self, FoodSuggestion};
use fitsphere_core::models::{Category, CategoryInfo, CategoryReport, Entry};

const BODY_LIMIT: usize = 64 * 1024; // 64 KB

#[derive(Clone)]
struct AppState {
    svc: Arc<Mutex<Service>>,
    api_key: Option<String>,
}

impl AppState {
    fn lock(&self) -> std::sync::MutexGuard<'_, Service> {
        self.svc
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

// --- Request / Response types ---

#[derive(Deserialize)]
struct CreateEntryRequest {
    #[serde(default)]
    label: String,
    value: f64,
    /// Local date-time, e.g. "2024-03-10T08:30:00". Defaults to now.
    timestamp: Option<NaiveDateTime>,
}

#[derive(Deserialize)]
struct SetGoalRequest {
    goal: f64,
}

#[derive(Deserialize)]
struct ReportQuery {
    date: Option<String>,
}

#[derive(Deserialize)]
struct ClearQuery {
    #[serde(default)]
    confirm: bool,
}

#[derive(Deserialize)]
struct SuggestQuery {
    #[serde(default)]
    q: String,
}

#[derive(Deserialize)]
struct KcalQuery {
    grams: f64,
}

#[derive(Serialize)]
struct ReportResponse {
    report: CategoryReport,
    chart: ChartProjection,
}

#[derive(Serialize)]
struct GoalResponse {
    category: Category,
    goal: f64,
}

#[derive(Serialize)]
struct KcalResponse {
    food: String,
    grams: f64,
    kcal_per_100g: f64,
    kcal: f64,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// --- Error handling ---

enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Internal(err) => {
                error!("Internal server error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

fn parse_category(key: &str) -> Result<Category, ApiError> {
    key.parse()
        .map_err(|e: anyhow::Error| ApiError::BadRequest(e.to_string()))
}

// --- Middleware ---

async fn require_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if let Some(ref expected_key) = state.api_key {
        let authorized = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|token| token == expected_key);

        if !authorized {
            return (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: "Invalid or missing API key".to_string(),
                }),
            )
                .into_response();
        }
    }
    next.run(request).await
}

async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static("default-src 'none'"),
    );
    response
}

// --- Handlers ---

async fn list_categories() -> Json<Vec<CategoryInfo>> {
    Json(Category::ALL.into_iter().map(|c| *c.info()).collect())
}

async fn get_report(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(params): Query<ReportQuery>,
) -> Result<Json<ReportResponse>, ApiError> {
    let category = parse_category(&key)?;
    let today = match params.date {
        None => Local::now().date_naive(),
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map_err(|_| ApiError::BadRequest(format!("Invalid date '{s}'. Use YYYY-MM-DD")))?,
    };
    if aggregate::window_start(today).is_none() {
        return Err(ApiError::BadRequest(format!(
            "Date {today} is too early for a five-day report"
        )));
    }

    let svc = state.lock();
    Ok(Json(ReportResponse {
        report: svc.report(category, today),
        chart: svc.chart(category, today),
    }))
}

async fn list_entries(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Vec<Entry>>, ApiError> {
    let category = parse_category(&key)?;
    let svc = state.lock();
    Ok(Json(svc.entries(category).to_vec()))
}

async fn create_entry(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<CreateEntryRequest>,
) -> Result<(StatusCode, Json<Entry>), ApiError> {
    let category = parse_category(&key)?;
    if !req.value.is_finite() {
        return Err(ApiError::BadRequest("value must be a finite number".to_string()));
    }
    let timestamp = req
        .timestamp
        .unwrap_or_else(|| Local::now().naive_local());

    let entry = {
        let mut svc = state.lock();
        svc.log_entry(category, &req.label, req.value, timestamp)
            .context("failed to store entry")?
    };
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn clear_entries(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(params): Query<ClearQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let category = parse_category(&key)?;
    if !params.confirm {
        return Err(ApiError::BadRequest(
            "clearing a category deletes every entry; repeat with ?confirm=true".to_string(),
        ));
    }
    let removed = {
        let mut svc = state.lock();
        svc.clear_entries(category)
            .context("failed to clear entries")?
    };
    info!(%category, removed, "cleared entries over API");
    Ok(Json(serde_json::json!({ "category": category, "cleared": removed })))
}

async fn delete_entry(
    State(state): State<AppState>,
    Path((key, id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let category = parse_category(&key)?;
    let deleted = {
        let mut svc = state.lock();
        svc.delete_entry(category, &id)
            .context("failed to delete entry")?
    };
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!(
            "No {category} entry with id '{id}'"
        )))
    }
}

async fn list_goals(State(state): State<AppState>) -> Json<Vec<GoalResponse>> {
    let svc = state.lock();
    Json(
        svc.goals()
            .into_iter()
            .map(|(category, goal)| GoalResponse { category, goal })
            .collect(),
    )
}

async fn get_goal(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GoalResponse>, ApiError> {
    let category = parse_category(&key)?;
    let goal = state.lock().goal(category);
    Ok(Json(GoalResponse { category, goal }))
}

async fn set_goal(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<SetGoalRequest>,
) -> Result<Json<GoalResponse>, ApiError> {
    let category = parse_category(&key)?;
    let accepted = {
        let mut svc = state.lock();
        svc.set_goal(category, req.goal)
            .context("failed to store goal")?
    };
    if !accepted {
        return Err(ApiError::BadRequest(
            "goal must be a positive number".to_string(),
        ));
    }
    Ok(Json(GoalResponse {
        category,
        goal: req.goal,
    }))
}

async fn suggest_foods(Query(params): Query<SuggestQuery>) -> Json<Vec<FoodSuggestion>> {
    Json(foods::suggest(&params.q))
}

async fn food_kcal(
    Path(name): Path<String>,
    Query(params): Query<KcalQuery>,
) -> Result<Json<KcalResponse>, ApiError> {
    if !params.grams.is_finite() {
        return Err(ApiError::BadRequest("grams must be a number".to_string()));
    }
    Ok(Json(KcalResponse {
        kcal_per_100g: foods::kcal_per_100g(&name),
        kcal: foods::grams_to_kcal(params.grams, &name),
        grams: params.grams,
        food: name,
    }))
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/categories", get(list_categories))
        .route("/api/report/{category}", get(get_report))
        .route(
            "/api/entries/{category}",
            get(list_entries).post(create_entry).delete(clear_entries),
        )
        .route("/api/entries/{category}/{id}", delete(delete_entry))
        .route("/api/goals", get(list_goals))
        .route("/api/goals/{category}", get(get_goal).put(set_goal))
        .route("/api/foods/suggest", get(suggest_foods))
        .route("/api/foods/{name}/kcal", get(food_kcal))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .layer(middleware::from_fn(security_headers))
        .with_state(state)
}

// --- Server startup ---

/// First and last four characters of `key`, or a mask when it is too short.
fn key_preview(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() < 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

pub async fn start_server(
    svc: Service,
    port: u16,
    bind: &str,
    api_key: Option<String>,
) -> anyhow::Result<()> {
    let state = AppState {
        svc: Arc::new(Mutex::new(svc)),
        api_key: api_key.clone(),
    };

    let app = build_router(state);

    if let Some(ref key) = api_key {
        eprintln!(
            "API key: {} (see api_key file in data directory)",
            key_preview(key)
        );
    } else {
        eprintln!("Warning: Authentication disabled (--no-auth). API is open to anyone.");
    }

    if bind != "127.0.0.1" && bind != "localhost" && api_key.is_none() {
        eprintln!(
            "Warning: Listening on {bind} with no authentication. Any device on your network can access this API."
        );
    }

    let listener = tokio::net::TcpListener::bind(format!("{bind}:{port}"))
        .await
        .with_context(|| format!("failed to bind {bind}:{port}"))?;
    eprintln!("Listening on http://{bind}:{port}");
    axum::serve(listener, app).await?;

    Ok(())
}
