use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Json, Router,
    extract::{Path, Request, State, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crumb_core::convert::{ConversionResult, ConversionRules};
use crumb_core::error::RecipeError;
use crumb_core::hydration::HydrationReport;
use crumb_core::models::{IngredientInfo, NewIngredient, NewRecipe, Recipe, RecipeStats};
use crumb_core::service::RecipeService;

const BODY_LIMIT: usize = 2 * 1024 * 1024; // 2 MB

#[derive(Clone)]
struct AppState {
    service: Arc<Mutex<RecipeService>>,
    api_key: Option<String>,
}

impl AppState {
    fn service(&self) -> MutexGuard<'_, RecipeService> {
        self.service
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

// --- Request / Response types ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConvertRequest {
    title: Option<String>,
    ingredients: Option<Vec<NewIngredient>>,
    /// Number or numeric string; anything else is rejected as bad input.
    #[serde(default)]
    target_flour: serde_json::Value,
    #[serde(default)]
    include_all: bool,
    #[serde(default)]
    flour_keywords: Vec<String>,
    #[serde(default)]
    basis_groups: Vec<String>,
}

fn parse_target_flour(value: &serde_json::Value) -> Result<f64, RecipeError> {
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| {
        RecipeError::InvalidInput(format!("targetFlour must be a number, got {value}"))
    })
}

#[derive(Deserialize)]
struct SetHydrationRequest {
    hydration: f64,
}

#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    message: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    status: &'static str,
    error: String,
}

impl ErrorResponse {
    fn new(error: String) -> Self {
        Self {
            status: "error",
            error,
        }
    }
}

// --- Error handling ---

enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unprocessable(String),
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            Self::Internal(err) => {
                tracing::error!("internal server error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<RecipeError> for ApiError {
    fn from(err: RecipeError) -> Self {
        match err {
            RecipeError::InvalidInput(_) => Self::BadRequest(err.to_string()),
            RecipeError::NotFound(_) => Self::NotFound(err.to_string()),
            RecipeError::NoBasisFlour => Self::Unprocessable(err.to_string()),
            RecipeError::Storage(inner) => Self::Internal(inner),
        }
    }
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
                Json(ErrorResponse::new("Invalid or missing API key".to_string())),
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

// --- Recipe handlers ---

async fn list_recipes(State(state): State<AppState>) -> Result<Json<Vec<Recipe>>, ApiError> {
    let recipes = state.service().list_recipes()?;
    Ok(Json(recipes))
}

async fn list_titles(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    let titles = state.service().list_titles()?;
    Ok(Json(titles))
}

async fn save_recipe(
    State(state): State<AppState>,
    payload: Result<Json<NewRecipe>, JsonRejection>,
) -> Result<(StatusCode, Json<StatusResponse>), ApiError> {
    let Json(req) = payload?;
    let outcome = state.service().save_recipe(&req)?;
    let status = if outcome.updated {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((
        status,
        Json(StatusResponse {
            status: "success",
            message: outcome.message(),
        }),
    ))
}

async fn get_recipe(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> Result<Json<Recipe>, ApiError> {
    let recipe = state.service().get_recipe(&title)?;
    Ok(Json(recipe))
}

async fn delete_recipe(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.service().delete_recipe(&title)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn recipe_hydration(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> Result<Json<HydrationReport>, ApiError> {
    let report = state
        .service()
        .recipe_hydration(&title, &ConversionRules::default())?;
    Ok(Json(report))
}

async fn convert_recipe(
    State(state): State<AppState>,
    payload: Result<Json<ConvertRequest>, JsonRejection>,
) -> Result<Json<ConversionResult>, ApiError> {
    let Json(req) = payload?;
    let target_flour = parse_target_flour(&req.target_flour)?;
    let rules = ConversionRules::with_overrides(req.flour_keywords, req.basis_groups);
    let service = state.service();
    let result = match (req.title.as_deref(), req.ingredients.as_deref()) {
        (Some(title), _) => {
            service.convert_recipe(title, target_flour, req.include_all, &rules)?
        }
        (None, Some(ingredients)) => {
            service.convert_ingredients(ingredients, target_flour, req.include_all, &rules)?
        }
        (None, None) => {
            return Err(ApiError::BadRequest(
                "Either title or ingredients is required".to_string(),
            ));
        }
    };
    Ok(Json(result))
}

// --- Ingredient table handlers ---

async fn list_ingredients(
    State(state): State<AppState>,
) -> Result<Json<Vec<IngredientInfo>>, ApiError> {
    let infos = state.service().list_ingredient_infos()?;
    Ok(Json(infos))
}

async fn set_ingredient(
    State(state): State<AppState>,
    Path(name): Path<String>,
    payload: Result<Json<SetHydrationRequest>, JsonRejection>,
) -> Result<Json<IngredientInfo>, ApiError> {
    let Json(req) = payload?;
    let info = state
        .service()
        .set_ingredient_hydration(&name, req.hydration)?;
    Ok(Json(info))
}

async fn delete_ingredient(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.service().remove_ingredient_info(&name)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_stats(State(state): State<AppState>) -> Result<Json<RecipeStats>, ApiError> {
    let stats = state.service().stats()?;
    Ok(Json(stats))
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/recipes", get(list_recipes).post(save_recipe))
        .route("/api/titles", get(list_titles))
        .route(
            "/api/recipes/{title}",
            get(get_recipe).delete(delete_recipe),
        )
        .route("/api/recipes/{title}/hydration", get(recipe_hydration))
        .route("/api/convert", post(convert_recipe))
        .route("/api/ingredients", get(list_ingredients))
        .route(
            "/api/ingredients/{name}",
            put(set_ingredient).delete(delete_ingredient),
        )
        .route("/api/stats", get(get_stats))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .layer(middleware::from_fn(security_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// --- Server startup ---

/// First and last four characters of the key, or a mask when it is too short to abbreviate.
fn key_preview(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() < 12 {
        return "*".repeat(chars.len().max(4));
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

pub async fn start_server(
    service: RecipeService,
    port: u16,
    bind: &str,
    api_key: Option<String>,
) -> anyhow::Result<()> {
    let state = AppState {
        service: Arc::new(Mutex::new(service)),
        api_key: api_key.clone(),
    };

    let app = build_router(state);

    if let Some(ref key) = api_key {
        eprintln!(
            "API key: {} (see api_key file in data directory)",
            key_preview(key)
        );
    } else {
        tracing::warn!("authentication disabled (--no-auth), API is open to anyone");
    }

    if bind != "127.0.0.1" && bind != "localhost" && api_key.is_none() {
        tracing::warn!(
            "listening on {bind} with no authentication, any device on your network can access this API"
        );
    }

    let listener = tokio::net::TcpListener::bind(format!("{bind}:{port}")).await?;
    tracing::info!("listening on http://{bind}:{port}");
    axum::serve(listener, app).await?;

    Ok(())
}
