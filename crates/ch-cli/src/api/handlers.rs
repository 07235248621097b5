//! Route handlers.

use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, Uri};
use axum::Json;
use ch_analysis::{
    choropleth as build_choropleth, correlation as correlate, county_details, county_neighbors,
    moran as morans_i, parse_variable_pair, variable_stats, ChoroplethCollection,
    CorrelationResult, CountyDetails, CountyNeighbors, MoranResult, StatsMode, Variable,
    VariableRegistry, VariableStats,
};
use ch_core::catalog::HealthDomain;
use ch_core::names::{HEALTH_TABLE, SPATIAL_TABLE};
use ch_etl::validate_join;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use super::{ApiError, AppState};
use crate::commands::validate::ValidationOutput;

#[derive(Debug, Deserialize)]
pub(crate) struct VarQuery {
    var: Option<String>,
}

impl VarQuery {
    fn required(self) -> Result<String, ApiError> {
        self.var
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ApiError::missing_param("var"))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct VarsQuery {
    vars: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct VariableList {
    variables: Vec<Variable>,
    count: usize,
}

/// GET /
pub(crate) async fn root() -> Json<Value> {
    Json(json!({
        "message": "County Health Explorer API",
        "version": env!("CARGO_PKG_VERSION"),
        "health": "/health",
        "api": "/api",
        "endpoints": [
            "/api/vars",
            "/api/variables/categories",
            "/api/stats?var=",
            "/api/stats/transformed?var=",
            "/api/choropleth?var=",
            "/api/corr?vars=a,b",
            "/api/moran?var=",
            "/api/counties/{fips}",
            "/api/neighbors/{fips}",
            "/api/validation",
        ],
    }))
}

/// GET /health
///
/// 503 when the store cannot be queried.
pub(crate) async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let db = state.db.clone();
    let counts = tokio::task::spawn_blocking(move || {
        let health = db.query_count(&format!("SELECT 1 FROM {HEALTH_TABLE}"))?;
        let spatial = db.query_count(&format!("SELECT 1 FROM {SPATIAL_TABLE}"))?;
        Ok::<_, ch_db::DbError>((health, spatial))
    })
    .await;

    match counts {
        Ok(Ok((health_records, spatial_records))) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected",
                "health_records": health_records,
                "spatial_records": spatial_records,
            })),
        ),
        Ok(Err(e)) => unhealthy(e.to_string()),
        Err(e) => unhealthy(e.to_string()),
    }
}

fn unhealthy(error: String) -> (StatusCode, Json<Value>) {
    log::warn!("Health check failed: {error}");
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({"status": "unhealthy", "error": error})),
    )
}

/// GET /api/vars
pub(crate) async fn list_variables(
    State(state): State<AppState>,
) -> Result<Json<VariableList>, ApiError> {
    let registry = state.run(|ctx| VariableRegistry::load(ctx.db)).await?;
    Ok(Json(VariableList {
        count: registry.len(),
        variables: registry.variables().to_vec(),
    }))
}

/// GET /api/variables/categories
pub(crate) async fn variable_categories(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<HealthDomain, Vec<Variable>>>, ApiError> {
    let registry = state.run(|ctx| VariableRegistry::load(ctx.db)).await?;
    Ok(Json(registry.by_domain()))
}

/// GET /api/stats?var=
pub(crate) async fn stats(
    State(state): State<AppState>,
    Query(query): Query<VarQuery>,
) -> Result<Json<VariableStats>, ApiError> {
    let var = query.required()?;
    let stats = state
        .run(move |ctx| variable_stats(ctx, &var, StatsMode::Raw))
        .await?;
    Ok(Json(stats))
}

/// GET /api/stats/transformed?var=
pub(crate) async fn transformed_stats(
    State(state): State<AppState>,
    Query(query): Query<VarQuery>,
) -> Result<Json<VariableStats>, ApiError> {
    let var = query.required()?;
    let stats = state
        .run(move |ctx| variable_stats(ctx, &var, StatsMode::Transformed))
        .await?;
    Ok(Json(stats))
}

/// GET /api/choropleth?var=
pub(crate) async fn choropleth(
    State(state): State<AppState>,
    Query(query): Query<VarQuery>,
) -> Result<Json<ChoroplethCollection>, ApiError> {
    let var = query.required()?;
    let collection = state.run(move |ctx| build_choropleth(ctx, &var)).await?;
    Ok(Json(collection))
}

/// GET /api/corr?vars=a,b
pub(crate) async fn correlation(
    State(state): State<AppState>,
    Query(query): Query<VarsQuery>,
) -> Result<Json<CorrelationResult>, ApiError> {
    let vars = query.vars.ok_or_else(|| ApiError::missing_param("vars"))?;
    let (var1, var2) = parse_variable_pair(&vars)?;
    let result = state.run(move |ctx| correlate(ctx, &var1, &var2)).await?;
    Ok(Json(result))
}

/// GET /api/moran?var=
pub(crate) async fn moran(
    State(state): State<AppState>,
    Query(query): Query<VarQuery>,
) -> Result<Json<MoranResult>, ApiError> {
    let var = query.required()?;
    let result = state.run(move |ctx| morans_i(ctx, &var)).await?;
    Ok(Json(result))
}

/// GET /api/counties/{fips}
pub(crate) async fn county(
    State(state): State<AppState>,
    Path(fips): Path<String>,
) -> Result<Json<CountyDetails>, ApiError> {
    let details = state.run(move |ctx| county_details(ctx, &fips)).await?;
    Ok(Json(details))
}

/// GET /api/neighbors/{fips}
pub(crate) async fn neighbors(
    State(state): State<AppState>,
    Path(fips): Path<String>,
) -> Result<Json<CountyNeighbors>, ApiError> {
    let result = state.run(move |ctx| county_neighbors(ctx, &fips)).await?;
    Ok(Json(result))
}

/// GET /api/validation
pub(crate) async fn validation(
    State(state): State<AppState>,
) -> Result<Json<ValidationOutput>, ApiError> {
    let db = state.db.clone();
    let config = state.config.clone();
    let report =
        tokio::task::spawn_blocking(move || validate_join(db.as_ref(), &config.columns.fips))
            .await
            .map_err(|e| ApiError::internal(format!("blocking task failed: {e}")))?
            .map_err(ApiError::internal)?;
    let warnings = report.warnings(&state.config.validation);
    Ok(Json(ValidationOutput { report, warnings }))
}

/// Any unmatched route.
pub(crate) async fn not_found(uri: Uri) -> ApiError {
    ApiError::new(
        StatusCode::NOT_FOUND,
        "Not Found",
        format!("No route for {}", uri.path()),
    )
}
