use axum::{
    extract::State,
    response::{IntoResponse, Json},
};

use crate::{
    dto::insight_dto::{ComfortIndex, ComfortQuery, InsightQuery, InsightReport},
    error::Result,
    utils::extract::AppQuery,
    AppState,
};

#[utoipa::path(
    get,
    path = "/weather/insights",
    params(InsightQuery),
    responses(
        (status = 200, description = "Cached or freshly generated report", body = InsightReport),
        (status = 400, description = "Invalid scope"),
        (status = 404, description = "No readings in scope")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn get_insights(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<InsightQuery>,
) -> Result<impl IntoResponse> {
    let report = state.insight_service.get_insights(&query, false).await?;
    Ok(Json(report))
}

#[utoipa::path(
    post,
    path = "/weather/insights/refresh",
    params(InsightQuery),
    responses(
        (status = 200, description = "Regenerated report", body = InsightReport),
        (status = 404, description = "No readings in scope")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn refresh_insights(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<InsightQuery>,
) -> Result<impl IntoResponse> {
    let report = state.insight_service.get_insights(&query, true).await?;
    Ok(Json(report))
}

#[utoipa::path(
    get,
    path = "/weather/comfort",
    params(ComfortQuery),
    responses(
        (status = 200, description = "Comfort index", body = ComfortIndex),
        (status = 404, description = "No readings to score")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn comfort_index(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ComfortQuery>,
) -> Result<impl IntoResponse> {
    let index = state.insight_service.comfort(&query).await?;
    Ok(Json(index))
}
