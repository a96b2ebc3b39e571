use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use super::AppState;
use crate::domain::{DealStructure, ProFormaResult, RawDealStructure, Ticker, ValidationError};
use crate::engine::compute_pro_forma;
use crate::error::AppError;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProFormaRequest {
    #[schema(example = "MSFT")]
    pub acquirer: String,
    #[schema(example = "ATVI")]
    pub target: String,
    pub structure: RawDealStructure,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProFormaResponse {
    #[schema(value_type = String)]
    pub acquirer: Ticker,
    #[schema(value_type = String)]
    pub target: Ticker,
    #[serde(flatten)]
    pub result: ProFormaResult,
}

/// Pro forma EPS accretion/dilution for a proposed acquisition.
///
/// The deal structure is validated before any provider call is made.
#[utoipa::path(
    post,
    path = "/proforma",
    request_body = ProFormaRequest,
    responses(
        (status = 200, description = "Pro forma result with EPS bridge", body = ProFormaResponse),
        (status = 400, description = "Malformed ticker"),
        (status = 404, description = "Unknown ticker or missing fundamentals"),
        (status = 422, description = "Invalid deal structure or degenerate fundamentals"),
        (status = 502, description = "Fundamentals provider unavailable")
    )
)]
pub async fn post_proforma(
    State(state): State<AppState>,
    Json(request): Json<ProFormaRequest>,
) -> Result<Json<ProFormaResponse>, AppError> {
    let deal = DealStructure::normalize(&request.structure)?;
    let acquirer = Ticker::parse(&request.acquirer)?;
    let target = Ticker::parse(&request.target)?;
    if acquirer == target {
        return Err(ValidationError::new("target", "must differ from acquirer").into());
    }

    let (acquirer_fundamentals, target_fundamentals) =
        state.fundamentals.pair(&acquirer, &target).await?;
    let result = compute_pro_forma(&acquirer_fundamentals, &target_fundamentals, &deal)?;

    info!(
        "Pro forma {} acquires {} ({}): standalone_eps={} pro_forma_eps={} accretion={}",
        acquirer,
        target,
        result.deal_type,
        result.standalone_eps,
        result.pro_forma_eps,
        result.accretion_dilution_pct
    );

    Ok(Json(ProFormaResponse {
        acquirer,
        target,
        result,
    }))
}
