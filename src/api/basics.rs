use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::AppState;
use crate::domain::{CompanyFundamentals, Decimal, NetIncomeSource, Ticker};
use crate::error::AppError;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BasicsQuery {
    /// Ticker symbol, e.g. `AAPL`.
    pub ticker: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BasicsResponse {
    #[schema(value_type = String, example = "AAPL")]
    pub ticker: Ticker,
    #[schema(value_type = f64)]
    pub price: Decimal,
    #[schema(value_type = f64)]
    pub shares_outstanding: Decimal,
    #[schema(value_type = Option<f64>)]
    pub eps_ttm: Option<Decimal>,
    #[schema(value_type = f64)]
    pub ni_ttm: Decimal,
    pub ni_source: NetIncomeSource,
    #[schema(value_type = String, example = "USD")]
    pub currency: String,
}

impl From<CompanyFundamentals> for BasicsResponse {
    fn from(f: CompanyFundamentals) -> Self {
        Self {
            ticker: f.ticker,
            price: f.price,
            shares_outstanding: f.shares_outstanding,
            eps_ttm: f.eps_ttm,
            ni_ttm: f.ni_ttm,
            ni_source: f.ni_source,
            currency: f.currency.to_string(),
        }
    }
}

/// Fundamentals for one ticker, with net income derived when not reported.
#[utoipa::path(
    get,
    path = "/basics",
    params(BasicsQuery),
    responses(
        (status = 200, description = "Fundamentals for the ticker", body = BasicsResponse),
        (status = 400, description = "Malformed ticker"),
        (status = 404, description = "Unknown ticker or missing fundamentals"),
        (status = 502, description = "Fundamentals provider unavailable")
    )
)]
pub async fn get_basics(
    Query(params): Query<BasicsQuery>,
    State(state): State<AppState>,
) -> Result<Json<BasicsResponse>, AppError> {
    let ticker = Ticker::parse(&params.ticker)?;
    let fundamentals = state.fundamentals.basics(&ticker).await?;
    Ok(Json(fundamentals.into()))
}
