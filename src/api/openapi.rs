use axum::Json;
use utoipa::OpenApi;

use super::{basics, proforma};
use crate::domain::{
    Affects, BridgeItem, BridgeLabel, DealType, NetIncomeSource, ProFormaResult, RawDealStructure,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pro forma EPS",
        description = "EPS accretion/dilution analysis for proposed acquisitions"
    ),
    paths(basics::get_basics, proforma::post_proforma),
    components(schemas(
        basics::BasicsResponse,
        proforma::ProFormaRequest,
        proforma::ProFormaResponse,
        RawDealStructure,
        ProFormaResult,
        DealType,
        NetIncomeSource,
        BridgeItem,
        BridgeLabel,
        Affects
    ))
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
