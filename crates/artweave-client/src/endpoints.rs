// Typed wrappers for the ArtWeave API endpoints.

use artweave_core::model::{
    CompareRequest, CompareResponse, HealthResponse, Painting, PaintingsPayload, SetSummary,
    SetsPayload,
};

use crate::client::{ApiClient, RequestOptions};
use crate::error::ApiError;

pub const HEALTH_PATH: &str = "/api/health";
pub const SETS_PATH: &str = "/api/sets";
pub const PAINTINGS_PATH: &str = "/api/paintings";
pub const COMPARE_PATH: &str = "/api/compare";

impl ApiClient {
    /// `GET /api/health`
    pub async fn health(&self) -> Result<HealthResponse, ApiError> {
        self.request(HEALTH_PATH, RequestOptions::get()).await
    }

    /// `GET /api/sets`
    pub async fn list_sets(&self) -> Result<Vec<SetSummary>, ApiError> {
        let payload: SetsPayload = self.request(SETS_PATH, RequestOptions::get()).await?;
        Ok(payload.into_sets())
    }

    /// `GET /api/paintings?set_id=<id>`
    pub async fn list_paintings(&self, set_id: &str) -> Result<Vec<Painting>, ApiError> {
        let options = RequestOptions::get().query("set_id", set_id);
        let payload: PaintingsPayload = self.request(PAINTINGS_PATH, options).await?;
        Ok(payload.into_paintings())
    }

    /// `POST /api/compare`. Not cached: every call asks the server for a
    /// fresh summary.
    pub async fn compare(
        &self,
        painting_a_id: &str,
        painting_b_id: &str,
    ) -> Result<CompareResponse, ApiError> {
        let body = CompareRequest {
            painting_a_id: painting_a_id.to_string(),
            painting_b_id: painting_b_id.to_string(),
        };
        self.request(COMPARE_PATH, RequestOptions::post_json(&body)?)
            .await
    }
}
