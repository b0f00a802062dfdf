use poem_openapi::payload::Json;

use crate::{source::JellyfinSource, source_api::models::StatusResponse};

pub struct HealthService<'a> {
    pub source: &'a JellyfinSource,
}

impl<'a> HealthService<'a> {
    pub fn new(source: &'a JellyfinSource) -> Self {
        Self { source }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn status(&self) -> StatusResponse {
        match self.source.server_status().await {
            Ok(info) => StatusResponse::Ok(Json(info.into())),
            Err(e) => {
                tracing::error!(error = %format!("{:?}", e), "media server status failed");
                e.into()
            }
        }
    }
}
