use poem_openapi::payload::Json;

use crate::{
    error::SourceError,
    session::Session,
    source_api::models::{SettingsDto, SettingsResponse, SettingsUpdateDto},
};

pub struct SettingsService<'a> {
    pub session: &'a Session,
}

impl<'a> SettingsService<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    async fn snapshot(&self) -> anyhow::Result<SettingsDto> {
        let user_id = self.session.user_id().await?;
        Ok(SettingsDto {
            server_url: self.session.server_url().await?,
            has_api_key: !self.session.api_key().await?.is_empty(),
            user_id: (!user_id.is_empty()).then_some(user_id),
        })
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get(&self) -> SettingsResponse {
        match self.snapshot().await {
            Ok(dto) => SettingsResponse::Ok(Json(dto)),
            Err(e) => {
                tracing::error!(error = %format!("{:?}", e), "failed to read settings");
                SourceError::from(e).into()
            }
        }
    }

    #[tracing::instrument(level = "debug", skip(self, update))]
    pub async fn update(&self, update: SettingsUpdateDto) -> SettingsResponse {
        match self.apply(update).await {
            Ok(dto) => SettingsResponse::Ok(Json(dto)),
            Err(e) => {
                tracing::error!(error = %format!("{:?}", e), "failed to update settings");
                SourceError::from(e).into()
            }
        }
    }

    async fn apply(&self, update: SettingsUpdateDto) -> anyhow::Result<SettingsDto> {
        if let Some(url) = update.server_url.as_deref() {
            self.session.set_server_url(url).await?;
        }
        if let Some(key) = update.api_key.as_deref() {
            self.session.set_api_key(key).await?;
        }
        self.snapshot().await
    }
}
