//! Cached credentials of one source instance.
//!
//! The server URL, API key and resolved user id live in the settings store.
//! The user id is dropped whenever the URL or key changes, and a 401 from any
//! call drops both the key and the user id.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    error::{ApiError, AuthError, ConfigError, SourceError},
    jellyfin_client::ClientFactory,
    storage::{API_KEY_KEY, SERVER_URL_KEY, SettingsStore, USER_ID_KEY},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub server_url: String,
    pub api_key: String,
    pub user_id: String,
}

#[derive(Clone)]
pub struct Session {
    store: Arc<dyn SettingsStore>,
    source_id: Uuid,
}

impl Session {
    pub fn new(store: Arc<dyn SettingsStore>, source_id: Uuid) -> Self {
        Self { store, source_id }
    }

    pub fn source_id(&self) -> Uuid {
        self.source_id
    }

    async fn read(&self, key: &str) -> anyhow::Result<String> {
        Ok(self
            .store
            .get(self.source_id, key)
            .await?
            .unwrap_or_default())
    }

    pub async fn server_url(&self) -> anyhow::Result<String> {
        self.read(SERVER_URL_KEY).await
    }

    pub async fn api_key(&self) -> anyhow::Result<String> {
        self.read(API_KEY_KEY).await
    }

    pub async fn user_id(&self) -> anyhow::Result<String> {
        self.read(USER_ID_KEY).await
    }

    /// Store a normalized server URL. Returns whether the stored value changed.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn set_server_url(&self, raw: &str) -> anyhow::Result<bool> {
        let normalized = normalize_server_url(raw);
        if normalized == self.server_url().await? {
            return Ok(false);
        }
        self.store
            .set(self.source_id, SERVER_URL_KEY, &normalized)
            .await?;
        self.store.remove(self.source_id, USER_ID_KEY).await?;
        tracing::info!(server_url = %normalized, "server url changed");
        Ok(true)
    }

    /// Store an API key. Returns whether the stored value changed.
    #[tracing::instrument(level = "debug", skip(self, api_key))]
    pub async fn set_api_key(&self, api_key: &str) -> anyhow::Result<bool> {
        let api_key = api_key.trim();
        if api_key == self.api_key().await? {
            return Ok(false);
        }
        self.store.set(self.source_id, API_KEY_KEY, api_key).await?;
        self.store.remove(self.source_id, USER_ID_KEY).await?;
        tracing::info!(has_api_key = !api_key.is_empty(), "api key changed");
        Ok(true)
    }

    /// Forget the API key and the user id resolved with it.
    pub async fn invalidate(&self) -> anyhow::Result<()> {
        self.store.remove(self.source_id, API_KEY_KEY).await?;
        self.store.remove(self.source_id, USER_ID_KEY).await?;
        Ok(())
    }

    /// Pass a call result through, invalidating the session on a 401.
    pub async fn observe<T>(&self, result: Result<T, ApiError>) -> Result<T, ApiError> {
        if let Err(err) = &result {
            if err.is_unauthorized() {
                tracing::warn!(source_id = %self.source_id, "server rejected the api key, clearing credentials");
                if let Err(e) = self.invalidate().await {
                    tracing::error!(error = %format!("{:?}", e), "failed to clear credentials");
                }
            }
        }
        result
    }

    /// Resolve credentials, probing the server only when no user id is cached.
    #[tracing::instrument(level = "debug", skip(self, factory), fields(source_id = %self.source_id))]
    pub async fn ensure(&self, factory: &dyn ClientFactory) -> Result<Credentials, SourceError> {
        let server_url = self.server_url().await?;
        let api_key = self.api_key().await?;
        let user_id = self.user_id().await?;
        if !api_key.is_empty() && !user_id.is_empty() {
            return Ok(Credentials {
                server_url,
                api_key,
                user_id,
            });
        }

        if server_url.is_empty() {
            return Err(ConfigError::MissingServerUrl.into());
        }
        if api_key.is_empty() {
            return Err(ConfigError::MissingApiKey.into());
        }

        let api = factory.connect(&server_url, &api_key);
        let info = self
            .observe(api.system_info().await)
            .await
            .map_err(AuthError::from)?;
        tracing::info!(
            server = info.server_name.as_deref().unwrap_or(""),
            version = info.version.as_deref().unwrap_or(""),
            "connected to media server"
        );

        let users = self
            .observe(api.users().await)
            .await
            .map_err(AuthError::from)?;
        let user = users.into_iter().next().ok_or(AuthError::NoUsers)?;
        self.store
            .set(self.source_id, USER_ID_KEY, &user.id)
            .await?;
        tracing::debug!(user_id = %user.id, user = %user.name, "resolved session user");

        Ok(Credentials {
            server_url,
            api_key,
            user_id: user.id,
        })
    }
}

/// Ensure a scheme is present and drop trailing slashes.
pub fn normalize_server_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let lower = trimmed.to_ascii_lowercase();
    let (scheme, rest) = if lower.starts_with("https://") {
        (&trimmed[..8], &trimmed[8..])
    } else if lower.starts_with("http://") {
        (&trimmed[..7], &trimmed[7..])
    } else {
        ("http://", trimmed)
    };
    let host = rest.trim_end_matches('/');
    if host.is_empty() {
        return String::new();
    }
    format!("{}{}", scheme, host)
}
