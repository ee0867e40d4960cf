use serde::Deserialize;
use thiserror::Error;
use workhive_config::GoogleSettings;

#[derive(Debug, Error)]
pub enum GoogleAuthError {
    #[error("Google token verification failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Google rejected the token")]
    Rejected,
    #[error("Token audience mismatch")]
    AudienceMismatch,
}

/// Claims returned by Google's tokeninfo endpoint for an ID token.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    pub aud: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

/// Delegates ID-token verification to Google's tokeninfo endpoint; only the
/// audience is checked locally.
pub struct GoogleVerifier {
    settings: GoogleSettings,
    http: reqwest::Client,
}

impl GoogleVerifier {
    pub fn new(settings: GoogleSettings) -> Self {
        Self {
            settings,
            http: reqwest::Client::new(),
        }
    }

    pub async fn verify(&self, id_token: &str) -> Result<GoogleProfile, GoogleAuthError> {
        let response = self
            .http
            .get(&self.settings.tokeninfo_url)
            .query(&[("id_token", id_token)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GoogleAuthError::Rejected);
        }

        let profile: GoogleProfile = response.json().await?;

        if profile.aud != self.settings.client_id {
            return Err(GoogleAuthError::AudienceMismatch);
        }

        Ok(profile)
    }
}
