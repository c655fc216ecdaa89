//! Access-token refresh coordination.
//!
//! # Design Decisions
//! - One timer task per coordinator; `start` cancels any previous task
//!   before scheduling a new one, so at most one timer is ever active
//! - A failed refresh leaves the stale token in place and stops the loop;
//!   callers observe staleness through `current`

use std::sync::{Arc, Mutex};
use std::time::Duration;

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tokio::task::JoinHandle;
use url::Url;

/// A short-lived API credential and when it stops working.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Error exchanging the refresh token.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("refresh request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("refresh rejected with status {0}")]
    Rejected(reqwest::StatusCode),
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: String,
    access_expiration: DateTime<Utc>,
}

/// How long before expiry the refresh fires unless overridden.
pub const DEFAULT_LEAD: Duration = Duration::from_secs(5);

/// Keeps one access token fresh by exchanging the refresh token shortly
/// before expiry.
pub struct TokenRefresher {
    endpoint: Url,
    client: reqwest::Client,
    lead: Duration,
    current: Arc<ArcSwapOption<AccessToken>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl TokenRefresher {
    pub fn new(endpoint: Url, client: reqwest::Client) -> Self {
        Self {
            endpoint,
            client,
            lead: DEFAULT_LEAD,
            current: Arc::new(ArcSwapOption::empty()),
            task: Mutex::new(None),
        }
    }

    /// Override how long before expiry the refresh fires.
    pub fn with_lead(mut self, lead: Duration) -> Self {
        self.lead = lead;
        self
    }

    /// The token the coordinator currently holds.
    pub fn current(&self) -> Option<Arc<AccessToken>> {
        self.current.load_full()
    }

    /// Whether a refresh timer is active.
    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .expect("refresher lock poisoned")
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Start (or restart) the refresh loop with a freshly issued token.
    /// Any previous timer is canceled before the new one is scheduled.
    pub fn start(&self, access: AccessToken, refresh_token: impl Into<String>) {
        let refresh_token = refresh_token.into();
        self.current.store(Some(Arc::new(access.clone())));

        let endpoint = self.endpoint.clone();
        let client = self.client.clone();
        let lead = self.lead;
        let slot = Arc::clone(&self.current);

        let mut task = self.task.lock().expect("refresher lock poisoned");
        if let Some(previous) = task.take() {
            previous.abort();
        }
        *task = Some(tokio::spawn(async move {
            let mut access = access;
            loop {
                sleep_until_refresh(&access, lead).await;
                match refresh_once(&client, &endpoint, &refresh_token).await {
                    Ok(next) => {
                        tracing::debug!(expires_at = %next.expires_at, "Access token refreshed");
                        slot.store(Some(Arc::new(next.clone())));
                        access = next;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Token refresh failed, keeping stale token");
                        break;
                    }
                }
            }
        }));
    }

    /// Cancel the refresh timer. The current token is left in place.
    pub fn stop(&self) {
        if let Some(handle) = self
            .task
            .lock()
            .expect("refresher lock poisoned")
            .take()
        {
            handle.abort();
        }
    }
}

impl Drop for TokenRefresher {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn sleep_until_refresh(access: &AccessToken, lead: Duration) {
    let lead = chrono::Duration::from_std(lead).unwrap_or_else(|_| chrono::Duration::zero());
    let wait = (access.expires_at - lead - Utc::now())
        .to_std()
        .unwrap_or(Duration::ZERO);
    tokio::time::sleep(wait).await;
}

async fn refresh_once(
    client: &reqwest::Client,
    endpoint: &Url,
    refresh_token: &str,
) -> Result<AccessToken, RefreshError> {
    let response = client
        .post(endpoint.clone())
        .json(&serde_json::json!({ "refresh": refresh_token }))
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(RefreshError::Rejected(response.status()));
    }

    let parsed: RefreshResponse = response.json().await?;
    Ok(AccessToken {
        token: parsed.access,
        expires_at: parsed.access_expiration,
    })
}
