/* This file is part of the RedGifs Viewer project
*
*  Copyright (C) 2026 RedGifs Viewer contributors
*
*  This program is free software: you can redistribute it and/or modify
*  it under the terms of the GNU Affero General Public License as published by
*  the Free Software Foundation, either version 3 of the License, or
*  (at your option) any later version.
*
*  This program is distributed in the hope that it will be useful,
*  but WITHOUT ANY WARRANTY; without even the implied warranty of
*  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
*  GNU Affero General Public License for more details.
*
*  You should have received a copy of the GNU Affero General Public License
*  along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/
use std::{sync::{Arc, RwLock}, time::{Duration, Instant}};

use cloneable_errors::{ErrorContext, ResContext};
use log::{debug, info};
use redgifs_viewer_api::AuthResponse;
use reqwest::{Client, Url};

use crate::constants::*;

struct CachedToken {
    value: Arc<str>,
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Process-wide single-slot cache for the RedGifs temporary token.
///
/// Refreshes are not deduplicated: two requests racing past an expired token will both fetch
/// a new one, and the last write wins. Temporary tokens are interchangeable, so that's fine.
pub struct TokenCache {
    client: Client,
    auth_url: Url,
    ttl: Duration,
    timeout: Duration,
    slot: RwLock<Option<CachedToken>>,
}

impl TokenCache {
    pub fn new(client: Client, api_url: &Url, ttl: Duration, timeout: Duration) -> Result<TokenCache, ErrorContext> {
        let auth_url = api_url.join(AUTH_PATH).with_context(|| format!("Failed to build the auth URL from {api_url}"))?;
        Ok(TokenCache {
            client,
            auth_url,
            ttl,
            timeout,
            slot: RwLock::new(None),
        })
    }

    /// Returns the cached token, fetching a new one if there is none, it expired, or `force_refresh` is set
    pub async fn get(&self, force_refresh: bool) -> Result<Arc<str>, ErrorContext> {
        if !force_refresh {
            let slot = self.slot.read().map_err(|_| TOKEN_READ_ERR.clone())?;
            if let Some(ref token) = *slot {
                if token.is_valid(Instant::now()) {
                    return Ok(token.value.clone());
                }
            }
        }

        let value = self.fetch().await?;
        let expires_at = Instant::now() + self.ttl;
        {
            let mut slot = self.slot.write().map_err(|_| TOKEN_WRITE_ERR.clone())?;
            *slot = Some(CachedToken { value: value.clone(), expires_at });
        }
        info!("Obtained a new temporary token, valid for {}s", self.ttl.as_secs());
        Ok(value)
    }

    pub async fn force_refresh(&self) -> Result<Arc<str>, ErrorContext> {
        self.get(true).await
    }

    /// Remaining lifetime of the cached token, `None` if there is no valid token
    pub fn expires_in(&self) -> Option<Duration> {
        let slot = self.slot.read().ok()?;
        let token = slot.as_ref()?;
        let now = Instant::now();
        token.is_valid(now).then(|| token.expires_at - now)
    }

    async fn fetch(&self) -> Result<Arc<str>, ErrorContext> {
        debug!("Requesting a temporary token from {}", self.auth_url);
        let resp = self.client.get(self.auth_url.clone())
            .timeout(self.timeout)
            .send().await.context("Failed to send the temporary token request")?;
        let resp = resp.error_for_status().context("Temporary token request failed")?;
        let auth: AuthResponse = resp.json().await.context("Failed to deserialize the temporary token response")?;
        Ok(auth.token)
    }
}
