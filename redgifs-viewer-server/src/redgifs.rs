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
use std::time::Duration;

use cloneable_errors::{anyhow, ErrorContext, ResContext};
use log::{debug, warn};
use reqwest::{Client, Url};
use serde_json::Value;

use crate::{constants::*, errors::{Error, Result}, token::TokenCache, utils};

pub const MISSING_ID_MSG: &str = "Missing redgifsId parameter";

/// Fetches gif metadata from the RedGifs API, authenticating with a cached temporary token
pub struct MetadataFetcher {
    client: Client,
    gifs_url: Url,
    timeout: Duration,
    tokens: TokenCache,
    refresh_on_unauthorized: bool,
}

impl MetadataFetcher {
    pub fn new(client: Client, api_url: &Url, token_ttl: Duration, timeout: Duration) -> std::result::Result<MetadataFetcher, ErrorContext> {
        let gifs_url = api_url.join(GIFS_PATH).with_context(|| format!("Failed to build the gifs URL from {api_url}"))?;
        if gifs_url.cannot_be_a_base() {
            return Err(anyhow!("The RedGifs API URL must be a http(s) URL, got {api_url}"));
        }
        Ok(MetadataFetcher {
            tokens: TokenCache::new(client.clone(), api_url, token_ttl, timeout)?,
            client,
            gifs_url,
            timeout,
            refresh_on_unauthorized: false,
        })
    }

    /// When enabled, a 401 from the API forces a token refresh and the request is retried once
    #[must_use]
    pub fn refresh_on_unauthorized(mut self, enabled: bool) -> Self {
        self.refresh_on_unauthorized = enabled;
        self
    }

    pub fn tokens(&self) -> &TokenCache {
        &self.tokens
    }

    fn gif_url(&self, id: &str) -> std::result::Result<Url, ErrorContext> {
        let mut url = self.gifs_url.clone();
        url.path_segments_mut().ok().context("The gifs URL cannot be a base")?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }

    async fn send(&self, url: Url, token: &str) -> Result<reqwest::Response> {
        self.client.get(url)
            .bearer_auth(token)
            .timeout(self.timeout)
            .send().await
            .context("Failed to send the metadata request")
            .map_err(|e| Error::upstream(None, e))
    }

    /// Returns the metadata payload for `id` exactly as the API sent it
    pub async fn fetch_metadata(&self, id: &str) -> Result<Value> {
        if id.is_empty() {
            return Err(Error::MissingParameter(MISSING_ID_MSG));
        }
        let url = self.gif_url(id).map_err(|e| Error::upstream(None, e))?;
        let token = self.tokens.get(false).await.map_err(Error::UpstreamAuth)?;

        debug!("Fetching metadata for {id}");
        let mut resp = self.send(url.clone(), &token).await?;
        if resp.status() == reqwest::StatusCode::UNAUTHORIZED && self.refresh_on_unauthorized {
            warn!("Metadata request for {id} was rejected with 401, retrying with a fresh token");
            let token = self.tokens.force_refresh().await.map_err(Error::UpstreamAuth)?;
            resp = self.send(url, &token).await?;
        }

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::upstream(
                utils::convert_status(status),
                anyhow!("Request failed with status code {}", status.as_u16()),
            ));
        }

        resp.json().await
            .context("Failed to deserialize the metadata response")
            .map_err(|e| Error::upstream(None, e))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use serde_json::json;
    use wiremock::{matchers::{header, method, path}, Mock, MockServer, ResponseTemplate};

    use super::*;

    fn fetcher_for(server: &MockServer) -> MetadataFetcher {
        let api_url = Url::parse(&format!("{}/", server.uri())).unwrap();
        MetadataFetcher::new(Client::new(), &api_url, Duration::from_secs(3600), Duration::from_secs(5)).unwrap()
    }

    async fn mount_auth(server: &MockServer, expected_calls: u64) {
        Mock::given(method("GET")).and(path("/v2/auth/temporary"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "tok"})))
            .expect(expected_calls)
            .mount(server).await;
    }

    #[actix_web::test]
    async fn empty_id_makes_no_requests() {
        let server = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server).await;

        let err = fetcher_for(&server).fetch_metadata("").await.unwrap_err();
        assert!(matches!(err, Error::MissingParameter(MISSING_ID_MSG)));
    }

    #[actix_web::test]
    async fn sends_bearer_token_and_reuses_it() {
        let server = MockServer::start().await;
        mount_auth(&server, 1).await;
        let payload = json!({"gif": {"id": "abc123", "urls": {"hd": "https://media.redgifs.com/abc123.mp4"}}});
        Mock::given(method("GET")).and(path("/v2/gifs/abc123")).and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&payload))
            .expect(2)
            .mount(&server).await;

        let fetcher = fetcher_for(&server);
        assert_eq!(fetcher.fetch_metadata("abc123").await.unwrap(), payload);
        assert_eq!(fetcher.fetch_metadata("abc123").await.unwrap(), payload);
        assert!(fetcher.tokens().expires_in().is_some());
    }

    #[actix_web::test]
    async fn id_is_a_single_path_segment() {
        let server = MockServer::start().await;
        mount_auth(&server, 1).await;
        Mock::given(method("GET")).and(path("/v2/gifs/a%2Fb"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"gif": null})))
            .expect(1)
            .mount(&server).await;

        fetcher_for(&server).fetch_metadata("a/b").await.unwrap();
    }

    #[actix_web::test]
    async fn upstream_status_is_kept() {
        let server = MockServer::start().await;
        mount_auth(&server, 1).await;
        Mock::given(method("GET")).and(path("/v2/gifs/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": {"code": "NotFound"}})))
            .expect(1)
            .mount(&server).await;

        let err = fetcher_for(&server).fetch_metadata("missing").await.unwrap_err();
        match err {
            Error::UpstreamFetch { status, ref error } => {
                assert_eq!(status, Some(StatusCode::NOT_FOUND));
                assert_eq!(error.to_string(), "Request failed with status code 404");
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[actix_web::test]
    async fn token_failure_skips_the_metadata_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET")).and(path("/v2/auth/temporary"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server).await;
        Mock::given(method("GET")).and(path("/v2/gifs/abc123"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server).await;

        let err = fetcher_for(&server).fetch_metadata("abc123").await.unwrap_err();
        assert!(matches!(err, Error::UpstreamAuth(..)));
    }

    #[actix_web::test]
    async fn unauthorized_is_not_retried_by_default() {
        let server = MockServer::start().await;
        mount_auth(&server, 1).await;
        Mock::given(method("GET")).and(path("/v2/gifs/abc123"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server).await;

        let err = fetcher_for(&server).fetch_metadata("abc123").await.unwrap_err();
        assert!(matches!(err, Error::UpstreamFetch { status: Some(StatusCode::UNAUTHORIZED), .. }));
    }

    #[actix_web::test]
    async fn unauthorized_refreshes_the_token_when_enabled() {
        let server = MockServer::start().await;
        Mock::given(method("GET")).and(path("/v2/auth/temporary"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "stale"})))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server).await;
        Mock::given(method("GET")).and(path("/v2/auth/temporary"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "fresh"})))
            .expect(1)
            .mount(&server).await;
        Mock::given(method("GET")).and(path("/v2/gifs/abc123")).and(header("authorization", "Bearer stale"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server).await;
        Mock::given(method("GET")).and(path("/v2/gifs/abc123")).and(header("authorization", "Bearer fresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"gif": {"urls": {}}})))
            .expect(1)
            .mount(&server).await;

        let api_url = Url::parse(&format!("{}/", server.uri())).unwrap();
        let fetcher = MetadataFetcher::new(Client::new(), &api_url, Duration::from_secs(3600), Duration::from_secs(5)).unwrap()
            .refresh_on_unauthorized(true);
        fetcher.fetch_metadata("abc123").await.unwrap();
    }

    #[actix_web::test]
    async fn non_json_body_is_an_upstream_error() {
        let server = MockServer::start().await;
        mount_auth(&server, 1).await;
        Mock::given(method("GET")).and(path("/v2/gifs/abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>cloudflare</html>"))
            .mount(&server).await;

        let err = fetcher_for(&server).fetch_metadata("abc123").await.unwrap_err();
        assert!(matches!(err, Error::UpstreamFetch { status: None, .. }));
    }
}
