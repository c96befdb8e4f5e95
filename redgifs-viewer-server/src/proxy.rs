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

use actix_web::{http::header::{self, HeaderValue}, rt::time::timeout, HttpResponse};
use cloneable_errors::{anyhow, ResContext};
use log::debug;
use reqwest::Client;

use crate::{constants::*, errors::{Error, Result}, utils};

pub const MISSING_URL_MSG: &str = "Missing video URL";

/// A validated request for an upstream video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyRequest {
    target_url: String,
    range: Option<String>,
}

impl ProxyRequest {
    /// Checks `url` against the trusted prefix. Nothing is fetched here.
    pub fn new(url: Option<&str>, range: Option<&str>, allowed_prefix: &str) -> Result<ProxyRequest> {
        let url = match url {
            None | Some("") => return Err(Error::MissingParameter(MISSING_URL_MSG)),
            Some(url) => url,
        };
        if !url.starts_with(allowed_prefix) {
            return Err(Error::InvalidUrl);
        }
        Ok(ProxyRequest {
            target_url: url.to_owned(),
            range: range.map(ToOwned::to_owned),
        })
    }

    pub fn target_url(&self) -> &str {
        &self.target_url
    }

    pub fn range(&self) -> Option<&str> {
        self.range.as_deref()
    }
}

/// Same-origin pass-through for videos hosted on the media server
pub struct VideoProxy {
    client: Client,
    allowed_prefix: String,
    timeout: Duration,
}

impl VideoProxy {
    pub fn new(client: Client, allowed_prefix: String, timeout: Duration) -> VideoProxy {
        VideoProxy { client, allowed_prefix, timeout }
    }

    pub fn request(&self, url: Option<&str>, range: Option<&str>) -> Result<ProxyRequest> {
        ProxyRequest::new(url, range, &self.allowed_prefix)
    }

    /// Sends the upstream request. Only the `Range` header is forwarded.
    ///
    /// The timeout covers receiving the response head, the body may take as long as it needs.
    pub async fn fetch(&self, req: &ProxyRequest) -> Result<reqwest::Response> {
        let mut upstream = self.client.get(req.target_url());
        if let Some(range) = req.range() {
            upstream = upstream.header(reqwest::header::RANGE, range);
        }
        debug!("Proxying {} (range: {:?})", req.target_url(), req.range());

        let resp = timeout(self.timeout, upstream.send()).await
            .context("Timed out waiting for the media server")
            .map_err(|e| Error::upstream(None, e))?
            .context("Failed to send the video request")
            .map_err(|e| Error::upstream(None, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::upstream(
                utils::convert_status(status),
                anyhow!("Failed to fetch video: {} {}", status.as_u16(), status.canonical_reason().unwrap_or_default()),
            ));
        }
        Ok(resp)
    }

    /// Validate, fetch & relay in one go
    pub async fn proxy(&self, url: Option<&str>, range: Option<&str>) -> Result<HttpResponse> {
        let req = self.request(url, range)?;
        let resp = self.fetch(&req).await?;
        relay(resp)
    }
}

/// Turns a successful upstream response into a streaming response for the client.
///
/// The body stream owns the upstream response. When the client disconnects actix drops the
/// stream, which closes the upstream connection.
pub fn relay(resp: reqwest::Response) -> Result<HttpResponse> {
    let Some(status) = utils::convert_status(resp.status()) else {
        return Err(Error::upstream(None, anyhow!("Media server returned an unrepresentable status: {}", resp.status())));
    };
    let upstream_headers = resp.headers();
    let content_type = upstream_headers.get(reqwest::header::CONTENT_TYPE)
        .and_then(utils::convert_header)
        .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_VIDEO_CONTENT_TYPE));
    let content_range = upstream_headers.get(reqwest::header::CONTENT_RANGE)
        .and_then(utils::convert_header);

    let mut builder = HttpResponse::build(status);
    builder.insert_header((header::CONTENT_TYPE, content_type))
           .insert_header((header::ACCEPT_RANGES, "bytes"))
           .insert_header((header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"));
    if let Some(content_range) = content_range {
        builder.insert_header((header::CONTENT_RANGE, content_range));
    }
    // without a known length the response is sent chunked
    if let Some(len) = resp.content_length() {
        builder.no_chunking(len);
    }
    Ok(builder.streaming(resp.bytes_stream()))
}
