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
#![allow(clippy::needless_pass_by_value)]
use actix_web::{get, http::header, web, HttpRequest, HttpResponse};
use chrono::DateTime;
use cloneable_errors::anyhow;
use log::{error, warn};
use redgifs_viewer_api::StatusResponse;
use serde::Deserialize;
use serde_json::Value;

use crate::{built_info, errors::{Error, Result}, proxy::VideoProxy, redgifs::MetadataFetcher, state::AppConfig};

pub const VIDEO_FETCH_FAILED_MSG: &str = "Failed to fetch video";

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_metadata)
       .service(proxy_video)
       .service(get_status);
}

type JsonResult<T> = Result<web::Json<T>>;

#[derive(Deserialize)]
struct MetadataParams {
    id: Option<String>,
}

#[derive(Deserialize)]
struct ProxyParams {
    url: Option<String>,
}

#[get("/redgifs")]
async fn get_metadata(query: web::Query<MetadataParams>, fetcher: web::Data<MetadataFetcher>) -> JsonResult<Value> {
    let id = query.id.as_deref().unwrap_or_default();
    match fetcher.fetch_metadata(id).await {
        Ok(metadata) => Ok(web::Json(metadata)),
        Err(err) => {
            if !err.is_client_error() {
                error!("Error fetching RedGifs data for {id:?}: {err:?}");
            }
            Err(err)
        },
    }
}

#[get("/proxy-video")]
async fn proxy_video(req: HttpRequest, query: web::Query<ProxyParams>, proxy: web::Data<VideoProxy>) -> Result<HttpResponse> {
    let range = req.headers().get(header::RANGE).and_then(|value| match value.to_str() {
        Ok(range) => Some(range),
        Err(_) => {
            warn!("Ignoring a non-ASCII Range header: {value:?}");
            None
        },
    });

    proxy.proxy(query.url.as_deref(), range).await.map_err(|err| {
        if err.is_client_error() {
            return err;
        }
        error!("Proxy video error: {err:?}");
        Error::upstream(None, anyhow!(VIDEO_FETCH_FAILED_MSG))
    })
}

#[get("/status")]
async fn get_status(config: web::Data<AppConfig>, fetcher: web::Data<MetadataFetcher>) -> web::Json<StatusResponse> {
    let expires_in = fetcher.tokens().expires_in();
    web::Json(StatusResponse {
        server_version: Some(built_info::PKG_VERSION.into()),
        server_git_hash: built_info::GIT_COMMIT_HASH.map(std::convert::Into::into),
        server_git_dirty: built_info::GIT_DIRTY,
        server_build_timestamp: DateTime::parse_from_rfc2822(built_info::BUILT_TIME_UTC).ok().map(|t| t.timestamp()),
        server_startup_timestamp: Some(config.startup_timestamp.timestamp()),
        token_cached: expires_in.is_some(),
        token_expires_in: expires_in.map(|d| d.as_secs()),
    })
}
