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
use std::{fs::{Permissions, set_permissions}, os::unix::prelude::PermissionsExt, path::Path};
use actix_files::Files;
use actix_web::{HttpServer, App, web, middleware::{Condition, Logger, NormalizePath}};
use cloneable_errors::{ErrorContext, ResContext};
use env_logger::Env;
use log::info;
use reqwest::{Client, Url};

mod constants;
mod errors;
mod middleware;
mod proxy;
mod redgifs;
mod routes;
mod state;
mod token;
mod utils;

use constants::USER_AGENT;
use proxy::VideoProxy;
use redgifs::MetadataFetcher;
use state::AppConfig;

const CONFIG_PATH: &str = "config.toml";


#[actix_web::main]
async fn main() -> Result<(), ErrorContext> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let config = web::Data::new(AppConfig::load_or_create(Path::new(CONFIG_PATH))?);
    let timeout = config.timeout()?;

    let client = Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(timeout)
        .build()
        .context("Failed to build the HTTP client")?;
    let api_url = Url::parse(&config.redgifs.api_url).context("Failed to parse redgifs.api_url")?;

    // created once, outside the worker factory, so that all workers share a single token slot
    let fetcher = web::Data::new(MetadataFetcher::new(client.clone(), &api_url, config.token_ttl(), timeout)?
        .refresh_on_unauthorized(config.redgifs.refresh_token_on_unauthorized));
    let proxy = web::Data::new(VideoProxy::new(client, config.redgifs.media_prefix.clone(), timeout));
    info!("Using RedGifs API at {api_url}, proxying videos under {}", config.redgifs.media_prefix);

    let mut server = {
        let config = config.clone();
        HttpServer::new(move || {
            App::new()
                .wrap(Condition::new(config.enable_timings_header, middleware::Timings))
                .wrap(NormalizePath::trim())
                .wrap(Logger::default())
                .app_data(config.clone())
                .app_data(fetcher.clone())
                .app_data(proxy.clone())
                .service(web::scope("/api")
                    .configure(routes::configure)
                )
                .service(
                    Files::new("/", config.static_content_path.as_path())
                        .index_file("index.html")
                )
        })
    };
    if let Some((ref ip, port)) = config.listen.tcp {
        let ip_str = ip.as_str();
        server = server.bind((ip_str, port)).with_context(|| format!("Failed to bind to tcp port {ip_str}:{port}"))?;
        info!("Listening on {ip_str}:{port}");
    }
    if let Some(ref path) = config.listen.unix {
        let path_str = path.as_str();
        server = server.bind_uds(path_str).with_context(|| format!("Failed to bind to unix socket {path_str}"))?;
        if let Some(mode) = config.listen.unix_mode {
            let perms = Permissions::from_mode(mode);
            set_permissions(path_str, perms).with_context(|| format!("Failed to change mode of unix socket {path_str} to {mode}"))?;
        }
        info!("Listening on {path_str}");
    }
    server.run()
    .await
    .context("Error while running the server")
}

mod built_info {
    // Contents generated by buildscript, using built
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}
