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
use std::{fs::File, io::{self, Read, Write}, path::{Path, PathBuf}, time::Duration};

use chrono::{DateTime, Utc};
use cloneable_errors::{bail, ErrContext, ErrorContext, ResContext};
use serde::{Serialize, Deserialize};

use crate::constants::*;

#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub static_content_path: PathBuf,
    pub listen: ListenConfig,
    pub reqwest_timeout_secs: f64,
    #[serde(skip)]
    pub startup_timestamp: DateTime<Utc>,
    pub redgifs: RedgifsConfig,
    pub enable_timings_header: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            static_content_path: PathBuf::from("./static"),
            listen: ListenConfig::default(),
            reqwest_timeout_secs: 20.,
            startup_timestamp: Utc::now(),
            redgifs: RedgifsConfig::default(),
            enable_timings_header: false,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct RedgifsConfig {
    /// Base URL of the RedGifs API, the auth & gifs endpoints are resolved against it
    pub api_url: String,
    /// Only URLs starting with this prefix will be proxied
    pub media_prefix: String,
    pub token_ttl_secs: u64,
    /// Retry a metadata request once with a fresh token if the API answers 401
    pub refresh_token_on_unauthorized: bool,
}

impl Default for RedgifsConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            media_prefix: DEFAULT_MEDIA_PREFIX.to_owned(),
            token_ttl_secs: DEFAULT_TOKEN_TTL.as_secs(),
            refresh_token_on_unauthorized: false,
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct ListenConfig {
    pub tcp: Option<(String, u16)>,
    pub unix: Option<String>,
    pub unix_mode: Option<u32>,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            tcp: Some(("0.0.0.0".to_owned(), 9292)),
            unix: None,
            unix_mode: None,
        }
    }
}

impl AppConfig {
    /// Reads the config file, or writes out the default config if it doesn't exist yet
    pub fn load_or_create(path: &Path) -> Result<AppConfig, ErrorContext> {
        let cfg = match File::open(path) {
            Ok(mut file) => {
                let mut contents = String::new();
                file.read_to_string(&mut contents).with_context(|| format!("Failed to read {}", path.display()))?;
                toml::from_str(&contents).with_context(|| format!("Failed to deserialize contents of {}", path.display()))?
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let cfg = AppConfig::default();
                let serialized = toml::to_string(&cfg).context("Failed to serialize default AppConfig as TOML")?;
                let mut file = File::options().write(true).create_new(true).open(path).with_context(|| format!("Failed to create {}", path.display()))?;
                write!(file, "{serialized}").with_context(|| format!("Failed to write serialized default AppConfig to {}", path.display()))?;
                cfg
            },
            Err(e) => {
                return Err(e.context(format!("Failed to open {}", path.display())));
            }
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ErrorContext> {
        if self.listen.tcp.is_none() && self.listen.unix.is_none() {
            bail!("Invalid configuration - no tcp port or unix socket path specified");
        }
        reqwest::Url::parse(&self.redgifs.api_url).with_context(|| format!("Invalid configuration - could not parse redgifs.api_url '{}'", self.redgifs.api_url))?;
        if self.redgifs.media_prefix.is_empty() {
            bail!("Invalid configuration - redgifs.media_prefix must not be empty");
        }
        self.timeout()?;
        Ok(())
    }

    pub fn timeout(&self) -> Result<Duration, ErrorContext> {
        Duration::try_from_secs_f64(self.reqwest_timeout_secs)
            .with_context(|| format!("Invalid configuration - reqwest_timeout_secs must be a non-negative number, got {}", self.reqwest_timeout_secs))
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.redgifs.token_ttl_secs)
    }
}
