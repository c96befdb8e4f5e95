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
use std::{sync::LazyLock, time::Duration};
use cloneable_errors::{ErrorContext, anyhow};

pub static TOKEN_READ_ERR:  LazyLock<ErrorContext> = LazyLock::new(|| anyhow!("Failed to acquire the token slot for reading"));
pub static TOKEN_WRITE_ERR: LazyLock<ErrorContext> = LazyLock::new(|| anyhow!("Failed to acquire the token slot for writing"));

pub const DEFAULT_API_URL: &str = "https://api.redgifs.com/";
pub const DEFAULT_MEDIA_PREFIX: &str = "https://media.redgifs.com/";
/// Temporary tokens live for a day, refresh them long before that
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(50 * 60);

pub const AUTH_PATH: &str = "v2/auth/temporary";
pub const GIFS_PATH: &str = "v2/gifs/";

pub const DEFAULT_VIDEO_CONTENT_TYPE: &str = "video/mp4";

pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
