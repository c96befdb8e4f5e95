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

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Body of every error response returned by the `/api` endpoints
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: Arc<str>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(default)]
pub struct StatusResponse {
    // general server build data
    pub server_version: Option<Arc<str>>,
    pub server_git_hash: Option<Arc<str>>,
    pub server_git_dirty: Option<bool>,
    pub server_build_timestamp: Option<i64>,
    pub server_startup_timestamp: Option<i64>,
    // token cache state
    pub token_cached: bool,
    pub token_expires_in: Option<u64>,
}

/// Response of the `/v2/auth/temporary` endpoint
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AuthResponse {
    pub token: Arc<str>,
}

/// Typed view of the `/v2/gifs/{id}` payload.
///
/// The server relays that payload untouched, this is only the subset clients
/// usually care about. Unknown fields are ignored.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GifResponse {
    pub gif: Gif,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Gif {
    #[serde(default)]
    pub id: Option<Arc<str>>,
    pub urls: GifUrls,
    #[serde(default)]
    pub tags: Vec<Arc<str>>,
    #[serde(rename="createDate", default)]
    pub create_date: Option<i64>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub views: Option<u64>,
    #[serde(rename="hasAudio", default)]
    pub has_audio: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(default)]
pub struct GifUrls {
    pub hd: Option<Arc<str>>,
    pub sd: Option<Arc<str>>,
    pub poster: Option<Arc<str>>,
}

impl GifResponse {
    /// Best available video URL - HD if present, SD otherwise
    pub fn video_url(&self) -> Option<&str> {
        self.gif.urls.hd.as_deref()
            .or(self.gif.urls.sd.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gif_response_ignores_unknown_fields() {
        let payload = r#"{
            "gif": {
                "id": "abc123",
                "urls": {
                    "hd": "https://media.redgifs.com/abc123.mp4",
                    "sd": "https://media.redgifs.com/abc123-mobile.mp4",
                    "poster": "https://media.redgifs.com/abc123-poster.jpg",
                    "thumbnail": "https://media.redgifs.com/abc123-mobile.jpg"
                },
                "tags": ["Cute", "Funny"],
                "createDate": 1700000000,
                "duration": 12.5,
                "views": 4242,
                "hasAudio": true,
                "niches": []
            },
            "user": null
        }"#;
        let resp: GifResponse = serde_json::from_str(payload).unwrap();
        assert_eq!(resp.video_url(), Some("https://media.redgifs.com/abc123.mp4"));
        assert_eq!(resp.gif.tags.len(), 2);
        assert_eq!(resp.gif.create_date, Some(1_700_000_000));
        assert!(resp.gif.has_audio);
    }

    #[test]
    fn video_url_falls_back_to_sd() {
        let resp: GifResponse = serde_json::from_str(r#"{"gif":{"urls":{"sd":"https://media.redgifs.com/x-mobile.mp4"}}}"#).unwrap();
        assert_eq!(resp.video_url(), Some("https://media.redgifs.com/x-mobile.mp4"));
        assert!(!resp.gif.has_audio);
        assert!(resp.gif.tags.is_empty());
    }

    #[test]
    fn auth_response_requires_token() {
        assert!(serde_json::from_str::<AuthResponse>(r#"{"token":"abc","addr":"1.2.3.4"}"#).is_ok());
        assert!(serde_json::from_str::<AuthResponse>(r#"{"session":"abc"}"#).is_err());
    }
}
