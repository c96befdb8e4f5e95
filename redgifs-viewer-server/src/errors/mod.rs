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

use std::fmt::{Debug, Display};
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use cloneable_errors::ErrorContext;
use redgifs_viewer_api::ErrorResponse;

pub enum Error {
    /// A required query parameter was absent or empty
    MissingParameter(&'static str),
    /// The video URL did not start with the trusted media prefix
    InvalidUrl,
    /// Could not obtain a temporary token
    UpstreamAuth(ErrorContext),
    /// The metadata API or the media server failed or returned a non-success status.
    /// `status` is the upstream status, if we got that far.
    UpstreamFetch {
        status: Option<StatusCode>,
        error: ErrorContext,
    },
}

impl Error {
    pub fn upstream(status: Option<StatusCode>, error: ErrorContext) -> Self {
        Error::UpstreamFetch { status, error }
    }

    /// Whether this error was caused by the client's request rather than an upstream failure
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::MissingParameter(..) | Error::InvalidUrl)
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::MissingParameter(msg) => f.debug_tuple("Error::MissingParameter").field(msg).finish(),
            Error::InvalidUrl => f.write_str("Error::InvalidUrl"),
            Error::UpstreamAuth(ref err) => Debug::fmt(err, f),
            Error::UpstreamFetch { status: Some(status), ref error } => write!(f, "[upstream status {status}] {error:?}"),
            Error::UpstreamFetch { status: None, ref error } => Debug::fmt(error, f),
        }
    }
}
impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::MissingParameter(msg) => f.write_str(msg),
            Error::InvalidUrl => f.write_str("Invalid video URL"),
            Error::UpstreamAuth(ref err) | Error::UpstreamFetch { error: ref err, .. } => Display::fmt(err, f),
        }
    }
}
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::UpstreamAuth(ref err) | Error::UpstreamFetch { error: ref err, .. } => Some(err),
            Error::MissingParameter(..) | Error::InvalidUrl => None,
        }
    }
}
impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingParameter(..) | Error::InvalidUrl => StatusCode::BAD_REQUEST,
            Error::UpstreamAuth(..) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::UpstreamFetch { status, .. } => status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string().into(),
        })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
