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

use actix_web::http::{header::{HeaderMap, HeaderValue, TryIntoHeaderPair}, StatusCode};

/// reqwest and actix-web depend on different major versions of the `http` crate
pub fn convert_status(status: reqwest::StatusCode) -> Option<StatusCode> {
    StatusCode::from_u16(status.as_u16()).ok()
}

/// Copies a reqwest header value into an actix-web one, see [`convert_status`]
pub fn convert_header(value: &reqwest::header::HeaderValue) -> Option<HeaderValue> {
    HeaderValue::from_bytes(value.as_bytes()).ok()
}

pub trait HeaderMapExt {
    fn append_header<H: TryIntoHeaderPair>(&mut self, header: H) -> std::result::Result<(), H::Error>;
}

impl HeaderMapExt for HeaderMap {
    fn append_header<H: TryIntoHeaderPair>(&mut self, header: H) -> std::result::Result<(), H::Error> {
        let (name, value) = header.try_into_pair()?;
        self.append(name, value);
        Ok(())
    }
}

/// Renders a duration as nanoseconds with digit groups separated by spaces
pub fn render_duration(duration: &Duration) -> String {
    let digits = duration.as_nanos().to_string();
    let groups = digits.as_bytes()
        .rchunks(3)   // groups of 3, starting from the end
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
        .collect::<Vec<_>>();
    groups.join(" ")
}
