// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Parse server-suggested delays.
//!
//! Management services suggest how long a client should wait before retrying
//! a request, or before polling a long-running operation again. The suggestion
//! may appear in any of these headers, checked in this order:
//!
//! * `retry-after-ms`: an integer number of milliseconds.
//! * `x-ms-retry-after-ms`: an integer number of milliseconds.
//! * `Retry-After`: either an integer number of seconds, or an HTTP-date.

use http::HeaderMap;
use std::time::Duration;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc2822;

pub const RETRY_AFTER_MS: &str = "retry-after-ms";
pub const X_MS_RETRY_AFTER_MS: &str = "x-ms-retry-after-ms";

/// Returns the delay suggested by the service, if any.
///
/// Values that cannot be parsed are ignored. HTTP-dates in the past produce a
/// zero delay.
///
/// # Example
/// ```
/// # use gax::retry_after::from_headers;
/// # use std::time::Duration;
/// let mut headers = http::HeaderMap::new();
/// headers.insert("retry-after", http::HeaderValue::from_static("7"));
/// assert_eq!(from_headers(&headers), Some(Duration::from_secs(7)));
/// ```
pub fn from_headers(headers: &HeaderMap) -> Option<Duration> {
    from_headers_at(headers, OffsetDateTime::now_utc())
}

fn from_headers_at(headers: &HeaderMap, now: OffsetDateTime) -> Option<Duration> {
    for name in [RETRY_AFTER_MS, X_MS_RETRY_AFTER_MS] {
        if let Some(ms) = header_str(headers, name).and_then(|v| v.parse::<u64>().ok()) {
            return Some(Duration::from_millis(ms));
        }
    }
    let value = header_str(headers, http::header::RETRY_AFTER.as_str())?;
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }
    let when = OffsetDateTime::parse(value, &Rfc2822).ok()?;
    let delta = when - now;
    Some(Duration::try_from(delta).unwrap_or(Duration::ZERO))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
