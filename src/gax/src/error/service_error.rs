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

use http::HeaderMap;
use serde::{Deserialize, Serialize};

/// The response header carrying the service error code.
pub const ERROR_CODE_HEADER: &str = "x-ms-error-code";

/// The error details returned by a management service.
///
/// Resource manager services report errors using a JSON envelope of the form
/// `{"error": {"code": "...", "message": "...", "details": [...]}}`. Some
/// services omit the envelope and return the inner object directly, and some
/// only report the code in the `x-ms-error-code` header. All three forms are
/// normalized to this type.
///
/// The same shape is used inside long-running operation status monitors, e.g.
/// `{"status": "Failed", "error": {"code": "...", "message": "..."}}`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct ServiceError {
    /// A machine readable error code, e.g. `ResourceNotFound`.
    pub code: String,
    /// A human readable description of the error.
    pub message: String,
    /// The target of the error, typically a field or resource name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Additional errors that contributed to this error.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ServiceError>,
    /// Service specific information, kept as raw JSON.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub additional_info: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct Envelope {
    error: ServiceError,
}

impl ServiceError {
    /// Returns the error code.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Sets the error code.
    pub fn set_code<T: Into<String>>(mut self, v: T) -> Self {
        self.code = v.into();
        self
    }

    /// Sets the error message.
    pub fn set_message<T: Into<String>>(mut self, v: T) -> Self {
        self.message = v.into();
        self
    }

    /// Extracts the error details from a (failed) HTTP response.
    ///
    /// Returns `None` if neither the payload nor the headers contain an error
    /// code.
    pub fn from_http(headers: &HeaderMap, payload: &[u8]) -> Option<Self> {
        let mut details = Self::parse(payload).unwrap_or_default();
        if details.code.is_empty() {
            if let Some(code) = headers
                .get(ERROR_CODE_HEADER)
                .and_then(|v| v.to_str().ok())
            {
                details.code = code.to_string();
            }
        }
        if details.code.is_empty() {
            return None;
        }
        Some(details)
    }

    /// Extracts the error details from a JSON payload.
    ///
    /// Accepts both the enveloped and the bare form. Returns `None` when the
    /// payload is not JSON or carries no error code.
    pub fn from_payload(payload: &[u8]) -> Option<Self> {
        Self::parse(payload).filter(|e| !e.code.is_empty())
    }

    // Either form, even without a code.
    fn parse(payload: &[u8]) -> Option<Self> {
        serde_json::from_slice::<Envelope>(payload)
            .map(|e| e.error)
            .or_else(|_| serde_json::from_slice::<Self>(payload))
            .ok()
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.message.is_empty() {
            return write!(f, "{}", self.code);
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}
