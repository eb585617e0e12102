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

use serde_json::Value;

/// The status of a long-running operation.
///
/// Services report many intermediate states (`Creating`, `Updating`,
/// `Deleting`, etc.). Only the terminal states are relevant to the poller,
/// any other value is reported as [OperationStatus::InProgress].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationStatus {
    InProgress,
    Succeeded,
    Failed,
    Canceled,
}

impl OperationStatus {
    /// Maps a status reported by the service.
    ///
    /// The comparison is case-insensitive, and accepts both spellings of
    /// `Canceled`.
    ///
    /// # Example
    /// ```
    /// # use lro::OperationStatus;
    /// assert_eq!(OperationStatus::from_service("succeeded"), OperationStatus::Succeeded);
    /// assert_eq!(OperationStatus::from_service("Creating"), OperationStatus::InProgress);
    /// ```
    pub fn from_service(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "succeeded" => Self::Succeeded,
            "failed" => Self::Failed,
            "canceled" | "cancelled" => Self::Canceled,
            _ => Self::InProgress,
        }
    }

    /// Returns `true` for `Succeeded`, `Failed`, and `Canceled`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::InProgress)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "InProgress",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
            Self::Canceled => "Canceled",
        }
    }
}

impl std::fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a response body, an empty or non-JSON body yields `None`.
pub(crate) fn parse_body(body: &[u8]) -> Option<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    serde_json::from_slice::<Value>(body).ok()
}

/// Returns the top-level `status` field of a status monitor.
pub(crate) fn status_field(body: Option<&Value>) -> Option<&str> {
    body?.get("status")?.as_str()
}

/// Returns `properties.provisioningState` from a resource body.
pub(crate) fn provisioning_state(body: Option<&Value>) -> Option<&str> {
    body?.get("properties")?.get("provisioningState")?.as_str()
}

/// Returns the `resourceLocation` field of an `Operation-Location` monitor.
pub(crate) fn resource_location(body: Option<&Value>) -> Option<&str> {
    body?.get("resourceLocation")?.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("Succeeded", OperationStatus::Succeeded)]
    #[test_case("SUCCEEDED", OperationStatus::Succeeded)]
    #[test_case("Failed", OperationStatus::Failed)]
    #[test_case("Canceled", OperationStatus::Canceled)]
    #[test_case("Cancelled", OperationStatus::Canceled)]
    #[test_case("InProgress", OperationStatus::InProgress)]
    #[test_case("Creating", OperationStatus::InProgress)]
    #[test_case("Deallocating", OperationStatus::InProgress)]
    fn from_service(input: &str, want: OperationStatus) {
        assert_eq!(OperationStatus::from_service(input), want);
    }

    #[test]
    fn terminal() {
        assert!(!OperationStatus::InProgress.is_terminal());
        assert!(OperationStatus::Succeeded.is_terminal());
        assert!(OperationStatus::Failed.is_terminal());
        assert!(OperationStatus::Canceled.is_terminal());
        assert_eq!(OperationStatus::Canceled.to_string(), "Canceled");
    }

    #[test]
    fn fields() {
        let body = json!({
            "status": "Running",
            "resourceLocation": "https://x/r",
            "properties": {"provisioningState": "Updating"},
        });
        assert_eq!(status_field(Some(&body)), Some("Running"));
        assert_eq!(resource_location(Some(&body)), Some("https://x/r"));
        assert_eq!(provisioning_state(Some(&body)), Some("Updating"));

        let body = json!({"status": 42, "properties": "not an object"});
        assert_eq!(status_field(Some(&body)), None);
        assert_eq!(provisioning_state(Some(&body)), None);
        assert_eq!(status_field(None), None);
    }

    #[test]
    fn parse() {
        assert!(parse_body(b"").is_none());
        assert!(parse_body(b"  \n").is_none());
        assert!(parse_body(b"not json").is_none());
        assert_eq!(parse_body(br#"{"a":1}"#), Some(json!({"a": 1})));
    }
}
