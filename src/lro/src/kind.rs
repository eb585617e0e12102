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

use gax::Result;
use gax::error::Error;
use http::{HeaderMap, Method};
use serde::{Deserialize, Serialize};

pub(crate) const LOCATION: &str = "location";
pub(crate) const AZURE_ASYNC_OPERATION: &str = "azure-asyncoperation";
pub(crate) const OPERATION_LOCATION: &str = "operation-location";

/// How the poller detects the completion of an operation.
///
/// The kind is selected once, from the response to the request starting the
/// operation, and never changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PollerKind {
    /// Poll the URL in the `Location` header. The service returns `202`
    /// until the operation completes.
    Location,
    /// Poll the status monitor in the `Azure-AsyncOperation` header.
    AzureAsyncOperation,
    /// Poll the status monitor in the `Operation-Location` header.
    OperationLocation,
    /// Poll the resource itself, until its `properties.provisioningState`
    /// reaches a terminal value.
    Body,
    /// The operation completed in the initial response.
    NoOp,
}

/// Where to find the result of a successful operation.
///
/// Operations declare this in their service definition. Without it, the
/// poller uses a default based on the HTTP method:
/// * `PUT` and `PATCH`: the original URL.
/// * `POST`: the URL in the initial `Location` header, if any.
/// * `DELETE`: no result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FinalStateVia {
    /// The URL in the initial `Location` header.
    Location,
    /// The final status monitor from the `Azure-AsyncOperation` header.
    AzureAsyncOperation,
    /// The URL of the request that started the operation.
    OriginalUri,
    /// The `resourceLocation` in the final `Operation-Location` monitor.
    OperationLocation,
}

/// Returns `true` if `value` is an absolute URL.
pub(crate) fn is_absolute_url(value: &str) -> bool {
    url::Url::parse(value).is_ok_and(|u| !u.cannot_be_a_base())
}

/// The polling URLs found in a response.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct PollingHeaders {
    pub location: Option<String>,
    pub async_operation: Option<String>,
    pub operation_location: Option<String>,
}

impl PollingHeaders {
    /// Extracts the polling URLs, rejecting any that are not absolute.
    pub fn new(headers: &HeaderMap) -> Result<Self> {
        Ok(Self {
            location: header_url(headers, LOCATION)?,
            async_operation: header_url(headers, AZURE_ASYNC_OPERATION)?,
            operation_location: header_url(headers, OPERATION_LOCATION)?,
        })
    }

    /// Selects the polling kind and URL.
    ///
    /// The headers are considered in order: `Location`,
    /// `Azure-AsyncOperation`, and `Operation-Location`, unless `hint` names
    /// one of the status monitor headers and that header is present.
    pub fn select(&self, hint: Option<FinalStateVia>) -> Option<(PollerKind, String)> {
        match (hint, &self.async_operation, &self.operation_location) {
            (Some(FinalStateVia::AzureAsyncOperation), Some(u), _) => {
                return Some((PollerKind::AzureAsyncOperation, u.clone()));
            }
            (Some(FinalStateVia::OperationLocation), _, Some(u)) => {
                return Some((PollerKind::OperationLocation, u.clone()));
            }
            _ => {}
        }
        if let Some(u) = &self.location {
            return Some((PollerKind::Location, u.clone()));
        }
        if let Some(u) = &self.async_operation {
            return Some((PollerKind::AzureAsyncOperation, u.clone()));
        }
        self.operation_location
            .as_ref()
            .map(|u| (PollerKind::OperationLocation, u.clone()))
    }

    /// The polling URL for `kind`, if the response includes a new one.
    pub fn for_kind(&self, kind: PollerKind) -> Option<&String> {
        match kind {
            PollerKind::Location => self.location.as_ref(),
            PollerKind::AzureAsyncOperation => self.async_operation.as_ref(),
            PollerKind::OperationLocation => self.operation_location.as_ref(),
            PollerKind::Body | PollerKind::NoOp => None,
        }
    }
}

fn header_url(headers: &HeaderMap, name: &str) -> Result<Option<String>> {
    let Some(value) = headers.get(name) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|e| Error::protocol(format!("invalid {name} header: {e}")))?
        .trim();
    if value.is_empty() {
        return Ok(None);
    }
    if !is_absolute_url(value) {
        return Err(Error::protocol(format!(
            "the {name} header must be an absolute URL, got {value:?}"
        )));
    }
    Ok(Some(value.to_string()))
}

/// Computes the URL used to fetch the result of a successful operation.
///
/// `None` means the result is decoded from the last polling response.
pub(crate) fn result_url(
    method: &Method,
    original_url: &str,
    headers: &PollingHeaders,
    hint: Option<FinalStateVia>,
) -> Option<String> {
    let by_method = || match *method {
        Method::PUT | Method::PATCH => Some(original_url.to_string()),
        Method::POST => headers.location.clone(),
        _ => None,
    };
    match hint {
        None => by_method(),
        Some(FinalStateVia::Location) => headers.location.clone().or_else(by_method),
        Some(FinalStateVia::OriginalUri) => Some(original_url.to_string()),
        Some(FinalStateVia::AzureAsyncOperation) | Some(FinalStateVia::OperationLocation) => None,
    }
}
