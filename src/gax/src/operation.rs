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

//! Describe and execute resource operations.
//!
//! Every resource operation in the management APIs follows the same recipe:
//! substitute the path parameters into a URL template, append the API version
//! and any optional query parameters, serialize the request body, send the
//! request, verify the status code, and decode the response. An
//! [OperationDescriptor] captures the variable parts of that recipe, and
//! [execute] and [execute_json] implement the recipe itself.
//!
//! # Example
//! ```
//! # use gax::operation::OperationDescriptor;
//! let descriptor = OperationDescriptor::get(
//!     "/subscriptions/{subscriptionId}/resourceGroups/{resourceGroupName}")
//!     .with_path_param("subscriptionId", "00000000-0000-0000-0000-000000000000")
//!     .with_path_param("resourceGroupName", "my rg")
//!     .with_api_version("2021-04-01");
//! let url = descriptor.build_url("https://management.azure.com")?;
//! assert_eq!(url, "https://management.azure.com/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/my%20rg?api-version=2021-04-01");
//! # gax::Result::<()>::Ok(())
//! ```

use crate::Result;
use crate::error::Error;
use crate::http_client::{Request, RequestInvoker};
use crate::options::RequestOptions;
use crate::response::{RawResponse, Response};
use bytes::Bytes;
use http::{HeaderValue, Method};

/// The characters percent-encoded in path parameters.
const PATH_SEGMENT: percent_encoding::AsciiSet = percent_encoding::CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b',')
    .add(b'/')
    .add(b';')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// The query parameter carrying the API version.
pub const API_VERSION: &str = "api-version";

/// Errors building the request URL.
#[derive(thiserror::Error, Debug, PartialEq)]
#[non_exhaustive]
pub enum BindingError {
    #[error("parameter {0} cannot be empty")]
    EmptyParameter(String),
    #[error("the path template {template} has unresolved parameter {name}")]
    UnresolvedParameter { template: String, name: String },
    #[error("cannot parse the request URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// The variable parts of a resource operation.
#[derive(Clone, Debug, PartialEq)]
pub struct OperationDescriptor {
    method: Method,
    path_template: String,
    path_params: Vec<(String, String)>,
    query_params: Vec<(String, String)>,
    api_version: Option<String>,
    body: Option<Bytes>,
    expected_status: Vec<u16>,
}

impl OperationDescriptor {
    /// Creates a descriptor for the given method and path template.
    ///
    /// The template uses `{name}` placeholders for path parameters. By default
    /// the operation expects a `200 OK` response.
    pub fn new<T: Into<String>>(method: Method, path_template: T) -> Self {
        Self {
            method,
            path_template: path_template.into(),
            path_params: Vec::new(),
            query_params: Vec::new(),
            api_version: None,
            body: None,
            expected_status: vec![200],
        }
    }

    /// Creates a `GET` operation descriptor.
    pub fn get<T: Into<String>>(path_template: T) -> Self {
        Self::new(Method::GET, path_template)
    }

    /// Binds a value to a path parameter.
    pub fn with_path_param<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.path_params.push((name.into(), value.into()));
        self
    }

    /// Appends a query parameter.
    pub fn with_query_param<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.query_params.push((name.into(), value.into()));
        self
    }

    /// Appends a query parameter, if it has a value.
    pub fn with_optional_query_param<K, V>(self, name: K, value: Option<V>) -> Self
    where
        K: Into<String>,
        V: ToString,
    {
        match value {
            None => self,
            Some(v) => self.with_query_param(name, v.to_string()),
        }
    }

    /// Sets the API version.
    pub fn with_api_version<V: Into<String>>(mut self, v: V) -> Self {
        self.api_version = Some(v.into());
        self
    }

    /// Sets the request body.
    pub fn with_json_body<T: serde::Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let body = serde_json::to_vec(body).map_err(Error::ser)?;
        self.body = Some(Bytes::from(body));
        Ok(self)
    }

    /// Sets the status codes that indicate success.
    pub fn with_expected_status<I: IntoIterator<Item = u16>>(mut self, v: I) -> Self {
        self.expected_status = v.into_iter().collect();
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn expected_status(&self) -> &[u16] {
        &self.expected_status
    }

    /// Builds the request URL.
    ///
    /// Path parameters are percent-encoded. Empty path parameters, and
    /// placeholders without a value, are binding errors.
    pub fn build_url(&self, endpoint: &str) -> Result<String> {
        let mut path = self.path_template.clone();
        for (name, value) in &self.path_params {
            if value.is_empty() {
                return Err(Error::binding(BindingError::EmptyParameter(name.clone())));
            }
            let encoded = percent_encoding::utf8_percent_encode(value, &PATH_SEGMENT).to_string();
            path = path.replace(&format!("{{{name}}}"), &encoded);
        }
        if let Some(name) = unresolved(&path) {
            return Err(Error::binding(BindingError::UnresolvedParameter {
                template: self.path_template.clone(),
                name: name.to_string(),
            }));
        }
        let raw = format!("{}{path}", endpoint.trim_end_matches('/'));
        let mut url = url::Url::parse(&raw).map_err(|source| {
            Error::binding(BindingError::InvalidUrl {
                url: raw.clone(),
                source,
            })
        })?;
        if self.api_version.is_some() || !self.query_params.is_empty() {
            let mut query = url.query_pairs_mut();
            if let Some(v) = &self.api_version {
                query.append_pair(API_VERSION, v);
            }
            for (k, v) in &self.query_params {
                query.append_pair(k, v);
            }
        }
        Ok(url.to_string())
    }

    /// Converts the descriptor into a request.
    pub fn into_request(self, endpoint: &str) -> Result<Request> {
        let url = self.build_url(endpoint)?;
        let mut request = Request::new(self.method, url).set_header(
            http::header::ACCEPT,
            HeaderValue::from_static("application/json"),
        );
        if let Some(body) = self.body {
            request = request.set_header(
                http::header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
            request.body = Some(body);
        }
        Ok(request)
    }
}

fn unresolved(path: &str) -> Option<&str> {
    let start = path.find('{')?;
    let end = path[start..].find('}').map(|e| start + e + 1).unwrap_or(path.len());
    Some(&path[start..end])
}

/// Sends the request described by `descriptor`.
///
/// Returns a protocol error if the service responds with a success status
/// code the operation does not expect.
pub async fn execute(
    invoker: &dyn RequestInvoker,
    endpoint: &str,
    descriptor: OperationDescriptor,
    options: RequestOptions,
) -> Result<RawResponse> {
    let expected = descriptor.expected_status.clone();
    let request = descriptor.into_request(endpoint)?;
    let response = invoker.execute(request, options).await?;
    check_status(&response, &expected)?;
    Ok(response)
}

/// Sends the request described by `descriptor` and decodes the response.
pub async fn execute_json<T>(
    invoker: &dyn RequestInvoker,
    endpoint: &str,
    descriptor: OperationDescriptor,
    options: RequestOptions,
) -> Result<Response<T>>
where
    T: serde::de::DeserializeOwned + Default,
{
    let response = execute(invoker, endpoint, descriptor, options).await?;
    let (parts, body) = response.into_parts();
    let body = decode_json::<T>(&body)?;
    Ok(Response::from_parts(parts, body))
}

/// Verifies the response status code is one of `expected`.
pub fn check_status(response: &RawResponse, expected: &[u16]) -> Result<()> {
    let code = response.status().as_u16();
    if expected.contains(&code) {
        return Ok(());
    }
    Err(Error::protocol(format!(
        "unexpected status code {code}, expected one of {expected:?}"
    )))
}

/// Decodes a JSON payload, an empty payload decodes to `T::default()`.
pub fn decode_json<T>(body: &[u8]) -> Result<T>
where
    T: serde::de::DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice::<T>(body).map_err(Error::deser)
}
