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

//! Successful responses.
//!
//! Resource operations return a [Response] holding the decoded resource. The
//! status code and headers stay available, e.g. to log the request id:
//!
//! ```no_run
//! # use gax::response::Response;
//! # struct VirtualMachine;
//! # async fn get_vm() -> gax::Result<Response<VirtualMachine>> { panic!() }
//! # tokio_test::block_on(async {
//! let response = get_vm().await?;
//! println!("request id: {:?}", response.request_id());
//! let vm: VirtualMachine = response.into_body();
//! # gax::Result::<()>::Ok(()) });
//! ```
//!
//! In tests, [Response::from] wraps a value as a `200 OK` response without
//! headers.

use http::{HeaderMap, StatusCode};

/// The name of the header with the service-assigned request id.
pub const REQUEST_ID_HEADER: &str = "x-ms-request-id";

/// A response whose body is still encoded.
pub type RawResponse = Response<bytes::Bytes>;

/// A response body with the status code and headers it arrived with.
#[derive(Clone, Debug)]
pub struct Response<T> {
    parts: Parts,
    body: T,
}

impl<T> Response<T> {
    /// Wraps `body` in a `200 OK` response without headers.
    ///
    /// ```
    /// # use gax::response::Response;
    /// let response = Response::from(42);
    /// assert_eq!(response.status(), http::StatusCode::OK);
    /// assert!(response.headers().is_empty());
    /// ```
    pub fn from(body: T) -> Self {
        Self::from_parts(Parts::default(), body)
    }

    pub fn from_parts(parts: Parts, body: T) -> Self {
        Self { parts, body }
    }

    pub fn status(&self) -> StatusCode {
        self.parts.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    /// The `x-ms-request-id` header, if present and valid UTF-8.
    pub fn request_id(&self) -> Option<&str> {
        self.parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &T {
        &self.body
    }

    pub fn into_body(self) -> T {
        self.body
    }

    pub fn into_parts(self) -> (Parts, T) {
        (self.parts, self.body)
    }

    /// Replaces the body with `f(body)`, keeping the status and headers.
    pub fn map<U, F>(self, f: F) -> Response<U>
    where
        F: FnOnce(T) -> U,
    {
        Response::from_parts(self.parts, f(self.body))
    }
}

impl<T> From<http::Response<T>> for Response<T> {
    fn from(value: http::Response<T>) -> Self {
        let (parts, body) = value.into_parts();
        Self::from_parts(parts.into(), body)
    }
}

/// The status code and headers of a [Response].
#[derive(Clone, Debug, Default)]
#[non_exhaustive]
pub struct Parts {
    pub status: StatusCode,
    pub headers: HeaderMap,
}

impl Parts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status<V: Into<StatusCode>>(mut self, v: V) -> Self {
        self.status = v.into();
        self
    }

    pub fn set_headers<V: Into<HeaderMap>>(mut self, v: V) -> Self {
        self.headers = v.into();
        self
    }
}

impl From<http::response::Parts> for Parts {
    fn from(value: http::response::Parts) -> Self {
        Self::new().set_status(value.status).set_headers(value.headers)
    }
}
