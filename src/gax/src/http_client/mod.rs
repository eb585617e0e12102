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

//! Send HTTP requests to the management services.
//!
//! The long-running operation poller, the page iterator, and the resource
//! clients send all their requests through a [RequestInvoker]. The invoker
//! is responsible for retrying transient failures, so none of its callers
//! retry on their own. [ReqwestClient] is the production implementation.

use crate::Result;
use crate::backoff_policy::BackoffPolicy;
use crate::error::{Error, ServiceError};
use crate::exponential_backoff::ExponentialBackoff;
use crate::options::{ClientConfig, RequestOptions};
use crate::response::{Parts, RawResponse, Response};
use crate::retry_loop::RetryLoop;
use crate::retry_policy::{RetryPolicy, default_retry_policy};
use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

const DEFAULT_USER_AGENT: &str = concat!("arm-sdk-rust/", env!("CARGO_PKG_VERSION"));

/// A single HTTP request.
///
/// The URL must be absolute, with any query parameters already included.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl Request {
    /// Creates a request without headers or body.
    pub fn new<U: Into<String>>(method: Method, url: U) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Creates a `GET` request.
    pub fn get<U: Into<String>>(url: U) -> Self {
        Self::new(Method::GET, url)
    }

    /// Adds (or replaces) a header.
    pub fn set_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets the request body, and its content type.
    pub fn set_json_body<T: serde::Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let body = serde_json::to_vec(body).map_err(Error::ser)?;
        self.headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        self.body = Some(Bytes::from(body));
        Ok(self)
    }
}

/// Executes one HTTP request/response exchange.
///
/// Implementations apply any retry policy before returning. A response is
/// only returned for `2xx` status codes, all other status codes are reported
/// as errors.
#[async_trait::async_trait]
pub trait RequestInvoker: Send + Sync + std::fmt::Debug {
    async fn execute(&self, request: Request, options: RequestOptions) -> Result<RawResponse>;
}

/// A [RequestInvoker] implemented with [reqwest].
#[derive(Clone, Debug)]
pub struct ReqwestClient {
    inner: reqwest::Client,
    retry_policy: Arc<dyn RetryPolicy>,
    backoff_policy: Arc<dyn BackoffPolicy>,
    user_agent: Option<String>,
    tracing: bool,
}

impl ReqwestClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Creates an invoker using a pre-configured [reqwest::Client].
    ///
    /// Applications use this to configure proxies, connection pools, or
    /// authentication middleware.
    pub fn with_client(inner: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            inner,
            retry_policy: config
                .retry_policy
                .clone()
                .unwrap_or_else(|| Arc::new(default_retry_policy())),
            backoff_policy: config
                .backoff_policy
                .clone()
                .unwrap_or_else(|| Arc::new(ExponentialBackoff::default())),
            user_agent: config.user_agent.clone(),
            tracing: crate::options::tracing_enabled(config),
        }
    }

    async fn retry_loop(&self, request: Request, options: RequestOptions) -> Result<RawResponse> {
        let idempotent = options
            .idempotent()
            .unwrap_or_else(|| default_idempotency(&request.method));
        let retry_policy = self.get_retry_policy(&options);
        let backoff_policy = self.get_backoff_policy(&options);
        let retry_loop = RetryLoop {
            idempotent,
            retry_policy,
            backoff_policy,
        };
        let tracing = self.tracing;
        retry_loop
            .run(
                |attempt, remaining| {
                    let request = request.clone();
                    let options = &options;
                    async move {
                        self.request_attempt(request, options, remaining, attempt)
                            .await
                    }
                },
                |attempt, error, delay| {
                    if tracing {
                        tracing::debug!(attempt, ?delay, %error, "retrying request");
                    }
                },
            )
            .await
    }

    async fn request_attempt(
        &self,
        request: Request,
        options: &RequestOptions,
        remaining_time: Option<Duration>,
        attempt: u32,
    ) -> Result<RawResponse> {
        if !self.tracing {
            return self.send(request, options, remaining_time).await;
        }
        let span = tracing::info_span!(
            "http_request",
            method = %request.method,
            url = %request.url,
            attempt
        );
        self.send(request, options, remaining_time)
            .instrument(span)
            .await
    }

    async fn send(
        &self,
        request: Request,
        options: &RequestOptions,
        remaining_time: Option<Duration>,
    ) -> Result<RawResponse> {
        let mut builder = self
            .inner
            .request(request.method, &request.url)
            .headers(request.headers)
            .header(
                http::header::USER_AGENT,
                self.user_agent(options).map_err(Error::ser)?,
            );
        builder = crate::retry_loop::attempt_timeout(options, remaining_time)
            .into_iter()
            .fold(builder, |b, t| b.timeout(t));
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        let response = builder.send().await.map_err(Self::map_send_error)?;
        if !response.status().is_success() {
            return to_http_error(response).await;
        }
        to_raw_response(response).await
    }

    fn user_agent(
        &self,
        options: &RequestOptions,
    ) -> std::result::Result<HeaderValue, http::header::InvalidHeaderValue> {
        let prefix = options.user_agent().or(self.user_agent.as_deref());
        match prefix {
            None => Ok(HeaderValue::from_static(DEFAULT_USER_AGENT)),
            Some(p) => HeaderValue::from_str(&format!("{p} {DEFAULT_USER_AGENT}")),
        }
    }

    fn map_send_error(err: reqwest::Error) -> Error {
        match err {
            e if e.is_timeout() => Error::timeout(e),
            e => Error::io(e),
        }
    }

    fn get_retry_policy(&self, options: &RequestOptions) -> Arc<dyn RetryPolicy> {
        options
            .retry_policy()
            .cloned()
            .unwrap_or_else(|| self.retry_policy.clone())
    }

    fn get_backoff_policy(&self, options: &RequestOptions) -> Arc<dyn BackoffPolicy> {
        options
            .backoff_policy()
            .cloned()
            .unwrap_or_else(|| self.backoff_policy.clone())
    }
}

#[async_trait::async_trait]
impl RequestInvoker for ReqwestClient {
    async fn execute(&self, request: Request, options: RequestOptions) -> Result<RawResponse> {
        self.retry_loop(request, options).await
    }
}

fn default_idempotency(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::PUT | Method::DELETE | Method::OPTIONS
    )
}

/// Converts a failed response into an error.
///
/// Responses with an ARM error payload, or with an `x-ms-error-code` header,
/// become service errors. All other responses become HTTP transport errors.
pub async fn to_http_error<O>(response: reqwest::Response) -> Result<O> {
    let status_code = response.status().as_u16();
    let response = http::Response::from(response);
    let (parts, body) = response.into_parts();

    let body = http_body_util::BodyExt::collect(body)
        .await
        .map_err(Error::io)?
        .to_bytes();

    let error = match ServiceError::from_http(&parts.headers, &body) {
        Some(details) => Error::service(details, status_code, parts.headers),
        None => Error::http(status_code, parts.headers, body),
    };
    Err(error)
}

async fn to_raw_response(response: reqwest::Response) -> Result<RawResponse> {
    let response = http::Response::from(response);
    let (parts, body) = response.into_parts();
    let body = http_body_util::BodyExt::collect(body)
        .await
        .map_err(Error::io)?
        .to_bytes();
    Ok(Response::from_parts(Parts::from(parts), body))
}
