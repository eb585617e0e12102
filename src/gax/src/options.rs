// Copyright 2024 Google LLC
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

//! Client configuration and per request overrides.
//!
//! [ClientConfig] applies to every request made by a client. Sovereign clouds
//! and local test servers set a different endpoint here, and applications
//! tune the retry and polling behavior.
//!
//! [RequestOptions] overrides some of those settings for a single call.

use crate::backoff_policy::{BackoffPolicy, BackoffPolicyArg};
use crate::retry_policy::{RetryPolicy, RetryPolicyArg};
use std::sync::Arc;
use std::time::Duration;

/// The public cloud resource manager endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";

/// The delay between polls of a long-running operation, unless the service
/// asks for a different one with `Retry-After`.
pub const DEFAULT_POLLING_FREQUENCY: Duration = Duration::from_secs(30);

/// Setting this variable to `true` enables tracing for all clients.
pub const LOGGING_VAR: &str = "ARM_SDK_RUST_LOGGING";

/// Overrides for a single request.
///
/// ```
/// # use gax::options::RequestOptions;
/// # use gax::retry_policy::{RetryPolicyExt, TransientErrors};
/// use std::time::Duration;
/// let mut options = RequestOptions::default();
/// options.set_attempt_timeout(Duration::from_secs(20));
/// options.set_retry_policy(TransientErrors.with_attempt_limit(2));
/// assert_eq!(options.attempt_timeout(), Some(Duration::from_secs(20)));
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    idempotent: Option<bool>,
    user_agent: Option<String>,
    attempt_timeout: Option<Duration>,
    retry_policy: Option<Arc<dyn RetryPolicy>>,
    backoff_policy: Option<Arc<dyn BackoffPolicy>>,
}

impl RequestOptions {
    /// Whether the request may be retried after I/O errors.
    ///
    /// `None` means the invoker decides from the HTTP method: `GET`, `HEAD`,
    /// `PUT`, `DELETE` and `OPTIONS` are idempotent.
    pub fn idempotent(&self) -> Option<bool> {
        self.idempotent
    }

    pub fn set_idempotency(&mut self, value: bool) {
        self.idempotent = Some(value);
    }

    /// Like [set_idempotency][Self::set_idempotency], but keeps an explicit
    /// value set by the application.
    pub fn set_default_idempotency(&mut self, default: bool) {
        self.idempotent.get_or_insert(default);
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    /// A prefix for the `User-Agent` header of this request.
    pub fn set_user_agent<T: Into<String>>(&mut self, v: T) {
        self.user_agent = Some(v.into());
    }

    pub fn attempt_timeout(&self) -> Option<Duration> {
        self.attempt_timeout
    }

    /// Limits each attempt. The retry policy may limit the whole loop.
    pub fn set_attempt_timeout<T: Into<Duration>>(&mut self, v: T) {
        self.attempt_timeout = Some(v.into());
    }

    pub fn retry_policy(&self) -> Option<&Arc<dyn RetryPolicy>> {
        self.retry_policy.as_ref()
    }

    pub fn set_retry_policy<V: Into<RetryPolicyArg>>(&mut self, v: V) {
        self.retry_policy = Some(v.into().into());
    }

    pub fn backoff_policy(&self) -> Option<&Arc<dyn BackoffPolicy>> {
        self.backoff_policy.as_ref()
    }

    pub fn set_backoff_policy<V: Into<BackoffPolicyArg>>(&mut self, v: V) {
        self.backoff_policy = Some(v.into().into());
    }
}

/// The configuration of a client.
///
/// # Example
/// ```
/// # use gax::options::ClientConfig;
/// use std::time::Duration;
/// let config = ClientConfig::new()
///     .set_endpoint("https://management.usgovcloudapi.net")
///     .set_polling_frequency(Duration::from_secs(10))
///     .enable_tracing();
/// assert_eq!(config.endpoint(), "https://management.usgovcloudapi.net");
/// ```
#[derive(Clone, Debug, Default)]
pub struct ClientConfig {
    pub(crate) endpoint: Option<String>,
    pub(crate) tracing: bool,
    pub(crate) retry_policy: Option<Arc<dyn RetryPolicy>>,
    pub(crate) backoff_policy: Option<Arc<dyn BackoffPolicy>>,
    pub(crate) polling_frequency: Option<Duration>,
    pub(crate) user_agent: Option<String>,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// The configured endpoint, or [DEFAULT_ENDPOINT].
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    pub fn set_endpoint<T: Into<String>>(mut self, v: T) -> Self {
        self.endpoint = Some(v.into());
        self
    }

    /// Emits a span per attempt and an event per retry.
    ///
    /// See also [LOGGING_VAR].
    pub fn enable_tracing(mut self) -> Self {
        self.tracing = true;
        self
    }

    pub fn disable_tracing(mut self) -> Self {
        self.tracing = false;
        self
    }

    /// The retry policy for requests without an override.
    pub fn set_retry_policy<V: Into<RetryPolicyArg>>(mut self, v: V) -> Self {
        self.retry_policy = Some(v.into().into());
        self
    }

    /// The backoff policy for requests without an override.
    pub fn set_backoff_policy<V: Into<BackoffPolicyArg>>(mut self, v: V) -> Self {
        self.backoff_policy = Some(v.into().into());
        self
    }

    /// The configured polling frequency, or [DEFAULT_POLLING_FREQUENCY].
    pub fn polling_frequency(&self) -> Duration {
        self.polling_frequency.unwrap_or(DEFAULT_POLLING_FREQUENCY)
    }

    pub fn set_polling_frequency<V: Into<Duration>>(mut self, v: V) -> Self {
        self.polling_frequency = Some(v.into());
        self
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    /// A prefix for the `User-Agent` header of every request.
    pub fn set_user_agent<T: Into<String>>(mut self, v: T) -> Self {
        self.user_agent = Some(v.into());
        self
    }
}

/// Tracing is on if the configuration enables it or [LOGGING_VAR] is `true`.
pub(crate) fn tracing_enabled(config: &ClientConfig) -> bool {
    config.tracing || std::env::var(LOGGING_VAR).is_ok_and(|v| v == "true")
}
