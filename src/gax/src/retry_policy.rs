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

//! Retry policies for the request invoker.
//!
//! A retry policy classifies the error of each failed attempt and decides
//! whether the invoker sends the request again. Resource manager services
//! report transient failures with HTTP 408, 429, 500, 502, 503 and 504. A
//! request that failed without a response may have reached the service, so
//! it is only repeated when it is idempotent.
//!
//! Policies compose: [TransientErrors] classifies errors, and the decorators
//! from [RetryPolicyExt] bound the number of attempts or the elapsed time.
//!
//! # Example
//! ```
//! # use gax::options::RequestOptions;
//! # use gax::retry_policy::*;
//! use std::time::Duration;
//! let mut options = RequestOptions::default();
//! options.set_retry_policy(
//!     TransientErrors
//!         .with_time_limit(Duration::from_secs(60))
//!         .with_attempt_limit(5),
//! );
//! ```

use crate::error::Error;
use crate::retry_result::RetryResult;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The HTTP status codes retried by [TransientErrors].
pub const TRANSIENT_STATUS_CODES: [u16; 6] = [408, 429, 500, 502, 503, 504];

/// Classifies errors in the retry loop.
pub trait RetryPolicy: Send + Sync + std::fmt::Debug {
    /// Called after each failed attempt.
    ///
    /// `attempt_count` includes the attempt that just failed, so it starts at
    /// 1. `idempotent` tells the policy whether repeating the request is safe
    /// after an ambiguous failure.
    fn on_error(
        &self,
        loop_start: Instant,
        attempt_count: u32,
        idempotent: bool,
        error: Error,
    ) -> RetryResult;

    /// The time left before the policy stops the loop, if it has a deadline.
    ///
    /// The invoker uses this to bound the timeout of the next attempt.
    fn remaining_time(&self, _loop_start: Instant, _attempt_count: u32) -> Option<Duration> {
        None
    }
}

/// Accepts any [RetryPolicy] in configuration setters.
#[derive(Clone, Debug)]
pub struct RetryPolicyArg(pub(crate) Arc<dyn RetryPolicy>);

impl<T> From<T> for RetryPolicyArg
where
    T: RetryPolicy + 'static,
{
    fn from(value: T) -> Self {
        Self(Arc::new(value))
    }
}

impl From<Arc<dyn RetryPolicy>> for RetryPolicyArg {
    fn from(value: Arc<dyn RetryPolicy>) -> Self {
        Self(value)
    }
}

impl From<RetryPolicyArg> for Arc<dyn RetryPolicy> {
    fn from(value: RetryPolicyArg) -> Self {
        value.0
    }
}

/// Decorators for any [RetryPolicy].
pub trait RetryPolicyExt: RetryPolicy + Sized {
    /// Stops retrying once `maximum_duration` has passed since the first
    /// attempt.
    fn with_time_limit(self, maximum_duration: Duration) -> LimitedElapsedTime<Self> {
        LimitedElapsedTime::custom(self, maximum_duration)
    }

    /// Stops retrying after `maximum_attempts` attempts, counting the first
    /// one.
    ///
    /// ```
    /// # use gax::retry_policy::*;
    /// // One initial attempt and up to two retries.
    /// let policy = TransientErrors.with_attempt_limit(3);
    /// ```
    fn with_attempt_limit(self, maximum_attempts: u32) -> LimitedAttemptCount<Self> {
        LimitedAttemptCount::custom(self, maximum_attempts)
    }
}

impl<T: RetryPolicy> RetryPolicyExt for T {}

/// The policy used when neither the client nor the request sets one: up to
/// three retries of [TransientErrors].
pub fn default_retry_policy() -> LimitedAttemptCount<TransientErrors> {
    TransientErrors.with_attempt_limit(4)
}

/// Retries transient errors without any limit.
///
/// Decorate this policy with [RetryPolicyExt] before using it.
///
/// | Error                                      | Idempotent | Not idempotent |
/// |--------------------------------------------|------------|----------------|
/// | HTTP status in [TRANSIENT_STATUS_CODES]     | retry      | retry          |
/// | I/O error or timeout                       | retry      | permanent      |
/// | anything else                              | permanent  | permanent      |
///
/// ```
/// # use gax::retry_policy::*;
/// # use gax::error::Error;
/// let error = Error::http(429, http::HeaderMap::new(), bytes::Bytes::new());
/// let result = TransientErrors.on_error(std::time::Instant::now(), 1, false, error);
/// assert!(result.is_continue());
/// ```
#[derive(Clone, Debug)]
pub struct TransientErrors;

impl RetryPolicy for TransientErrors {
    fn on_error(
        &self,
        _loop_start: Instant,
        _attempt_count: u32,
        idempotent: bool,
        error: Error,
    ) -> RetryResult {
        let transient = match error.http_status_code() {
            Some(code) => TRANSIENT_STATUS_CODES.contains(&code),
            None => idempotent && (error.is_io() || error.is_timeout()),
        };
        if transient {
            RetryResult::Continue(error)
        } else {
            RetryResult::Permanent(error)
        }
    }
}

/// Never retries. Every error is returned as is.
#[derive(Clone, Debug)]
pub struct NeverRetry;

impl RetryPolicy for NeverRetry {
    fn on_error(&self, _: Instant, _: u32, _: bool, error: Error) -> RetryResult {
        RetryResult::Permanent(error)
    }
}

/// Limits the time spent in the retry loop.
///
/// Errors the inner policy would retry become [RetryResult::Exhausted] once
/// the deadline passes.
#[derive(Debug)]
pub struct LimitedElapsedTime<P = TransientErrors>
where
    P: RetryPolicy,
{
    inner: P,
    maximum_duration: Duration,
}

impl LimitedElapsedTime {
    /// Limits [TransientErrors].
    pub fn new(maximum_duration: Duration) -> Self {
        Self::custom(TransientErrors, maximum_duration)
    }
}

impl<P> LimitedElapsedTime<P>
where
    P: RetryPolicy,
{
    pub fn custom(inner: P, maximum_duration: Duration) -> Self {
        Self {
            inner,
            maximum_duration,
        }
    }

    fn left(&self, loop_start: Instant) -> Duration {
        // tokio's clock, so paused time in tests moves the deadline too.
        let now = tokio::time::Instant::now().into_std();
        (loop_start + self.maximum_duration).saturating_duration_since(now)
    }
}

impl<P> RetryPolicy for LimitedElapsedTime<P>
where
    P: RetryPolicy,
{
    fn on_error(
        &self,
        loop_start: Instant,
        attempt_count: u32,
        idempotent: bool,
        error: Error,
    ) -> RetryResult {
        match self
            .inner
            .on_error(loop_start, attempt_count, idempotent, error)
        {
            RetryResult::Continue(e) if self.left(loop_start).is_zero() => {
                RetryResult::Exhausted(e)
            }
            result => result,
        }
    }

    fn remaining_time(&self, loop_start: Instant, attempt_count: u32) -> Option<Duration> {
        let left = self.left(loop_start);
        let inner = self.inner.remaining_time(loop_start, attempt_count);
        Some(inner.map_or(left, |d| d.min(left)))
    }
}

/// Limits the number of attempts, including the first one.
///
/// A limit of 0 or 1 disables retries.
#[derive(Debug)]
pub struct LimitedAttemptCount<P = TransientErrors>
where
    P: RetryPolicy,
{
    inner: P,
    maximum_attempts: u32,
}

impl LimitedAttemptCount {
    /// Limits [TransientErrors].
    pub fn new(maximum_attempts: u32) -> Self {
        Self::custom(TransientErrors, maximum_attempts)
    }
}

impl<P> LimitedAttemptCount<P>
where
    P: RetryPolicy,
{
    pub fn custom(inner: P, maximum_attempts: u32) -> Self {
        Self {
            inner,
            maximum_attempts,
        }
    }
}

impl<P> RetryPolicy for LimitedAttemptCount<P>
where
    P: RetryPolicy,
{
    fn on_error(
        &self,
        loop_start: Instant,
        attempt_count: u32,
        idempotent: bool,
        error: Error,
    ) -> RetryResult {
        match self
            .inner
            .on_error(loop_start, attempt_count, idempotent, error)
        {
            RetryResult::Continue(e) if attempt_count >= self.maximum_attempts => {
                RetryResult::Exhausted(e)
            }
            result => result,
        }
    }

    fn remaining_time(&self, loop_start: Instant, attempt_count: u32) -> Option<Duration> {
        self.inner.remaining_time(loop_start, attempt_count)
    }
}
