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

use crate::Result;
use crate::backoff_policy::BackoffPolicy;
use crate::error::Error;
use crate::options::RequestOptions;
use crate::retry_policy::RetryPolicy;
use crate::retry_result::RetryResult;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Sends a request until it succeeds or the retry policy gives up.
///
/// Between attempts the loop sleeps for the delay in the `Retry-After`
/// headers of the failed response, or for the delay from the backoff policy
/// if the service did not send any.
pub(crate) struct RetryLoop {
    pub idempotent: bool,
    pub retry_policy: Arc<dyn RetryPolicy>,
    pub backoff_policy: Arc<dyn BackoffPolicy>,
}

impl RetryLoop {
    /// Calls `attempt` until it succeeds or the loop stops.
    ///
    /// `attempt` receives the attempt number, starting at 1, and the time
    /// left in the retry policy. `on_retry` is called before each sleep.
    pub async fn run<T, A, F, R>(&self, mut attempt: A, mut on_retry: R) -> Result<T>
    where
        A: FnMut(u32, Option<Duration>) -> F,
        F: Future<Output = Result<T>>,
        R: FnMut(u32, &Error, Duration),
    {
        let start = Instant::now().into_std();
        let mut count = 0_u32;
        loop {
            let remaining = self.retry_policy.remaining_time(start, count);
            count += 1;
            let error = match attempt(count, remaining).await {
                Ok(v) => return Ok(v),
                Err(e) => e,
            };
            let error = match self
                .retry_policy
                .on_error(start, count, self.idempotent, error)
            {
                RetryResult::Continue(e) => e,
                RetryResult::Exhausted(e) => return Err(Error::exhausted(e)),
                RetryResult::Permanent(e) => return Err(e),
            };
            let delay = service_delay(&error)
                .unwrap_or_else(|| self.backoff_policy.on_failure(start, count));
            let remaining = self.retry_policy.remaining_time(start, count);
            if remaining.is_some_and(|r| r < delay) {
                return Err(Error::exhausted(error));
            }
            on_retry(count, &error, delay);
            tokio::time::sleep(delay).await;
        }
    }
}

fn service_delay(error: &Error) -> Option<Duration> {
    error.http_headers().and_then(crate::retry_after::from_headers)
}

/// The timeout for one attempt: the smaller of the per-attempt timeout and
/// the time left in the retry policy.
pub(crate) fn attempt_timeout(
    options: &RequestOptions,
    remaining: Option<Duration>,
) -> Option<Duration> {
    match (options.attempt_timeout(), remaining) {
        (Some(a), Some(r)) => Some(a.min(r)),
        (a, r) => a.or(r),
    }
}
