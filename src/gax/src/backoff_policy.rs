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

//! Backoff policies for the request invoker.
//!
//! A backoff policy decides how long the invoker waits before sending a
//! request again. A `Retry-After` header in the failed response takes
//! precedence over the policy.

use std::sync::Arc;
use std::time::{Duration, Instant};

/// Computes the delay between attempts.
///
/// # Example
/// ```
/// # use gax::backoff_policy::BackoffPolicy;
/// use std::time::{Duration, Instant};
/// #[derive(Debug)]
/// struct Linear(Duration);
/// impl BackoffPolicy for Linear {
///     fn on_failure(&self, _loop_start: Instant, attempt_count: u32) -> Duration {
///         self.0 * attempt_count
///     }
/// }
/// ```
pub trait BackoffPolicy: Send + Sync + std::fmt::Debug {
    /// The delay after the `attempt_count`-th failed attempt.
    ///
    /// `loop_start` is the time of the first attempt. `attempt_count` starts
    /// at 1.
    fn on_failure(&self, loop_start: Instant, attempt_count: u32) -> Duration;
}

/// Accepts any [BackoffPolicy] in configuration setters.
#[derive(Clone, Debug)]
pub struct BackoffPolicyArg(pub(crate) Arc<dyn BackoffPolicy>);

impl<T> From<T> for BackoffPolicyArg
where
    T: BackoffPolicy + 'static,
{
    fn from(value: T) -> Self {
        Self(Arc::new(value))
    }
}

impl From<Arc<dyn BackoffPolicy>> for BackoffPolicyArg {
    fn from(value: Arc<dyn BackoffPolicy>) -> Self {
        Self(value)
    }
}

impl From<BackoffPolicyArg> for Arc<dyn BackoffPolicy> {
    fn from(value: BackoffPolicyArg) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Fixed(Duration);

    impl BackoffPolicy for Fixed {
        fn on_failure(&self, _loop_start: Instant, _attempt_count: u32) -> Duration {
            self.0
        }
    }

    #[test]
    fn arg_conversions() {
        let arg = BackoffPolicyArg::from(Fixed(Duration::from_millis(5)));
        let policy: Arc<dyn BackoffPolicy> = arg.into();
        assert_eq!(
            policy.on_failure(Instant::now(), 3),
            Duration::from_millis(5)
        );

        let shared: Arc<dyn BackoffPolicy> = Arc::new(Fixed(Duration::from_secs(1)));
        let arg = BackoffPolicyArg::from(shared.clone());
        assert!(Arc::ptr_eq(&arg.0, &shared));
    }
}
