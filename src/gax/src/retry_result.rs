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

use crate::error::Error;

/// The decision of a [RetryPolicy][crate::retry_policy::RetryPolicy] after a
/// failed attempt.
///
/// Each variant carries the error of the attempt. The retry loop returns it
/// to the caller unless the decision is [Continue][RetryResult::Continue].
///
/// # Example
/// ```
/// # use gax::error::Error;
/// # use gax::retry_result::RetryResult;
/// fn classify(error: Error) -> RetryResult {
///     match error.http_status_code() {
///         Some(429) => RetryResult::Continue(error),
///         _ => RetryResult::Permanent(error),
///     }
/// }
/// ```
#[derive(Debug)]
pub enum RetryResult {
    /// Retrying cannot help, e.g. the resource does not exist.
    Permanent(Error),

    /// The error is transient, but the policy ran out of attempts or time.
    Exhausted(Error),

    /// Send the request again after a backoff delay.
    Continue(Error),
}

impl RetryResult {
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::Permanent(_))
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted(_))
    }

    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue(_))
    }

    /// The error of the failed attempt.
    pub fn error(&self) -> &Error {
        match self {
            Self::Permanent(e) | Self::Exhausted(e) | Self::Continue(e) => e,
        }
    }
}
