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

//! Types and functions to make long-running operations easier to use.
//!
//! Resource manager services execute many create, update, and delete
//! requests asynchronously. The initial response carries a polling URL in a
//! `Location`, `Azure-AsyncOperation`, or `Operation-Location` header, or
//! the resource body carries a non-terminal `provisioningState`. A [Poller]
//! hides these conventions, and drives the operation to completion.
//!
//! # Example
//! ```no_run
//! # use lro::{Poller, PollUntilDoneOptions};
//! # use tokio_util::sync::CancellationToken;
//! # async fn sample(mut poller: Poller<serde_json::Value>) -> gax::Result<()> {
//! let cancel = CancellationToken::new();
//! // Save the token to resume polling after a restart.
//! let token = poller.resume_token()?;
//! let result = poller
//!     .poll_until_done(&cancel, PollUntilDoneOptions::default())
//!     .await?;
//! println!("the operation completed with {result:?}");
//! # Ok(()) }
//! ```

use gax::error::Error;
use gax::Result;
use std::time::Duration;

mod kind;
mod poller;
mod status;
mod token;

pub use kind::{FinalStateVia, PollerKind};
pub use poller::{Poller, PollerBuilder};
pub use status::OperationStatus;

/// The result of polling a long-running operation.
///
/// # Parameters
/// * `R` - the response type. This is the type returned when the operation
///   completes successfully.
#[derive(Debug)]
pub enum PollingResult<R> {
    /// The operation is still in progress. Includes the status reported by
    /// the service, if any, e.g. `Creating`.
    InProgress(Option<String>),
    /// The operation completed. This includes the result.
    Completed(Result<R>),
    /// An error trying to poll the operation.
    ///
    /// These errors do not indicate that the operation failed. For example,
    /// this may fail because it was not possible to connect to the service.
    PollingError(Error),
}

/// Options for [Poller::poll_until_done].
#[derive(Clone, Debug, Default)]
#[non_exhaustive]
pub struct PollUntilDoneOptions {
    /// The interval between polling requests, when the service does not
    /// provide one in a `Retry-After` header. Defaults to the polling
    /// frequency in the client configuration.
    pub frequency: Option<Duration>,
}

impl PollUntilDoneOptions {
    pub fn with_frequency(mut self, v: Duration) -> Self {
        self.frequency = Some(v);
        self
    }
}

/// The result of operations that return no body, e.g. deletes.
///
/// Decodes from any payload, ignoring its contents.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NoResult;

impl<'de> serde::Deserialize<'de> for NoResult {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        serde::de::IgnoredAny::deserialize(deserializer)?;
        Ok(NoResult)
    }
}
