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

//! Resource manager API helpers.
//!
//! This crate contains the types and functions shared by the resource
//! management clients: the error model, the request invoker with its retry
//! policies, the description of resource operations, and the paging helpers
//! for list operations.
//!
//! Long-running operations are implemented in a separate crate, on top of the
//! [RequestInvoker][http_client::RequestInvoker] defined here.

/// An alias of [std::result::Result] where the error is always [crate::error::Error].
///
/// This is the result type used by all functions sending requests.
pub type Result<T> = std::result::Result<T, crate::error::Error>;

/// The core error types used by the clients.
pub mod error;

pub mod options;

/// Wraps successful responses with their status code and headers.
pub mod response;

pub mod operation;

/// Defines the request invoker and its default implementation.
pub mod http_client;

pub mod paginator;

pub mod backoff_policy;
pub mod exponential_backoff;
pub mod retry_after;
pub mod retry_policy;
pub mod retry_result;

mod retry_loop;
