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

//! Errors returned by the management clients.
//!
//! The clients distinguish between errors detected while trying to send a
//! request (e.g. cannot open a connection), errors returned by the service
//! (e.g. the resource does not exist), and errors in the asynchronous
//! protocols built on top of those requests (e.g. a long-running operation
//! that completed with a `Failed` status).
//!
//! # Examples
//!
//! ```
//! use gax::error::Error;
//! fn handle_error(e: Error) {
//!     if let Some(details) = e.service_error() {
//!         println!("the service reports {} {}", details.code(), details.message());
//!     }
//! }
//! ```

mod core_error;
mod service_error;
pub use core_error::*;
pub use service_error::*;
