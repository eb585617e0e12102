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

//! Optional parameters for the compute operations.
//!
//! Every field is optional, unset fields are not sent to the service.

use gax::options::RequestOptions;

/// Optional parameters for `get` operations.
#[derive(Clone, Debug, Default)]
#[non_exhaustive]
pub struct GetOptions {
    /// Expands additional properties, for example `instanceView` or
    /// `userData` for virtual machines. Sent as the `$expand` query parameter.
    pub expand: Option<String>,
    pub request_options: RequestOptions,
}

impl GetOptions {
    pub fn set_expand<T: Into<String>>(mut self, v: T) -> Self {
        self.expand = Some(v.into());
        self
    }

    pub fn with_request_options(mut self, v: RequestOptions) -> Self {
        self.request_options = v;
        self
    }
}

/// Optional parameters for the virtual machine list operations.
#[derive(Clone, Debug, Default)]
#[non_exhaustive]
pub struct ListOptions {
    /// An OData filter, sent as the `$filter` query parameter.
    pub filter: Option<String>,
    /// Sent as the `$expand` query parameter.
    pub expand: Option<String>,
    /// Only return the runtime status of each virtual machine. Used by
    /// `new_list_all_pager()` only.
    pub status_only: Option<bool>,
    pub request_options: RequestOptions,
}

impl ListOptions {
    pub fn set_filter<T: Into<String>>(mut self, v: T) -> Self {
        self.filter = Some(v.into());
        self
    }

    pub fn set_expand<T: Into<String>>(mut self, v: T) -> Self {
        self.expand = Some(v.into());
        self
    }

    pub fn set_status_only(mut self, v: bool) -> Self {
        self.status_only = Some(v);
        self
    }

    pub fn with_request_options(mut self, v: RequestOptions) -> Self {
        self.request_options = v;
        self
    }
}

/// Optional parameters for operations returning a poller.
///
/// If `resume_token` is set the operation is not started. Instead, the
/// returned poller continues polling the operation described by the token.
#[derive(Clone, Debug, Default)]
#[non_exhaustive]
pub struct BeginOptions {
    pub resume_token: Option<String>,
    /// Used for the request starting the operation, and for all polling
    /// requests.
    pub request_options: RequestOptions,
}

impl BeginOptions {
    pub fn set_resume_token<T: Into<String>>(mut self, v: T) -> Self {
        self.resume_token = Some(v.into());
        self
    }

    pub fn with_request_options(mut self, v: RequestOptions) -> Self {
        self.request_options = v;
        self
    }
}

/// Optional parameters for deleting a virtual machine.
#[derive(Clone, Debug, Default)]
#[non_exhaustive]
pub struct DeleteOptions {
    /// Force the deletion, even if the virtual machine is running.
    pub force_deletion: Option<bool>,
    pub resume_token: Option<String>,
    pub request_options: RequestOptions,
}

impl DeleteOptions {
    pub fn set_force_deletion(mut self, v: bool) -> Self {
        self.force_deletion = Some(v);
        self
    }

    pub fn set_resume_token<T: Into<String>>(mut self, v: T) -> Self {
        self.resume_token = Some(v.into());
        self
    }

    pub fn with_request_options(mut self, v: RequestOptions) -> Self {
        self.request_options = v;
        self
    }
}

impl From<DeleteOptions> for BeginOptions {
    fn from(value: DeleteOptions) -> Self {
        Self {
            resume_token: value.resume_token,
            request_options: value.request_options,
        }
    }
}

/// Optional parameters for powering off a virtual machine.
#[derive(Clone, Debug, Default)]
#[non_exhaustive]
pub struct PowerOffOptions {
    /// Skip the graceful shutdown of the guest operating system.
    pub skip_shutdown: Option<bool>,
    pub resume_token: Option<String>,
    pub request_options: RequestOptions,
}

impl PowerOffOptions {
    pub fn set_skip_shutdown(mut self, v: bool) -> Self {
        self.skip_shutdown = Some(v);
        self
    }

    pub fn set_resume_token<T: Into<String>>(mut self, v: T) -> Self {
        self.resume_token = Some(v.into());
        self
    }

    pub fn with_request_options(mut self, v: RequestOptions) -> Self {
        self.request_options = v;
        self
    }
}

impl From<PowerOffOptions> for BeginOptions {
    fn from(value: PowerOffOptions) -> Self {
        Self {
            resume_token: value.resume_token,
            request_options: value.request_options,
        }
    }
}
