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

use crate::client::Inner;
use crate::model::{Disk, DiskList};
use crate::options::{BeginOptions, GetOptions};
use gax::Result;
use gax::operation::OperationDescriptor;
use gax::options::RequestOptions;
use gax::paginator::Pager;
use gax::response::Response;
use http::Method;
use lro::{NoResult, Poller};
use std::sync::Arc;

const API_VERSION: &str = "2024-03-02";
const DISK_PATH: &str = "/subscriptions/{subscriptionId}/resourceGroups/{resourceGroupName}/providers/Microsoft.Compute/disks/{diskName}";
const RESOURCE_GROUP_PATH: &str =
    "/subscriptions/{subscriptionId}/resourceGroups/{resourceGroupName}/providers/Microsoft.Compute/disks";

/// Operations on managed disks.
#[derive(Clone, Debug)]
pub struct Disks {
    inner: Arc<Inner>,
}

impl Disks {
    pub(crate) fn new(inner: Arc<Inner>) -> Self {
        Self { inner }
    }

    pub async fn get(
        &self,
        resource_group_name: &str,
        disk_name: &str,
        options: GetOptions,
    ) -> Result<Response<Disk>> {
        let descriptor = self.disk(Method::GET, resource_group_name, disk_name);
        self.inner
            .execute_json(descriptor, options.request_options)
            .await
    }

    /// Lists the disks in a resource group.
    pub fn new_list_by_resource_group_pager(
        &self,
        resource_group_name: &str,
        options: RequestOptions,
    ) -> Pager<DiskList> {
        let descriptor = self
            .inner
            .descriptor(Method::GET, RESOURCE_GROUP_PATH, API_VERSION)
            .with_path_param("resourceGroupName", resource_group_name);
        self.inner.pager(descriptor, options)
    }

    /// Creates or updates a disk.
    ///
    /// The disk service reports progress with `Azure-AsyncOperation`
    /// monitors, the result is retrieved from the disk URL.
    pub async fn begin_create_or_update(
        &self,
        resource_group_name: &str,
        disk_name: &str,
        disk: &Disk,
        options: BeginOptions,
    ) -> Result<Poller<Disk>> {
        let descriptor = self
            .disk(Method::PUT, resource_group_name, disk_name)
            .with_json_body(disk)?;
        self.inner.begin(descriptor, None, options).await
    }

    pub async fn begin_delete(
        &self,
        resource_group_name: &str,
        disk_name: &str,
        options: BeginOptions,
    ) -> Result<Poller<NoResult>> {
        let descriptor = self.disk(Method::DELETE, resource_group_name, disk_name);
        self.inner.begin(descriptor, None, options).await
    }

    fn disk(&self, method: Method, resource_group_name: &str, disk_name: &str) -> OperationDescriptor {
        self.inner
            .descriptor(method, DISK_PATH, API_VERSION)
            .with_path_param("resourceGroupName", resource_group_name)
            .with_path_param("diskName", disk_name)
    }
}
