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
use crate::model::{AvailabilitySet, AvailabilitySetListResult};
use crate::options::GetOptions;
use gax::Result;
use gax::operation::OperationDescriptor;
use gax::options::RequestOptions;
use gax::paginator::Pager;
use gax::response::Response;
use http::Method;
use std::sync::Arc;

const API_VERSION: &str = "2024-07-01";
const SET_PATH: &str = "/subscriptions/{subscriptionId}/resourceGroups/{resourceGroupName}/providers/Microsoft.Compute/availabilitySets/{availabilitySetName}";
const RESOURCE_GROUP_PATH: &str = "/subscriptions/{subscriptionId}/resourceGroups/{resourceGroupName}/providers/Microsoft.Compute/availabilitySets";

/// Operations on availability sets.
///
/// Unlike virtual machines and disks, these operations complete in a single
/// request.
#[derive(Clone, Debug)]
pub struct AvailabilitySets {
    inner: Arc<Inner>,
}

impl AvailabilitySets {
    pub(crate) fn new(inner: Arc<Inner>) -> Self {
        Self { inner }
    }

    pub async fn get(
        &self,
        resource_group_name: &str,
        availability_set_name: &str,
        options: GetOptions,
    ) -> Result<Response<AvailabilitySet>> {
        let descriptor = self.set(Method::GET, resource_group_name, availability_set_name);
        self.inner
            .execute_json(descriptor, options.request_options)
            .await
    }

    pub async fn create_or_update(
        &self,
        resource_group_name: &str,
        availability_set_name: &str,
        parameters: &AvailabilitySet,
        options: RequestOptions,
    ) -> Result<Response<AvailabilitySet>> {
        let descriptor = self
            .set(Method::PUT, resource_group_name, availability_set_name)
            .with_json_body(parameters)?;
        self.inner.execute_json(descriptor, options).await
    }

    /// Deletes an availability set.
    ///
    /// The service returns `204 No Content` if the availability set does not
    /// exist.
    pub async fn delete(
        &self,
        resource_group_name: &str,
        availability_set_name: &str,
        options: RequestOptions,
    ) -> Result<Response<()>> {
        let descriptor = self
            .set(Method::DELETE, resource_group_name, availability_set_name)
            .with_expected_status([200, 204]);
        self.inner.execute(descriptor, options).await
    }

    /// Lists the availability sets in a resource group.
    pub fn new_list_pager(
        &self,
        resource_group_name: &str,
        options: RequestOptions,
    ) -> Pager<AvailabilitySetListResult> {
        let descriptor = self
            .inner
            .descriptor(Method::GET, RESOURCE_GROUP_PATH, API_VERSION)
            .with_path_param("resourceGroupName", resource_group_name);
        self.inner.pager(descriptor, options)
    }

    fn set(&self, method: Method, resource_group_name: &str, name: &str) -> OperationDescriptor {
        self.inner
            .descriptor(method, SET_PATH, API_VERSION)
            .with_path_param("resourceGroupName", resource_group_name)
            .with_path_param("availabilitySetName", name)
    }
}
