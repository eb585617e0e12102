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
use crate::model::{VirtualMachine, VirtualMachineListResult};
use crate::options::{BeginOptions, DeleteOptions, GetOptions, ListOptions, PowerOffOptions};
use gax::Result;
use gax::paginator::Pager;
use gax::response::Response;
use http::Method;
use lro::{FinalStateVia, NoResult, Poller};
use std::sync::Arc;

const API_VERSION: &str = "2024-07-01";
const VM_PATH: &str = "/subscriptions/{subscriptionId}/resourceGroups/{resourceGroupName}/providers/Microsoft.Compute/virtualMachines/{vmName}";
const RESOURCE_GROUP_PATH: &str = "/subscriptions/{subscriptionId}/resourceGroups/{resourceGroupName}/providers/Microsoft.Compute/virtualMachines";
const SUBSCRIPTION_PATH: &str =
    "/subscriptions/{subscriptionId}/providers/Microsoft.Compute/virtualMachines";

/// Operations on virtual machines.
///
/// Obtain instances with [Client::virtual_machines].
///
/// # Example
/// ```
/// # use compute::client::Client;
/// # use compute::model::{HardwareProfile, VirtualMachine, VirtualMachineProperties};
/// # use tokio_util::sync::CancellationToken;
/// # async fn sample(client: &Client) -> gax::Result<()> {
/// let vm = VirtualMachine::new()
///     .set_location("eastus")
///     .set_properties(VirtualMachineProperties::new().set_hardware_profile(HardwareProfile::new("Standard_B1s")));
/// let mut poller = client
///     .virtual_machines()
///     .begin_create_or_update("my-resource-group", "my-vm", &vm, Default::default())
///     .await?;
/// let vm = poller
///     .poll_until_done(&CancellationToken::new(), Default::default())
///     .await?;
/// println!("created {:?}", vm.id);
/// # Ok(()) }
/// ```
///
/// [Client::virtual_machines]: crate::client::Client::virtual_machines
#[derive(Clone, Debug)]
pub struct VirtualMachines {
    inner: Arc<Inner>,
}

impl VirtualMachines {
    pub(crate) fn new(inner: Arc<Inner>) -> Self {
        Self { inner }
    }

    /// Retrieves a virtual machine.
    pub async fn get(
        &self,
        resource_group_name: &str,
        vm_name: &str,
        options: GetOptions,
    ) -> Result<Response<VirtualMachine>> {
        let descriptor = self
            .vm(Method::GET, resource_group_name, vm_name)
            .with_optional_query_param("$expand", options.expand);
        self.inner
            .execute_json(descriptor, options.request_options)
            .await
    }

    /// Lists the virtual machines in a resource group.
    ///
    /// No request is sent until the first page is requested.
    pub fn new_list_pager(
        &self,
        resource_group_name: &str,
        options: ListOptions,
    ) -> Pager<VirtualMachineListResult> {
        let descriptor = self
            .inner
            .descriptor(Method::GET, RESOURCE_GROUP_PATH, API_VERSION)
            .with_path_param("resourceGroupName", resource_group_name)
            .with_optional_query_param("$filter", options.filter)
            .with_optional_query_param("$expand", options.expand);
        self.inner.pager(descriptor, options.request_options)
    }

    /// Lists all the virtual machines in the subscription.
    pub fn new_list_all_pager(&self, options: ListOptions) -> Pager<VirtualMachineListResult> {
        let descriptor = self
            .inner
            .descriptor(Method::GET, SUBSCRIPTION_PATH, API_VERSION)
            .with_optional_query_param("statusOnly", options.status_only)
            .with_optional_query_param("$filter", options.filter)
            .with_optional_query_param("$expand", options.expand);
        self.inner.pager(descriptor, options.request_options)
    }

    /// Creates or updates a virtual machine.
    ///
    /// The result of the operation is the virtual machine, retrieved from the
    /// original URL once the operation completes.
    pub async fn begin_create_or_update(
        &self,
        resource_group_name: &str,
        vm_name: &str,
        parameters: &VirtualMachine,
        options: BeginOptions,
    ) -> Result<Poller<VirtualMachine>> {
        let descriptor = self
            .vm(Method::PUT, resource_group_name, vm_name)
            .with_json_body(parameters)?;
        self.inner
            .begin(descriptor, Some(FinalStateVia::OriginalUri), options)
            .await
    }

    /// Deletes a virtual machine.
    pub async fn begin_delete(
        &self,
        resource_group_name: &str,
        vm_name: &str,
        options: DeleteOptions,
    ) -> Result<Poller<NoResult>> {
        let descriptor = self
            .vm(Method::DELETE, resource_group_name, vm_name)
            .with_optional_query_param("forceDeletion", options.force_deletion);
        self.inner.begin(descriptor, None, options.into()).await
    }

    /// Powers off (stops) a virtual machine.
    ///
    /// The virtual machine continues to be billed, use
    /// [begin_deallocate][Self::begin_deallocate] to release the compute
    /// resources.
    pub async fn begin_power_off(
        &self,
        resource_group_name: &str,
        vm_name: &str,
        options: PowerOffOptions,
    ) -> Result<Poller<NoResult>> {
        let descriptor = self
            .action(resource_group_name, vm_name, "powerOff")
            .with_optional_query_param("skipShutdown", options.skip_shutdown);
        self.inner
            .begin(descriptor, Some(FinalStateVia::Location), options.into())
            .await
    }

    /// Starts a virtual machine.
    pub async fn begin_start(
        &self,
        resource_group_name: &str,
        vm_name: &str,
        options: BeginOptions,
    ) -> Result<Poller<NoResult>> {
        let descriptor = self.action(resource_group_name, vm_name, "start");
        self.inner
            .begin(descriptor, Some(FinalStateVia::Location), options)
            .await
    }

    /// Shuts down a virtual machine and releases its compute resources.
    pub async fn begin_deallocate(
        &self,
        resource_group_name: &str,
        vm_name: &str,
        options: BeginOptions,
    ) -> Result<Poller<NoResult>> {
        let descriptor = self.action(resource_group_name, vm_name, "deallocate");
        self.inner
            .begin(descriptor, Some(FinalStateVia::Location), options)
            .await
    }

    fn vm(
        &self,
        method: Method,
        resource_group_name: &str,
        vm_name: &str,
    ) -> gax::operation::OperationDescriptor {
        self.inner
            .descriptor(method, VM_PATH, API_VERSION)
            .with_path_param("resourceGroupName", resource_group_name)
            .with_path_param("vmName", vm_name)
    }

    fn action(
        &self,
        resource_group_name: &str,
        vm_name: &str,
        action: &str,
    ) -> gax::operation::OperationDescriptor {
        self.inner
            .descriptor(Method::POST, format!("{VM_PATH}/{action}"), API_VERSION)
            .with_path_param("resourceGroupName", resource_group_name)
            .with_path_param("vmName", vm_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::{MockInvoker, client, response};
    use lro::{OperationStatus, PollerKind};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use tokio_util::sync::CancellationToken;

    const VM_URL: &str = "https://test.example.com/subscriptions/sub-1/resourceGroups/rg-1/providers/Microsoft.Compute/virtualMachines/vm-1";

    #[tokio::test]
    async fn get() -> anyhow::Result<()> {
        let mut invoker = MockInvoker::new();
        invoker
            .expect_execute()
            .withf(|r, _| {
                r.method == Method::GET
                    && r.url == format!("{VM_URL}?api-version={API_VERSION}&%24expand=instanceView")
            })
            .return_once(|_, _| Ok(response(200, &[], json!({"name": "vm-1", "location": "eastus"}))));
        let got = client(invoker)
            .virtual_machines()
            .get("rg-1", "vm-1", GetOptions::default().set_expand("instanceView"))
            .await?;
        assert_eq!(got.body().name.as_deref(), Some("vm-1"));
        assert_eq!(got.body().location.as_deref(), Some("eastus"));
        Ok(())
    }

    #[tokio::test]
    async fn get_binding_error() -> anyhow::Result<()> {
        let mut invoker = MockInvoker::new();
        invoker.expect_execute().never();
        let err = client(invoker)
            .virtual_machines()
            .get("rg-1", "", GetOptions::default())
            .await
            .expect_err("empty vm name");
        assert!(err.is_binding(), "{err:?}");
        Ok(())
    }

    #[tokio::test]
    async fn create_or_update_completes_immediately() -> anyhow::Result<()> {
        let mut invoker = MockInvoker::new();
        invoker
            .expect_execute()
            .withf(|r, _| {
                let body = r
                    .body
                    .as_ref()
                    .and_then(|b| serde_json::from_slice::<Value>(b).ok());
                r.method == Method::PUT
                    && r.url == format!("{VM_URL}?api-version={API_VERSION}")
                    && body == Some(json!({"location": "eastus"}))
            })
            .return_once(|_, _| {
                Ok(response(
                    200,
                    &[],
                    json!({"name": "vm-1", "properties": {"provisioningState": "Succeeded"}}),
                ))
            });
        let mut poller = client(invoker)
            .virtual_machines()
            .begin_create_or_update(
                "rg-1",
                "vm-1",
                &VirtualMachine::new().set_location("eastus"),
                BeginOptions::default(),
            )
            .await?;
        assert_eq!(poller.kind(), PollerKind::NoOp);
        assert_eq!(poller.status(), OperationStatus::Succeeded);
        let vm = poller
            .poll_until_done(&CancellationToken::new(), Default::default())
            .await?;
        assert_eq!(vm.provisioning_state(), Some("Succeeded"));
        Ok(())
    }

    #[tokio::test]
    async fn power_off_starts_operation() -> anyhow::Result<()> {
        let mut invoker = MockInvoker::new();
        invoker
            .expect_execute()
            .withf(|r, _| {
                r.method == Method::POST
                    && r.url
                        == format!("{VM_URL}/powerOff?api-version={API_VERSION}&skipShutdown=true")
            })
            .return_once(|_, _| {
                Ok(response(
                    202,
                    &[("location", "https://test.example.com/operations/op-1")],
                    Value::Null,
                ))
            });
        let poller = client(invoker)
            .virtual_machines()
            .begin_power_off("rg-1", "vm-1", PowerOffOptions::default().set_skip_shutdown(true))
            .await?;
        assert_eq!(poller.kind(), PollerKind::Location);
        assert_eq!(poller.polling_url(), "https://test.example.com/operations/op-1");
        assert!(!poller.done());
        Ok(())
    }

    #[tokio::test]
    async fn delete_resumes_without_request() -> anyhow::Result<()> {
        let mut first = MockInvoker::new();
        first.expect_execute().times(1).returning(|r, _| {
            assert_eq!(r.method, Method::DELETE);
            assert!(r.url.contains("forceDeletion=true"), "{}", r.url);
            Ok(response(
                202,
                &[("azure-asyncoperation", "https://test.example.com/operations/op-2")],
                Value::Null,
            ))
        });
        let poller = client(first)
            .virtual_machines()
            .begin_delete("rg-1", "vm-1", DeleteOptions::default().set_force_deletion(true))
            .await?;
        let token = poller.resume_token()?;

        let mut second = MockInvoker::new();
        second.expect_execute().never();
        let resumed = client(second)
            .virtual_machines()
            .begin_delete("rg-1", "vm-1", DeleteOptions::default().set_resume_token(&token))
            .await?;
        assert_eq!(resumed.kind(), PollerKind::AzureAsyncOperation);
        assert_eq!(resumed.polling_url(), "https://test.example.com/operations/op-2");
        Ok(())
    }

    #[tokio::test]
    async fn list_all() -> anyhow::Result<()> {
        let mut invoker = MockInvoker::new();
        invoker
            .expect_execute()
            .withf(|r, _| {
                r.url
                    == format!(
                        "https://test.example.com/subscriptions/sub-1/providers/Microsoft.Compute/virtualMachines?api-version={API_VERSION}&statusOnly=true"
                    )
            })
            .return_once(|_, _| Ok(response(200, &[], json!({"value": [{"name": "vm-1"}]}))));
        let mut pager = client(invoker)
            .virtual_machines()
            .new_list_all_pager(ListOptions::default().set_status_only(true));
        let page = pager.next_page(&CancellationToken::new()).await?;
        assert_eq!(page.value.len(), 1);
        assert!(!pager.more());
        Ok(())
    }
}
