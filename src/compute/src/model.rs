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

//! The resources and list results used by the compute clients.
//!
//! The types cover the commonly used fields only. Any other field returned
//! by the service is preserved in `_unknown_fields`, and sent back if the
//! value is used in an update.

use gax::paginator::{PageableResponse, deserialize_next_link};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

type UnknownFields = serde_json::Map<String, serde_json::Value>;

/// A reference to another resource.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct SubResource {
    /// The full resource ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl SubResource {
    pub fn new<T: Into<String>>(id: T) -> Self {
        Self { id: Some(id.into()) }
    }
}

/// The SKU of a disk or availability set.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct Sku {
    /// For example, `Premium_LRS` for disks or `Aligned` for availability
    /// sets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
}

impl Sku {
    pub fn new<T: Into<String>>(name: T) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

/// Describes a virtual machine.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct VirtualMachine {
    /// Output only. The full resource ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Output only. The virtual machine name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Output only. The resource type, `Microsoft.Compute/virtualMachines`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,

    /// The Azure region, for example `eastus`. Required on creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub tags: HashMap<String, String>,

    /// The availability zones.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub zones: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<VirtualMachineProperties>,

    #[serde(flatten)]
    pub _unknown_fields: UnknownFields,
}

impl VirtualMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_location<T: Into<String>>(mut self, v: T) -> Self {
        self.location = Some(v.into());
        self
    }

    pub fn set_tags<K, V, I>(mut self, v: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.tags = v.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self
    }

    pub fn set_zones<T: Into<String>, I: IntoIterator<Item = T>>(mut self, v: I) -> Self {
        self.zones = v.into_iter().map(Into::into).collect();
        self
    }

    pub fn set_properties<T: Into<VirtualMachineProperties>>(mut self, v: T) -> Self {
        self.properties = Some(v.into());
        self
    }

    /// The provisioning state reported by the service, if any.
    pub fn provisioning_state(&self) -> Option<&str> {
        self.properties.as_ref()?.provisioning_state.as_deref()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct VirtualMachineProperties {
    /// Output only. For example `Creating`, `Succeeded`, or `Failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,

    /// Output only. A unique ID assigned by the service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vm_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hardware_profile: Option<HardwareProfile>,

    /// The availability set containing the virtual machine. It can only be
    /// set on creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_set: Option<SubResource>,

    #[serde(flatten)]
    pub _unknown_fields: UnknownFields,
}

impl VirtualMachineProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_hardware_profile<T: Into<HardwareProfile>>(mut self, v: T) -> Self {
        self.hardware_profile = Some(v.into());
        self
    }

    pub fn set_availability_set<T: Into<String>>(mut self, id: T) -> Self {
        self.availability_set = Some(SubResource::new(id));
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct HardwareProfile {
    /// The size of the virtual machine, for example `Standard_D2s_v3`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vm_size: Option<String>,
}

impl HardwareProfile {
    pub fn new<T: Into<String>>(vm_size: T) -> Self {
        Self {
            vm_size: Some(vm_size.into()),
        }
    }
}

/// A page of virtual machines.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct VirtualMachineListResult {
    pub value: Vec<VirtualMachine>,

    #[serde(
        deserialize_with = "deserialize_next_link",
        skip_serializing_if = "Option::is_none"
    )]
    pub next_link: Option<String>,
}

impl PageableResponse for VirtualMachineListResult {
    type PageItem = VirtualMachine;

    fn next_link(&self) -> Option<&str> {
        self.next_link.as_deref()
    }

    fn into_items(self) -> Vec<Self::PageItem> {
        self.value
    }
}

/// Describes a managed disk.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct Disk {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub tags: HashMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<Sku>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub zones: Vec<String>,

    /// Output only. The virtual machine using the disk, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub managed_by: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<DiskProperties>,

    #[serde(flatten)]
    pub _unknown_fields: UnknownFields,
}

impl Disk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_location<T: Into<String>>(mut self, v: T) -> Self {
        self.location = Some(v.into());
        self
    }

    pub fn set_sku<T: Into<Sku>>(mut self, v: T) -> Self {
        self.sku = Some(v.into());
        self
    }

    pub fn set_properties<T: Into<DiskProperties>>(mut self, v: T) -> Self {
        self.properties = Some(v.into());
        self
    }

    pub fn provisioning_state(&self) -> Option<&str> {
        self.properties.as_ref()?.provisioning_state.as_deref()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct DiskProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,

    /// The size of the disk in GiB.
    #[serde(rename = "diskSizeGB", skip_serializing_if = "Option::is_none")]
    pub disk_size_gb: Option<i32>,

    /// Output only. For example `Unattached` or `Attached`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_state: Option<String>,

    /// How the disk is created. Required on creation, it cannot be changed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_data: Option<CreationData>,

    #[serde(flatten)]
    pub _unknown_fields: UnknownFields,
}

impl DiskProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_disk_size_gb(mut self, v: i32) -> Self {
        self.disk_size_gb = Some(v);
        self
    }

    pub fn set_creation_data<T: Into<CreationData>>(mut self, v: T) -> Self {
        self.creation_data = Some(v.into());
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct CreationData {
    /// For example `Empty`, `Copy`, or `FromImage`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_option: Option<String>,

    /// The source resource when copying a disk or snapshot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_resource_id: Option<String>,
}

impl CreationData {
    pub fn new<T: Into<String>>(create_option: T) -> Self {
        Self {
            create_option: Some(create_option.into()),
            ..Default::default()
        }
    }
}

/// A page of disks.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct DiskList {
    pub value: Vec<Disk>,

    #[serde(
        deserialize_with = "deserialize_next_link",
        skip_serializing_if = "Option::is_none"
    )]
    pub next_link: Option<String>,
}

impl PageableResponse for DiskList {
    type PageItem = Disk;

    fn next_link(&self) -> Option<&str> {
        self.next_link.as_deref()
    }

    fn into_items(self) -> Vec<Self::PageItem> {
        self.value
    }
}

/// Describes an availability set.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct AvailabilitySet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub tags: HashMap<String, String>,

    /// Use `Aligned` for virtual machines with managed disks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<Sku>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<AvailabilitySetProperties>,

    #[serde(flatten)]
    pub _unknown_fields: UnknownFields,
}

impl AvailabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_location<T: Into<String>>(mut self, v: T) -> Self {
        self.location = Some(v.into());
        self
    }

    pub fn set_sku<T: Into<Sku>>(mut self, v: T) -> Self {
        self.sku = Some(v.into());
        self
    }

    pub fn set_properties<T: Into<AvailabilitySetProperties>>(mut self, v: T) -> Self {
        self.properties = Some(v.into());
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct AvailabilitySetProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_update_domain_count: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_fault_domain_count: Option<i32>,

    /// Output only. The virtual machines in the availability set.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub virtual_machines: Vec<SubResource>,

    #[serde(flatten)]
    pub _unknown_fields: UnknownFields,
}

impl AvailabilitySetProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_platform_update_domain_count(mut self, v: i32) -> Self {
        self.platform_update_domain_count = Some(v);
        self
    }

    pub fn set_platform_fault_domain_count(mut self, v: i32) -> Self {
        self.platform_fault_domain_count = Some(v);
        self
    }
}

/// A page of availability sets.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct AvailabilitySetListResult {
    pub value: Vec<AvailabilitySet>,

    #[serde(
        deserialize_with = "deserialize_next_link",
        skip_serializing_if = "Option::is_none"
    )]
    pub next_link: Option<String>,
}

impl PageableResponse for AvailabilitySetListResult {
    type PageItem = AvailabilitySet;

    fn next_link(&self) -> Option<&str> {
        self.next_link.as_deref()
    }

    fn into_items(self) -> Vec<Self::PageItem> {
        self.value
    }
}
