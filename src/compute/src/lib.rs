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

//! Resource manager client for the compute resource provider.
//!
//! This crate covers virtual machines, managed disks, and availability sets.
//! Operations that complete asynchronously return a [lro::Poller], list
//! operations return a [gax::paginator::Pager].
//!
//! # Example
//! ```no_run
//! # use compute::client::Client;
//! # use tokio_util::sync::CancellationToken;
//! # async fn sample() -> gax::Result<()> {
//! let client = Client::builder("00000000-0000-0000-0000-000000000000").build()?;
//! let cancel = CancellationToken::new();
//! let mut pager = client.virtual_machines().new_list_all_pager(Default::default());
//! while pager.more() {
//!     for vm in pager.next_page(&cancel).await?.value {
//!         println!("{:?}", vm.name);
//!     }
//! }
//! # Ok(()) }
//! ```

pub mod client;
pub mod model;
pub mod options;

mod availability_sets;
mod disks;
mod virtual_machines;

pub use availability_sets::AvailabilitySets;
pub use disks::Disks;
pub use virtual_machines::VirtualMachines;
