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

use crate::availability_sets::AvailabilitySets;
use crate::disks::Disks;
use crate::options::BeginOptions;
use crate::virtual_machines::VirtualMachines;
use gax::Result;
use gax::backoff_policy::BackoffPolicyArg;
use gax::error::Error;
use gax::http_client::{ReqwestClient, RequestInvoker};
use gax::operation::{BindingError, OperationDescriptor};
use gax::options::{ClientConfig, RequestOptions};
use gax::paginator::{PageableResponse, Pager};
use gax::response::Response;
use gax::retry_policy::RetryPolicyArg;
use http::Method;
use lro::{FinalStateVia, Poller, PollerBuilder};
use std::sync::Arc;
use std::time::Duration;

/// Implements a client for the compute resource provider.
///
/// The client is cheap to clone, all clones share the same connection pool.
/// Use [virtual_machines()], [disks()], and [availability_sets()] to access
/// the operations on each resource type.
///
/// # Example
/// ```
/// # use compute::client::Client;
/// # async fn sample() -> gax::Result<()> {
/// let client = Client::builder("00000000-0000-0000-0000-000000000000").build()?;
/// let vm = client
///     .virtual_machines()
///     .get("my-resource-group", "my-vm", Default::default())
///     .await?;
/// println!("{:?}", vm.body().provisioning_state());
/// # Ok(()) }
/// ```
///
/// [virtual_machines()]: Client::virtual_machines
/// [disks()]: Client::disks
/// [availability_sets()]: Client::availability_sets
#[derive(Clone, Debug)]
pub struct Client {
    inner: Arc<Inner>,
}

impl Client {
    /// Returns a builder for [Client].
    pub fn builder<T: Into<String>>(subscription_id: T) -> ClientBuilder {
        ClientBuilder::new(subscription_id)
    }

    pub fn subscription_id(&self) -> &str {
        &self.inner.subscription_id
    }

    pub fn virtual_machines(&self) -> VirtualMachines {
        VirtualMachines::new(self.inner.clone())
    }

    pub fn disks(&self) -> Disks {
        Disks::new(self.inner.clone())
    }

    pub fn availability_sets(&self) -> AvailabilitySets {
        AvailabilitySets::new(self.inner.clone())
    }
}

/// A builder for [Client].
///
/// By default the client uses the public cloud endpoint, and a
/// [reqwest]-based invoker. Applications that need authentication, proxies,
/// or custom transports provide their own [RequestInvoker].
///
/// ```
/// # use compute::client::Client;
/// use std::time::Duration;
/// let client = Client::builder("00000000-0000-0000-0000-000000000000")
///     .with_endpoint("https://management.usgovcloudapi.net")
///     .with_polling_frequency(Duration::from_secs(5))
///     .with_tracing()
///     .build()?;
/// # gax::Result::<()>::Ok(())
/// ```
///
/// [reqwest]: https://docs.rs/reqwest
#[derive(Clone, Debug)]
pub struct ClientBuilder {
    subscription_id: String,
    config: ClientConfig,
    invoker: Option<Arc<dyn RequestInvoker>>,
}

impl ClientBuilder {
    fn new<T: Into<String>>(subscription_id: T) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            config: ClientConfig::default(),
            invoker: None,
        }
    }

    /// Creates the client.
    ///
    /// Fails if the subscription id is empty.
    pub fn build(self) -> Result<Client> {
        if self.subscription_id.trim().is_empty() {
            return Err(Error::binding(BindingError::EmptyParameter(
                "subscriptionId".to_string(),
            )));
        }
        let invoker = match self.invoker {
            Some(i) => i,
            None => Arc::new(ReqwestClient::new(&self.config)),
        };
        let inner = Inner {
            subscription_id: self.subscription_id,
            endpoint: self.config.endpoint().trim_end_matches('/').to_string(),
            polling_frequency: self.config.polling_frequency(),
            invoker,
        };
        tracing::debug!(endpoint = %inner.endpoint, "created compute client");
        Ok(Client {
            inner: Arc::new(inner),
        })
    }

    /// Replaces the configuration.
    ///
    /// This discards any setting applied with the other `with_*()` functions.
    pub fn with_config(mut self, v: ClientConfig) -> Self {
        self.config = v;
        self
    }

    /// Sets the endpoint, for example to use a sovereign cloud.
    pub fn with_endpoint<V: Into<String>>(mut self, v: V) -> Self {
        self.config = self.config.set_endpoint(v);
        self
    }

    /// Enables tracing in the default invoker.
    pub fn with_tracing(mut self) -> Self {
        self.config = self.config.enable_tracing();
        self
    }

    /// Configure the retry policy of the default invoker.
    pub fn with_retry_policy<V: Into<RetryPolicyArg>>(mut self, v: V) -> Self {
        self.config = self.config.set_retry_policy(v);
        self
    }

    /// Configure the retry backoff policy of the default invoker.
    pub fn with_backoff_policy<V: Into<BackoffPolicyArg>>(mut self, v: V) -> Self {
        self.config = self.config.set_backoff_policy(v);
        self
    }

    /// The delay between polls of long-running operations, unless the service
    /// suggests a different delay.
    pub fn with_polling_frequency<V: Into<Duration>>(mut self, v: V) -> Self {
        self.config = self.config.set_polling_frequency(v);
        self
    }

    /// Prepends this prefix to the user agent of the default invoker.
    pub fn with_user_agent<V: Into<String>>(mut self, v: V) -> Self {
        self.config = self.config.set_user_agent(v);
        self
    }

    /// Sends all requests using `v`.
    ///
    /// The retry, backoff, tracing, and user agent settings only apply to the
    /// default invoker, and are ignored if this is set.
    pub fn with_invoker(mut self, v: Arc<dyn RequestInvoker>) -> Self {
        self.invoker = Some(v);
        self
    }
}

/// The state shared by all the resource clients.
#[derive(Debug)]
pub(crate) struct Inner {
    subscription_id: String,
    endpoint: String,
    polling_frequency: Duration,
    invoker: Arc<dyn RequestInvoker>,
}

impl Inner {
    /// Starts a descriptor with the subscription id bound.
    pub(crate) fn descriptor<T: Into<String>>(
        &self,
        method: Method,
        template: T,
        api_version: &str,
    ) -> OperationDescriptor {
        OperationDescriptor::new(method, template)
            .with_path_param("subscriptionId", self.subscription_id.as_str())
            .with_api_version(api_version)
    }

    pub(crate) async fn execute_json<T>(
        &self,
        descriptor: OperationDescriptor,
        options: RequestOptions,
    ) -> Result<Response<T>>
    where
        T: serde::de::DeserializeOwned + Default,
    {
        gax::operation::execute_json(self.invoker.as_ref(), &self.endpoint, descriptor, options)
            .await
    }

    pub(crate) async fn execute(
        &self,
        descriptor: OperationDescriptor,
        options: RequestOptions,
    ) -> Result<Response<()>> {
        let response =
            gax::operation::execute(self.invoker.as_ref(), &self.endpoint, descriptor, options)
                .await?;
        Ok(response.map(|_| ()))
    }

    pub(crate) fn pager<P>(&self, descriptor: OperationDescriptor, options: RequestOptions) -> Pager<P>
    where
        P: PageableResponse + serde::de::DeserializeOwned + Default + Send + 'static,
    {
        Pager::next_link_fetcher(
            self.invoker.clone(),
            self.endpoint.clone(),
            descriptor,
            options,
        )
    }

    /// Starts a long-running operation, or resumes polling one.
    ///
    /// With a resume token in `options` no request is sent.
    pub(crate) async fn begin<R>(
        &self,
        descriptor: OperationDescriptor,
        final_state_via: Option<FinalStateVia>,
        options: BeginOptions,
    ) -> Result<Poller<R>> {
        let mut builder = PollerBuilder::new(self.invoker.clone())
            .with_polling_frequency(self.polling_frequency)
            .with_request_options(options.request_options.clone());
        if let Some(v) = final_state_via {
            builder = builder.with_final_state_via(v);
        }
        if let Some(token) = options.resume_token {
            return builder.from_resume_token(&token);
        }
        let method = descriptor.method().clone();
        let url = descriptor.build_url(&self.endpoint)?;
        let descriptor = descriptor.with_expected_status([200, 201, 202, 204]);
        let response = gax::operation::execute(
            self.invoker.as_ref(),
            &self.endpoint,
            descriptor,
            options.request_options,
        )
        .await?;
        builder.from_response(method, url, response)
    }
}
