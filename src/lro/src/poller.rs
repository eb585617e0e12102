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

use crate::PollUntilDoneOptions;
use crate::kind::{FinalStateVia, PollerKind, PollingHeaders, result_url};
use crate::status::{
    OperationStatus, parse_body, provisioning_state, resource_location, status_field,
};
use crate::token::PollingState;
use gax::Result;
use gax::error::Error;
use gax::http_client::{Request, RequestInvoker};
use gax::operation::decode_json;
use gax::options::{DEFAULT_POLLING_FREQUENCY, RequestOptions};
use gax::response::RawResponse;
use http::{HeaderValue, Method};
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Creates [Poller] instances.
///
/// # Example
/// ```no_run
/// # use lro::{FinalStateVia, Poller, PollerBuilder};
/// # use gax::http_client::RequestInvoker;
/// # use gax::response::RawResponse;
/// # use std::sync::Arc;
/// # fn sample(invoker: Arc<dyn RequestInvoker>, response: RawResponse) -> gax::Result<()> {
/// let poller: Poller<serde_json::Value> = PollerBuilder::new(invoker)
///     .with_final_state_via(FinalStateVia::OriginalUri)
///     .from_response(http::Method::PUT, "https://management.azure.com/subscriptions/...", response)?;
/// # Ok(()) }
/// ```
#[derive(Clone, Debug)]
pub struct PollerBuilder {
    invoker: Arc<dyn RequestInvoker>,
    options: RequestOptions,
    final_state_via: Option<FinalStateVia>,
    frequency: Duration,
}

impl PollerBuilder {
    pub fn new(invoker: Arc<dyn RequestInvoker>) -> Self {
        Self {
            invoker,
            options: RequestOptions::default(),
            final_state_via: None,
            frequency: DEFAULT_POLLING_FREQUENCY,
        }
    }

    /// The options used for all polling requests.
    pub fn with_request_options(mut self, v: RequestOptions) -> Self {
        self.options = v;
        self
    }

    /// Where to find the result of a successful operation.
    pub fn with_final_state_via(mut self, v: FinalStateVia) -> Self {
        self.final_state_via = Some(v);
        self
    }

    /// The default interval between polling requests.
    ///
    /// A `Retry-After` header in the polling responses takes precedence.
    pub fn with_polling_frequency(mut self, v: Duration) -> Self {
        self.frequency = v;
        self
    }

    /// Creates a poller from the response to the request starting the
    /// operation.
    ///
    /// `method` and `original_url` describe that request. Fails with a
    /// protocol error if the response uses an unexpected status code, if any
    /// polling header is not an absolute URL, or if a `DELETE` or `POST`
    /// returns `202` without any polling header. If the response shows the
    /// operation already failed, returns the same error as polling would.
    pub fn from_response<R>(
        self,
        method: Method,
        original_url: impl Into<String>,
        response: RawResponse,
    ) -> Result<Poller<R>> {
        let original_url = original_url.into();
        let code = response.status().as_u16();
        if !matches!(code, 200 | 201 | 202 | 204) {
            return Err(Error::protocol(format!(
                "unexpected status code {code} starting a long-running operation"
            )));
        }
        let headers = PollingHeaders::new(response.headers())?;
        let body = parse_body(response.body());
        let resource = matches!(method, Method::PUT | Method::PATCH);
        let provisioning = provisioning_state(body.as_ref()).map(str::to_string);
        if code == 200 {
            let status = provisioning
                .as_deref()
                .map_or(OperationStatus::Succeeded, OperationStatus::from_service);
            if matches!(status, OperationStatus::Failed | OperationStatus::Canceled) {
                return Err(Error::operation_failed(status.as_str(), response.body().clone()));
            }
        }

        let (kind, polling_url, status) = match headers.select(self.final_state_via) {
            Some((kind, url)) => (kind, url, OperationStatus::InProgress),
            None => match (code, resource) {
                (202, true) => (PollerKind::Body, original_url.clone(), OperationStatus::InProgress),
                (202, false) => {
                    return Err(Error::protocol(format!(
                        "missing polling URL in 202 response to {method} request"
                    )));
                }
                (201, false) => {
                    return Err(Error::protocol(format!(
                        "missing Location header in 201 response to {method} request"
                    )));
                }
                (200 | 201, true) => {
                    let status = match (&provisioning, code) {
                        (Some(s), _) => OperationStatus::from_service(s),
                        (None, 201) => OperationStatus::InProgress,
                        (None, _) => OperationStatus::Succeeded,
                    };
                    let kind = if status.is_terminal() {
                        PollerKind::NoOp
                    } else {
                        PollerKind::Body
                    };
                    (kind, original_url.clone(), status)
                }
                _ => (PollerKind::NoOp, original_url.clone(), OperationStatus::Succeeded),
            },
        };
        tracing::debug!(?kind, %polling_url, %status, "starting long-running operation poller");
        if matches!(status, OperationStatus::Failed | OperationStatus::Canceled) {
            return Err(Error::operation_failed(status.as_str(), response.body().clone()));
        }
        let state = PollingState {
            kind,
            result_url: result_url(&method, &original_url, &headers, self.final_state_via),
            method,
            original_url: original_url.clone(),
            polling_url,
            final_state_via: self.final_state_via,
        };
        let final_response = (kind == PollerKind::NoOp).then(|| response.clone());
        Ok(Poller {
            invoker: self.invoker,
            options: self.options,
            frequency: self.frequency,
            state,
            status,
            status_text: provisioning,
            last_url: Some(original_url),
            last_response: Some(response),
            final_response,
            result: PhantomData,
        })
    }

    /// Creates a poller from a token returned by [Poller::resume_token].
    ///
    /// No request is sent. The first call to [Poller::poll_once] queries the
    /// polling URL saved in the token.
    pub fn from_resume_token<R>(self, token: &str) -> Result<Poller<R>> {
        let mut state = PollingState::decode(token)?;
        if state.final_state_via.is_none() {
            state.final_state_via = self.final_state_via;
        }
        tracing::debug!(kind = ?state.kind, polling_url = %state.polling_url, "resuming long-running operation poller");
        Ok(Poller {
            invoker: self.invoker,
            options: self.options,
            frequency: self.frequency,
            state,
            status: OperationStatus::InProgress,
            status_text: None,
            last_url: None,
            last_response: None,
            final_response: None,
            result: PhantomData,
        })
    }
}

/// Drives a long-running operation to completion.
///
/// Create pollers with a [PollerBuilder]. Use [poll_until_done] to wait for
/// the result, or [poll_once] to control the polling loop.
///
/// A poller is not intended for concurrent use, all its functions take
/// `&mut self`. Independent pollers may share the same invoker.
///
/// [poll_once]: Poller::poll_once
/// [poll_until_done]: Poller::poll_until_done
pub struct Poller<R> {
    invoker: Arc<dyn RequestInvoker>,
    options: RequestOptions,
    frequency: Duration,
    state: PollingState,
    status: OperationStatus,
    // The status as reported by the service, e.g. `Creating`.
    status_text: Option<String>,
    last_url: Option<String>,
    last_response: Option<RawResponse>,
    final_response: Option<RawResponse>,
    result: PhantomData<fn() -> R>,
}

impl<R> Poller<R>
where
    R: serde::de::DeserializeOwned + Default,
{
    /// Returns `true` once the operation reached a terminal state.
    pub fn done(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn status(&self) -> OperationStatus {
        self.status
    }

    /// The status reported by the service in the last polling response, if
    /// any.
    pub fn status_text(&self) -> Option<&str> {
        self.status_text.as_deref()
    }

    pub fn kind(&self) -> PollerKind {
        self.state.kind
    }

    /// The URL queried by the next call to [poll_once][Self::poll_once].
    pub fn polling_url(&self) -> &str {
        &self.state.polling_url
    }

    /// Returns a token to resume polling, possibly in a different process.
    ///
    /// Fails with a misuse error if the operation is complete.
    pub fn resume_token(&self) -> Result<String> {
        if self.done() || self.state.kind == PollerKind::NoOp {
            return Err(Error::misuse(
                "cannot create a resume token for a completed operation",
            ));
        }
        self.state.encode()
    }

    /// Queries the status of the operation once.
    ///
    /// Returns `true` if the operation succeeded. In that case the result is
    /// available from [result][Self::result]. If the operation failed or was
    /// canceled returns an error, the same error is returned by any
    /// further call. Once the operation is complete no more requests are
    /// sent.
    ///
    /// Errors sending the request are returned to the caller, the invoker is
    /// responsible for retrying transient failures. If `cancel` fires before
    /// the response arrives the state of the poller does not change.
    pub async fn poll_once(&mut self, cancel: &CancellationToken) -> Result<bool> {
        match self.status {
            OperationStatus::Failed | OperationStatus::Canceled => return Err(self.failure()),
            OperationStatus::Succeeded => {
                self.fetch_result(cancel).await?;
                return Ok(true);
            }
            OperationStatus::InProgress => {}
        }
        let url = self.state.polling_url.clone();
        let response = self.get(&url, cancel).await?;
        self.update(url, response)?;
        match self.status {
            OperationStatus::InProgress => Ok(false),
            OperationStatus::Succeeded => {
                self.fetch_result(cancel).await?;
                Ok(true)
            }
            OperationStatus::Failed | OperationStatus::Canceled => Err(self.failure()),
        }
    }

    /// Polls the operation until it completes, returning its result.
    ///
    /// Waits between polling requests for the interval in the `Retry-After`
    /// header of the last response, or the configured frequency if there is
    /// no such header. `cancel` interrupts both the requests and the waits.
    pub async fn poll_until_done(
        &mut self,
        cancel: &CancellationToken,
        options: PollUntilDoneOptions,
    ) -> Result<R> {
        let frequency = options.frequency.unwrap_or(self.frequency);
        if !self.done() {
            if let Some(delay) = self.retry_after() {
                tracing::debug!(?delay, "waiting before the first poll");
                wait(delay, cancel).await?;
            }
        }
        while !self.poll_once(cancel).await? {
            let delay = self.retry_after().unwrap_or(frequency);
            wait(delay, cancel).await?;
        }
        self.result()
    }

    /// Returns the result of a successful operation.
    ///
    /// Fails with a misuse error if the result is not available yet, and with
    /// an operation-failed error if the operation failed.
    pub fn result(&self) -> Result<R> {
        match (self.status, &self.final_response) {
            (OperationStatus::Failed | OperationStatus::Canceled, _) => Err(self.failure()),
            (OperationStatus::Succeeded, Some(response)) => decode_json::<R>(response.body()),
            (OperationStatus::Succeeded, None) => Err(Error::misuse(
                "the result of the operation has not been retrieved, call poll_once()",
            )),
            (OperationStatus::InProgress, _) => {
                Err(Error::misuse("the operation has not completed"))
            }
        }
    }

    /// The response used to decode the result, once available.
    pub fn final_response(&self) -> Option<&RawResponse> {
        self.final_response.as_ref()
    }

    /// Converts the poller into a [Stream][futures::Stream].
    ///
    /// The stream yields [PollingResult::InProgress] after each polling
    /// request that did not complete the operation, and ends after a
    /// [PollingResult::Completed] or a [PollingResult::PollingError].
    ///
    /// [PollingResult::Completed]: crate::PollingResult::Completed
    /// [PollingResult::InProgress]: crate::PollingResult::InProgress
    /// [PollingResult::PollingError]: crate::PollingResult::PollingError
    #[cfg(feature = "unstable-stream")]
    pub fn into_stream(self) -> impl futures::Stream<Item = crate::PollingResult<R>> + Send + Unpin
    where
        R: Send + 'static,
    {
        use crate::PollingResult;
        use futures::stream::unfold;
        let cancel = CancellationToken::new();
        let stream = unfold(Some((self, true)), move |state| {
            let cancel = cancel.clone();
            async move {
                let Some((mut poller, first)) = state else {
                    return None;
                };
                if !first && !poller.done() {
                    let delay = poller.retry_after().unwrap_or(poller.frequency);
                    if let Err(e) = wait(delay, &cancel).await {
                        return Some((PollingResult::PollingError(e), None));
                    }
                }
                match poller.poll_once(&cancel).await {
                    Ok(false) => {
                        let status = poller.status_text.clone();
                        Some((PollingResult::InProgress(status), Some((poller, false))))
                    }
                    Ok(true) => Some((PollingResult::Completed(poller.result()), None)),
                    Err(e) if e.is_operation_failed() => Some((PollingResult::Completed(Err(e)), None)),
                    Err(e) => Some((PollingResult::PollingError(e), None)),
                }
            }
        });
        Box::pin(stream)
    }

    async fn get(&self, url: &str, cancel: &CancellationToken) -> Result<RawResponse> {
        let request = Request::get(url).set_header(
            http::header::ACCEPT,
            HeaderValue::from_static("application/json"),
        );
        let execute = self.invoker.execute(request, self.options.clone());
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::cancelled("the polling request was cancelled")),
            response = execute => response,
        }
    }

    /// Updates the state from a polling response.
    ///
    /// The state is unchanged if the response is invalid.
    fn update(&mut self, url: String, response: RawResponse) -> Result<()> {
        let code = response.status().as_u16();
        if !matches!(code, 200 | 201 | 202 | 204) {
            return Err(Error::protocol(format!(
                "unexpected status code {code} polling {url}"
            )));
        }
        let headers = PollingHeaders::new(response.headers())?;
        let body = parse_body(response.body());
        let provisioning = provisioning_state(body.as_ref());
        // Only status monitors have a `status` field with the operation state.
        // A resource returned by a `Location` URL may have an unrelated one.
        let (status, reported) = match self.state.kind {
            PollerKind::AzureAsyncOperation | PollerKind::OperationLocation => {
                match status_field(body.as_ref()).filter(|s| !s.trim().is_empty()) {
                    Some(s) => (OperationStatus::from_service(s), Some(s)),
                    None => {
                        return Err(Error::protocol(format!(
                            "missing status field in the operation status monitor at {url}"
                        )));
                    }
                }
            }
            PollerKind::Location | PollerKind::Body | PollerKind::NoOp => match code {
                202 => (OperationStatus::InProgress, provisioning),
                204 => (OperationStatus::Succeeded, None),
                _ => (
                    provisioning.map_or(OperationStatus::Succeeded, OperationStatus::from_service),
                    provisioning,
                ),
            },
        };
        let reported = reported.map(str::to_string);

        if let Some(next) = headers.for_kind(self.state.kind) {
            self.state.polling_url = next.clone();
        }
        if status == OperationStatus::Succeeded
            && self.state.kind == PollerKind::OperationLocation
            && matches!(
                self.state.final_state_via,
                None | Some(FinalStateVia::OperationLocation)
            )
        {
            if let Some(location) = resource_location(body.as_ref())
                .filter(|l| crate::kind::is_absolute_url(l))
            {
                self.state.result_url = Some(location.to_string());
            }
        }
        tracing::debug!(%url, %status, reported = ?reported, "polled long-running operation");
        self.status = status;
        self.status_text = reported;
        self.last_url = Some(url);
        self.last_response = Some(response);
        Ok(())
    }

    /// Retrieves the final result, unless it is already available.
    async fn fetch_result(&mut self, cancel: &CancellationToken) -> Result<()> {
        if self.final_response.is_some() {
            return Ok(());
        }
        let url = match &self.state.result_url {
            Some(url) if self.last_url.as_ref() != Some(url) => url.clone(),
            _ => {
                self.final_response = self.last_response.clone();
                return Ok(());
            }
        };
        tracing::debug!(%url, "fetching the result of the long-running operation");
        let response = self.get(&url, cancel).await?;
        let code = response.status().as_u16();
        if !matches!(code, 200 | 201 | 204) {
            return Err(Error::protocol(format!(
                "unexpected status code {code} fetching the result from {url}"
            )));
        }
        self.final_response = Some(response);
        Ok(())
    }

    fn failure(&self) -> Error {
        let payload = self
            .last_response
            .as_ref()
            .map(|r| r.body().clone())
            .unwrap_or_default();
        Error::operation_failed(self.status.as_str(), payload)
    }

    fn retry_after(&self) -> Option<Duration> {
        self.last_response
            .as_ref()
            .and_then(|r| gax::retry_after::from_headers(r.headers()))
            .filter(|d| !d.is_zero())
    }
}

impl<R> std::fmt::Debug for Poller<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller")
            .field("kind", &self.state.kind)
            .field("method", &self.state.method)
            .field("polling_url", &self.state.polling_url)
            .field("result_url", &self.state.result_url)
            .field("status", &self.status)
            .field("status_text", &self.status_text)
            .finish_non_exhaustive()
    }
}

async fn wait(delay: Duration, cancel: &CancellationToken) -> Result<()> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::cancelled("the wait between polling requests was cancelled")),
        _ = tokio::time::sleep(delay) => Ok(()),
    }
}
