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

//! Iterate over the pages of a list operation.
//!
//! List operations return their results in pages. Each page contains a
//! `nextLink` field with the absolute URL of the next page, the last page has
//! an empty (or missing) `nextLink`. A [Pager] hides this protocol behind two
//! functions: [more][Pager::more] and [next_page][Pager::next_page].
//!
//! # Example
//! ```no_run
//! # use gax::paginator::{Pager, PageableResponse};
//! # use tokio_util::sync::CancellationToken;
//! # async fn sample<P: PageableResponse + Send + 'static>(mut pager: Pager<P>) -> gax::Result<()>
//! # where P::PageItem: std::fmt::Debug {
//! let cancel = CancellationToken::new();
//! while pager.more() {
//!     let page = pager.next_page(&cancel).await?;
//!     for item in page.into_items() {
//!         println!("{item:?}");
//!     }
//! }
//! # Ok(()) }
//! ```

use crate::Result;
use crate::error::Error;
use crate::http_client::{Request, RequestInvoker};
use crate::operation::{OperationDescriptor, check_status, decode_json};
use crate::options::RequestOptions;
use futures::future::BoxFuture;
use http::HeaderValue;
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Describes a page returned by a list operation.
pub trait PageableResponse {
    type PageItem: Send;

    /// The continuation link, `None` or an empty string on the last page.
    fn next_link(&self) -> Option<&str>;

    /// Consumes the page, returning its items.
    fn into_items(self) -> Vec<Self::PageItem>;
}

/// Deserializes a continuation link, tolerating malformed values.
///
/// A `nextLink` field that is not a string is treated as missing, which ends
/// the iteration.
///
/// # Example
/// ```
/// #[derive(serde::Deserialize)]
/// struct Page {
///     #[serde(default, deserialize_with = "gax::paginator::deserialize_next_link")]
///     next_link: Option<String>,
/// }
/// let page = serde_json::from_str::<Page>(r#"{"next_link": 42}"#)?;
/// assert!(page.next_link.is_none());
/// # Ok::<(), serde_json::Error>(())
/// ```
pub fn deserialize_next_link<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
        _ => None,
    })
}

type Fetcher<P> = Box<dyn Fn(Option<String>) -> BoxFuture<'static, Result<P>> + Send + Sync>;

#[derive(Clone, Debug, PartialEq)]
enum Cursor {
    Start,
    Next(String),
    Done,
}

/// A forward-only iterator over the pages of a list operation.
///
/// The pager does not send any request until [next_page][Pager::next_page]
/// is called. Each call fetches exactly one page.
pub struct Pager<P> {
    fetcher: Fetcher<P>,
    cursor: Cursor,
}

impl<P> Pager<P>
where
    P: PageableResponse + Send + 'static,
{
    /// Creates a pager from a fetch function.
    ///
    /// The function receives `None` for the first page, and the `nextLink`
    /// of the previous page for all other pages.
    pub fn new<F, Fut>(fetcher: F) -> Self
    where
        F: Fn(Option<String>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<P>> + Send + 'static,
    {
        let fetcher: Fetcher<P> = Box::new(move |link| Box::pin(fetcher(link)));
        Self {
            fetcher,
            cursor: Cursor::Start,
        }
    }

    /// Creates a pager for a list operation.
    ///
    /// The first page is fetched using `descriptor`, all other pages with a
    /// `GET` request to the `nextLink` URL, which already includes the query
    /// parameters and API version.
    pub fn next_link_fetcher(
        invoker: Arc<dyn RequestInvoker>,
        endpoint: String,
        descriptor: OperationDescriptor,
        options: RequestOptions,
    ) -> Self
    where
        P: serde::de::DeserializeOwned + Default,
    {
        Self::new(move |link: Option<String>| {
            let invoker = invoker.clone();
            let endpoint = endpoint.clone();
            let descriptor = descriptor.clone();
            let options = options.clone();
            async move {
                let (request, expected) = match link {
                    None => {
                        let expected = descriptor.expected_status().to_vec();
                        (descriptor.into_request(&endpoint)?, expected)
                    }
                    Some(url) => (
                        Request::get(url).set_header(
                            http::header::ACCEPT,
                            HeaderValue::from_static("application/json"),
                        ),
                        vec![200],
                    ),
                };
                let response = invoker.execute(request, options).await?;
                check_status(&response, &expected)?;
                decode_json::<P>(response.body())
            }
        })
    }

    /// Returns `true` if there may be more pages.
    ///
    /// This is `true` before the first page is fetched, and remains `true`
    /// until a page without a continuation link is returned.
    pub fn more(&self) -> bool {
        !matches!(self.cursor, Cursor::Done)
    }

    /// Fetches the next page.
    ///
    /// Returns a misuse error if called after [more][Self::more] returns
    /// `false`. If the request fails, or `cancel` is triggered before it
    /// completes, the pager is unchanged and the same page can be requested
    /// again.
    pub async fn next_page(&mut self, cancel: &CancellationToken) -> Result<P> {
        let link = match &self.cursor {
            Cursor::Start => None,
            Cursor::Next(link) => Some(link.clone()),
            Cursor::Done => {
                return Err(Error::misuse("next_page() called after the last page"));
            }
        };
        let fetch = (self.fetcher)(link);
        let page = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(Error::cancelled("the page request was cancelled"));
            }
            page = fetch => page?,
        };
        self.cursor = match page.next_link().map(str::trim) {
            Some(link) if !link.is_empty() => Cursor::Next(link.to_string()),
            _ => Cursor::Done,
        };
        Ok(page)
    }

    /// Converts the pager into a [Stream][futures::Stream] of pages.
    ///
    /// The stream ends after the last page, or after the first error.
    #[cfg(feature = "unstable-stream")]
    pub fn into_stream(self) -> impl futures::Stream<Item = Result<P>> + Send + Unpin {
        use std::ops::ControlFlow;
        let cancel = CancellationToken::new();
        let stream = futures::stream::unfold(ControlFlow::Continue(self), move |state| {
            let cancel = cancel.clone();
            async move {
                let mut pager = match state {
                    ControlFlow::Continue(p) if p.more() => p,
                    _ => return None,
                };
                match pager.next_page(&cancel).await {
                    Ok(page) => Some((Ok(page), ControlFlow::Continue(pager))),
                    Err(e) => Some((Err(e), ControlFlow::Break(()))),
                }
            }
        });
        Box::pin(stream)
    }

    /// Converts the pager into a [Stream][futures::Stream] of items.
    ///
    /// The stream ends after the last item, or after the first error.
    #[cfg(feature = "unstable-stream")]
    pub fn into_item_stream(self) -> impl futures::Stream<Item = Result<P::PageItem>> + Send + Unpin {
        use futures::StreamExt;
        let stream = self.into_stream().flat_map(|page| {
            let items: Vec<Result<P::PageItem>> = match page {
                Ok(p) => p.into_items().into_iter().map(Ok).collect(),
                Err(e) => vec![Err(e)],
            };
            futures::stream::iter(items)
        });
        Box::pin(stream)
    }
}

impl<P> std::fmt::Debug for Pager<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pager")
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}
