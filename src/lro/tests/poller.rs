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

//! These tests drive pollers against a local HTTP server, using the same
//! invoker as the resource clients.

#[cfg(test)]
mod tests {
    use gax::exponential_backoff::ExponentialBackoffBuilder;
    use gax::http_client::{Request, ReqwestClient, RequestInvoker};
    use gax::options::{ClientConfig, RequestOptions};
    use http::Method;
    use httptest::{Expectation, Server, matchers::*, responders::*};
    use lro::{NoResult, OperationStatus, PollUntilDoneOptions, PollerBuilder, PollerKind};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    type Result<T> = anyhow::Result<T>;

    fn invoker() -> Arc<dyn RequestInvoker> {
        let backoff = ExponentialBackoffBuilder::new()
            .with_initial_delay(Duration::from_millis(1))
            .with_maximum_delay(Duration::from_millis(1))
            .clamp();
        Arc::new(ReqwestClient::new(
            &ClientConfig::new().set_backoff_policy(backoff),
        ))
    }

    fn json_response(code: u16, body: Value) -> Box<dyn Responder> {
        Box::new(
            status_code(code)
                .insert_header("Content-Type", "application/json")
                .body(body.to_string()),
        )
    }

    fn options() -> PollUntilDoneOptions {
        PollUntilDoneOptions::default().with_frequency(Duration::from_millis(10))
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn location_until_done() -> Result<()> {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", "/vm1/powerOff"))
                .respond_with(status_code(202).insert_header(
                    "Location",
                    format!("http://{}/op1", server.addr()).as_str(),
                )),
        );
        server.expect(
            Expectation::matching(request::method_path("GET", "/op1"))
                .times(2)
                .respond_with(cycle(vec![
                    json_response(202, json!({"status": "InProgress"})),
                    json_response(200, json!({"status": "Succeeded"})),
                ])),
        );

        let invoker = invoker();
        let url = server.url_str("/vm1/powerOff");
        let initial = invoker
            .execute(Request::new(Method::POST, &url), RequestOptions::default())
            .await?;
        let mut poller = PollerBuilder::new(invoker).from_response::<Value>(Method::POST, url, initial)?;
        assert_eq!(poller.kind(), PollerKind::Location);
        let got = poller
            .poll_until_done(&CancellationToken::new(), options())
            .await?;
        assert_eq!(got, json!({"status": "Succeeded"}));
        assert_eq!(poller.status(), OperationStatus::Succeeded);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn resume_from_token() -> Result<()> {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("PUT", "/vm1"))
                .times(1)
                .respond_with(
                    status_code(201)
                        .insert_header(
                            "Azure-AsyncOperation",
                            format!("http://{}/op1", server.addr()).as_str(),
                        )
                        .body(json!({"properties": {"provisioningState": "Creating"}}).to_string()),
                ),
        );
        server.expect(
            Expectation::matching(request::method_path("GET", "/op1"))
                .times(2)
                .respond_with(cycle(vec![
                    json_response(200, json!({"status": "Creating"})),
                    json_response(200, json!({"status": "Succeeded"})),
                ])),
        );
        server.expect(
            Expectation::matching(request::method_path("GET", "/vm1")).respond_with(
                status_code(200).body(
                    json!({"name": "vm1", "properties": {"provisioningState": "Succeeded"}})
                        .to_string(),
                ),
            ),
        );

        let url = server.url_str("/vm1");
        let token = {
            let invoker = invoker();
            let initial = invoker
                .execute(
                    Request::new(Method::PUT, &url).set_json_body(&json!({"location": "eastus"}))?,
                    RequestOptions::default(),
                )
                .await?;
            let poller = PollerBuilder::new(invoker).from_response::<Value>(Method::PUT, &url, initial)?;
            poller.resume_token()?
        };

        // The resumed poller never repeats the initial PUT.
        let mut poller = PollerBuilder::new(invoker()).from_resume_token::<Value>(&token)?;
        assert_eq!(poller.kind(), PollerKind::AzureAsyncOperation);
        assert!(!poller.poll_once(&CancellationToken::new()).await?);
        let got = poller
            .poll_until_done(&CancellationToken::new(), options())
            .await?;
        assert_eq!(got["name"], json!("vm1"));
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn delete_failed() -> Result<()> {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/op1")).respond_with(
                status_code(200).body(
                    json!({"status": "Failed", "error": {"code": "Conflict", "message": "the disk is attached"}})
                        .to_string(),
                ),
            ),
        );
        let initial = gax::response::Response::from_parts(
            gax::response::Parts::new()
                .set_status(http::StatusCode::ACCEPTED)
                .set_headers({
                    let mut h = http::HeaderMap::new();
                    h.insert(
                        "azure-asyncoperation",
                        http::HeaderValue::from_str(&server.url_str("/op1"))?,
                    );
                    h
                }),
            bytes::Bytes::new(),
        );
        let mut poller = PollerBuilder::new(invoker()).from_response::<NoResult>(
            Method::DELETE,
            server.url_str("/disk1"),
            initial,
        )?;
        let err = poller
            .poll_until_done(&CancellationToken::new(), options())
            .await
            .expect_err("the operation failed");
        assert!(err.is_operation_failed(), "{err:?}");
        assert_eq!(err.service_error().map(|e| e.code()), Some("Conflict"));
        assert!(err.to_string().contains("the disk is attached"), "{err}");
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn polling_service_error() -> Result<()> {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/op1")).respond_with(
                status_code(404).body(
                    json!({"error": {"code": "NotFound", "message": "no such operation"}})
                        .to_string(),
                ),
            ),
        );
        let token = {
            use base64::Engine;
            let json = json!({
                "version": 1,
                "kind": "Location",
                "method": "DELETE",
                "originalUrl": server.url_str("/disk1"),
                "pollingUrl": server.url_str("/op1"),
            });
            base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(json.to_string())
        };
        let mut poller = PollerBuilder::new(invoker()).from_resume_token::<NoResult>(&token)?;
        let err = poller
            .poll_once(&CancellationToken::new())
            .await
            .expect_err("404 while polling");
        assert!(err.is_service(), "{err:?}");
        assert_eq!(err.http_status_code(), Some(404));
        assert_eq!(poller.status(), OperationStatus::InProgress);
        Ok(())
    }
}
