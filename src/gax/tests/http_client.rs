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

//! These tests drive the [ReqwestClient] against a local HTTP server that
//! returns a sequence of responses. The sequence is specific to each test,
//! intended to drive the retry loop as needed for that test.

#[cfg(test)]
mod tests {
    use gax::exponential_backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
    use gax::http_client::{ReqwestClient, Request, RequestInvoker};
    use gax::options::{ClientConfig, RequestOptions};
    use gax::retry_policy::{RetryPolicyExt, TransientErrors};
    use http::{Method, StatusCode};
    use httptest::{Expectation, Server, matchers::*, responders::*};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::time::Duration;

    type Result<T> = anyhow::Result<T>;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn immediate_success() -> Result<()> {
        let server = start("GET", vec![success()]);
        let client = ReqwestClient::new(&test_config());

        let response = client
            .execute(get(&server), RequestOptions::default())
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        let body = serde_json::from_slice::<serde_json::Value>(response.body())?;
        assert_eq!(body, json!({"status": "done"}));
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn retry_then_success() -> Result<()> {
        let server = start("GET", vec![transient(), transient(), success()]);
        let client = ReqwestClient::new(&test_config());

        let response = client
            .execute(get(&server), RequestOptions::default())
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn transient_status_retried_for_post() -> Result<()> {
        let server = start("POST", vec![transient(), success()]);
        let client = ReqwestClient::new(&test_config());

        let request = Request::new(Method::POST, format!("http://{}/retry", server.addr()));
        let response = client.execute(request, RequestOptions::default()).await?;
        assert_eq!(response.status(), StatusCode::OK);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn permanent_error_not_retried() -> Result<()> {
        let server = start("GET", vec![permanent()]);
        let client = ReqwestClient::new(&test_config());

        let err = client
            .execute(get(&server), RequestOptions::default())
            .await
            .expect_err("400 is not retryable");
        assert!(err.is_service(), "{err:?}");
        assert_eq!(err.http_status_code(), Some(400));
        let details = err.service_error().expect("payload has error details");
        assert_eq!(details.code(), "InvalidParameter");
        assert_eq!(details.message(), "uh-oh");
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn too_many_transients() -> Result<()> {
        let server = start("GET", vec![transient(), transient(), transient()]);
        let config = test_config().set_retry_policy(TransientErrors.with_attempt_limit(3));
        let client = ReqwestClient::new(&config);

        let err = client
            .execute(get(&server), RequestOptions::default())
            .await
            .expect_err("all attempts fail");
        assert!(err.is_exhausted(), "{err:?}");
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn retry_after_overrides_backoff() -> Result<()> {
        let throttled: Box<dyn Responder> = Box::new(
            status_code(429)
                .insert_header("Content-Type", "application/json")
                .insert_header("retry-after-ms", "10")
                .body(
                    json!({"error": {"code": "TooManyRequests", "message": "slow down"}})
                        .to_string(),
                ),
        );
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/retry"))
                .times(2)
                .respond_with(cycle(vec![throttled, to_responder(success())])),
        );
        // With this backoff policy the test would time out, unless the
        // client uses the server-provided delay.
        let slow = ExponentialBackoffBuilder::new()
            .with_initial_delay(Duration::from_secs(600))
            .with_maximum_delay(Duration::from_secs(600))
            .clamp();
        let client = ReqwestClient::new(&ClientConfig::new().set_backoff_policy(slow));

        let response = tokio::time::timeout(
            Duration::from_secs(30),
            client.execute(get(&server), RequestOptions::default()),
        )
        .await??;
        assert_eq!(response.status(), StatusCode::OK);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn io_error_retried_only_when_idempotent() -> Result<()> {
        // Nothing listens on this address, all attempts fail to connect.
        let url = unused_endpoint()?;
        let config = test_config().set_retry_policy(TransientErrors.with_attempt_limit(2));
        let client = ReqwestClient::new(&config);

        let err = client
            .execute(Request::new(Method::POST, &url), RequestOptions::default())
            .await
            .expect_err("connection refused");
        assert!(err.is_io(), "{err:?}");

        let err = client
            .execute(Request::get(&url), RequestOptions::default())
            .await
            .expect_err("connection refused");
        assert!(err.is_exhausted(), "{err:?}");

        let mut options = RequestOptions::default();
        options.set_idempotency(true);
        let err = client
            .execute(Request::new(Method::POST, &url), options)
            .await
            .expect_err("connection refused");
        assert!(err.is_exhausted(), "{err:?}");
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn error_code_header() -> Result<()> {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/retry")).respond_with(
                status_code(404)
                    .insert_header("x-ms-error-code", "ResourceNotFound")
                    .body("not found"),
            ),
        );
        let client = ReqwestClient::new(&test_config());

        let err = client
            .execute(get(&server), RequestOptions::default())
            .await
            .expect_err("404 is not retryable");
        assert_eq!(err.http_status_code(), Some(404));
        assert_eq!(
            err.service_error().map(|e| e.code()),
            Some("ResourceNotFound")
        );
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn plain_http_error() -> Result<()> {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/retry"))
                .respond_with(status_code(409).body("conflict")),
        );
        let client = ReqwestClient::new(&test_config());

        let err = client
            .execute(get(&server), RequestOptions::default())
            .await
            .expect_err("409 is not retryable");
        assert!(err.is_transport(), "{err:?}");
        assert_eq!(err.http_status_code(), Some(409));
        assert_eq!(
            err.http_payload().map(|b| b.as_ref()),
            Some(b"conflict".as_slice())
        );
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn user_agent_and_body() -> Result<()> {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("PUT", "/echo"),
                request::headers(contains(("user-agent", matches("^my-app/1.0 arm-sdk-rust/")))),
                request::headers(contains(("x-test", "value"))),
                request::body(json_decoded(eq(json!({"location": "eastus"})))),
            ])
            .respond_with(status_code(201).body("{}")),
        );
        let config = test_config().set_user_agent("my-app/1.0");
        let client = ReqwestClient::new(&config);

        let request = Request::new(Method::PUT, format!("http://{}/echo", server.addr()))
            .set_header(
                http::HeaderName::from_static("x-test"),
                http::HeaderValue::from_static("value"),
            )
            .set_json_body(&json!({"location": "eastus"}))?;
        let response = client.execute(request, RequestOptions::default()).await?;
        assert_eq!(response.status(), StatusCode::CREATED);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn with_tracing() -> Result<()> {
        let _guard = tracing::subscriber::set_default(
            tracing_subscriber::fmt().with_test_writer().finish(),
        );
        let server = start("GET", vec![transient(), success()]);
        let client = ReqwestClient::new(&test_config().enable_tracing());

        let response = client
            .execute(get(&server), RequestOptions::default())
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        Ok(())
    }

    fn get(server: &Server) -> Request {
        Request::get(format!("http://{}/retry", server.addr()))
    }

    fn unused_endpoint() -> Result<String> {
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;
        drop(listener);
        Ok(format!("http://{addr}/retry"))
    }

    fn success() -> (StatusCode, String) {
        let response = json!({
            "status": "done"
        });
        (StatusCode::OK, response.to_string())
    }

    fn transient() -> (StatusCode, String) {
        let status = json!({"error": {
            "code": "ServiceUnavailable",
            "message": "try-again",
        }});
        (StatusCode::SERVICE_UNAVAILABLE, status.to_string())
    }

    fn permanent() -> (StatusCode, String) {
        let status = json!({"error": {
            "code": "InvalidParameter",
            "message": "uh-oh",
        }});
        (StatusCode::BAD_REQUEST, status.to_string())
    }

    fn test_config() -> ClientConfig {
        ClientConfig::new().set_backoff_policy(test_backoff())
    }

    fn test_backoff() -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_delay(Duration::from_millis(1))
            .with_maximum_delay(Duration::from_millis(1))
            .clamp()
    }

    fn start(method: &'static str, responses: Vec<(StatusCode, String)>) -> Server {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path(method, "/retry"))
                .times(responses.len())
                .respond_with(cycle(responses.into_iter().map(to_responder).collect())),
        );
        server
    }

    fn to_responder((status, response): (StatusCode, String)) -> Box<dyn Responder> {
        Box::new(
            status_code(status.as_u16())
                .insert_header("Content-Type", "application/json")
                .body(response),
        )
    }
}
