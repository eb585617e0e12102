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

use super::ServiceError;
use http::HeaderMap;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The error type for every operation in the management clients.
///
/// An `Error` is one of a closed set of kinds, each with an `is_*()`
/// predicate. Errors that carry an HTTP response also expose its status code,
/// headers, and body. Errors caused by a lower layer keep that cause as their
/// [source][std::error::Error::source].
///
/// # Example
/// ```
/// use gax::error::Error;
/// fn report(result: Result<String, Error>) {
///     match result {
///         Ok(name) => println!("created {name}"),
///         Err(e) if e.is_operation_failed() => {
///             println!("the operation ended as {:?}: {e}", e.operation_status());
///         }
///         Err(e) if e.http_status_code() == Some(409) => println!("conflict: {e}"),
///         Err(e) => println!("other error: {e}"),
///     }
/// }
/// # report(Err(Error::http(409, http::HeaderMap::new(), bytes::Bytes::new())));
/// ```
#[derive(Debug)]
pub struct Error(Kind);

#[derive(Debug, thiserror::Error)]
enum Kind {
    #[error("cannot build the request: {0}")]
    Binding(#[source] BoxError),
    #[error("cannot serialize the request: {0}")]
    Serialization(#[source] BoxError),
    #[error("cannot deserialize the response: {0}")]
    Deserialization(#[source] BoxError),
    #[error("the request did not complete in time: {0}")]
    Timeout(#[source] BoxError),
    #[error("the retry policy gave up, last error: {0}")]
    Exhausted(#[source] BoxError),
    #[error("the transport reports an error: {0}")]
    Io(#[source] BoxError),
    #[error("the service responded with HTTP status {status}: {}", display_payload(.payload))]
    Http {
        status: u16,
        headers: HeaderMap,
        payload: bytes::Bytes,
    },
    #[error("the service responded with HTTP status {status}: {details}")]
    Service {
        status: u16,
        headers: HeaderMap,
        details: ServiceError,
    },
    #[error("the response breaks the service protocol: {0}")]
    Protocol(#[source] BoxError),
    #[error("{}", display_operation(.status, .details.as_ref()))]
    OperationFailed {
        status: String,
        payload: bytes::Bytes,
        details: Option<ServiceError>,
    },
    #[error("invalid resume token: {0}")]
    InvalidResumeToken(#[source] BoxError),
    #[error("invalid use of the API: {0}")]
    Misuse(#[source] BoxError),
    #[error("cancelled by the application: {0}")]
    Cancelled(#[source] BoxError),
}

fn display_payload(payload: &bytes::Bytes) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) => text.to_string(),
        Err(_) => format!("{payload:?}"),
    }
}

fn display_operation(status: &str, details: Option<&ServiceError>) -> String {
    match details {
        Some(d) => format!("the operation completed with status {status}: {d}"),
        None => format!("the operation completed with status {status}"),
    }
}

impl Error {
    /// A path parameter or the endpoint could not be turned into a URL.
    pub fn binding<T: Into<BoxError>>(source: T) -> Self {
        Self(Kind::Binding(source.into()))
    }

    /// The request body could not be encoded.
    pub fn ser<T: Into<BoxError>>(source: T) -> Self {
        Self(Kind::Serialization(source.into()))
    }

    /// The response body could not be decoded.
    pub fn deser<T: Into<BoxError>>(source: T) -> Self {
        Self(Kind::Deserialization(source.into()))
    }

    /// An attempt, or the whole operation, ran out of time.
    ///
    /// ```
    /// # use gax::error::Error;
    /// let error = Error::timeout("attempt took longer than 5s");
    /// assert!(error.is_timeout());
    /// ```
    pub fn timeout<T: Into<BoxError>>(source: T) -> Self {
        Self(Kind::Timeout(source.into()))
    }

    /// The retry policy stopped the loop. `source` is the last attempt's error.
    pub fn exhausted<T: Into<BoxError>>(source: T) -> Self {
        Self(Kind::Exhausted(source.into()))
    }

    /// The request failed without a response, e.g. the connection was reset.
    pub fn io<T: Into<BoxError>>(source: T) -> Self {
        Self(Kind::Io(source.into()))
    }

    /// The service returned an unexpected status and no recognizable error
    /// details.
    ///
    /// ```
    /// # use gax::error::Error;
    /// let error = Error::http(503, http::HeaderMap::new(), bytes::Bytes::from_static(b"busy"));
    /// assert!(error.is_transport());
    /// assert_eq!(error.http_status_code(), Some(503));
    /// ```
    pub fn http(status_code: u16, headers: HeaderMap, payload: bytes::Bytes) -> Self {
        Self(Kind::Http {
            status: status_code,
            headers,
            payload,
        })
    }

    /// The service returned an error envelope.
    ///
    /// ```
    /// # use gax::error::{Error, ServiceError};
    /// let details = ServiceError::default().set_code("ResourceNotFound");
    /// let error = Error::service(details.clone(), 404, http::HeaderMap::new());
    /// assert!(error.is_service());
    /// assert_eq!(error.service_error(), Some(&details));
    /// ```
    pub fn service(details: ServiceError, status_code: u16, headers: HeaderMap) -> Self {
        Self(Kind::Service {
            status: status_code,
            headers,
            details,
        })
    }

    /// A response that does not follow the long-running operation or paging
    /// conventions, e.g. a status monitor without a `status` field.
    pub fn protocol<T: Into<BoxError>>(source: T) -> Self {
        Self(Kind::Protocol(source.into()))
    }

    /// A long-running operation reached `Failed` or `Canceled`.
    ///
    /// `payload` is the last polling response body. Its error details, if
    /// any, are available via [service_error][Self::service_error].
    ///
    /// ```
    /// # use gax::error::Error;
    /// let payload = bytes::Bytes::from_static(br#"{"status":"Failed","error":{"code":"Boom"}}"#);
    /// let error = Error::operation_failed("Failed", payload);
    /// assert_eq!(error.operation_status(), Some("Failed"));
    /// assert_eq!(error.service_error().map(|e| e.code()), Some("Boom"));
    /// ```
    pub fn operation_failed<S: Into<String>>(status: S, payload: bytes::Bytes) -> Self {
        let details = ServiceError::from_payload(&payload);
        Self(Kind::OperationFailed {
            status: status.into(),
            payload,
            details,
        })
    }

    /// A resume token that is malformed or from an incompatible version.
    pub fn invalid_resume_token<T: Into<BoxError>>(source: T) -> Self {
        Self(Kind::InvalidResumeToken(source.into()))
    }

    /// An operation called in the wrong state, e.g. fetching a page after the
    /// last one.
    pub fn misuse<T: Into<BoxError>>(source: T) -> Self {
        Self(Kind::Misuse(source.into()))
    }

    /// The application cancelled a wait.
    pub fn cancelled<T: Into<BoxError>>(source: T) -> Self {
        Self(Kind::Cancelled(source.into()))
    }

    pub fn is_binding(&self) -> bool {
        matches!(self.0, Kind::Binding(_))
    }

    pub fn is_serialization(&self) -> bool {
        matches!(self.0, Kind::Serialization(_))
    }

    pub fn is_deserialization(&self) -> bool {
        matches!(self.0, Kind::Deserialization(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.0, Kind::Timeout(_))
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self.0, Kind::Exhausted(_))
    }

    /// No response was received.
    pub fn is_io(&self) -> bool {
        matches!(self.0, Kind::Io(_))
    }

    /// Either an I/O error or an HTTP error without error details.
    pub fn is_transport(&self) -> bool {
        matches!(self.0, Kind::Io(_) | Kind::Http { .. })
    }

    pub fn is_service(&self) -> bool {
        matches!(self.0, Kind::Service { .. })
    }

    pub fn is_protocol(&self) -> bool {
        matches!(self.0, Kind::Protocol(_))
    }

    pub fn is_operation_failed(&self) -> bool {
        matches!(self.0, Kind::OperationFailed { .. })
    }

    pub fn is_invalid_resume_token(&self) -> bool {
        matches!(self.0, Kind::InvalidResumeToken(_))
    }

    pub fn is_misuse(&self) -> bool {
        matches!(self.0, Kind::Misuse(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.0, Kind::Cancelled(_))
    }

    /// The terminal status of a failed long-running operation.
    pub fn operation_status(&self) -> Option<&str> {
        match &self.0 {
            Kind::OperationFailed { status, .. } => Some(status),
            _ => None,
        }
    }

    /// The HTTP status code of the response that caused this error.
    pub fn http_status_code(&self) -> Option<u16> {
        match &self.0 {
            Kind::Http { status, .. } | Kind::Service { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The headers of the response that caused this error.
    ///
    /// The retry loop reads `Retry-After` from here.
    pub fn http_headers(&self) -> Option<&HeaderMap> {
        match &self.0 {
            Kind::Http { headers, .. } | Kind::Service { headers, .. } => Some(headers),
            _ => None,
        }
    }

    /// The undecoded body of the response that caused this error.
    pub fn http_payload(&self) -> Option<&bytes::Bytes> {
        match &self.0 {
            Kind::Http { payload, .. } | Kind::OperationFailed { payload, .. } => Some(payload),
            _ => None,
        }
    }

    pub fn service_error(&self) -> Option<&ServiceError> {
        match &self.0 {
            Kind::Service { details, .. } => Some(details),
            Kind::OperationFailed { details, .. } => details.as_ref(),
            _ => None,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}
