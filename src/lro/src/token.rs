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

//! Encode and decode resume tokens.
//!
//! A token is the base64url (without padding) encoding of a JSON object:
//!
//! ```json
//! {"version":1,"kind":"Location","method":"PUT",
//!  "originalUrl":"https://...","pollingUrl":"https://...",
//!  "resultUrl":null,"finalStateVia":null}
//! ```

use crate::kind::{FinalStateVia, PollerKind, is_absolute_url};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use gax::Result;
use gax::error::Error;
use http::Method;
use serde::{Deserialize, Serialize};

const VERSION: u32 = 1;

/// The state needed to resume polling an operation.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PollingState {
    pub kind: PollerKind,
    pub method: Method,
    pub original_url: String,
    pub polling_url: String,
    pub result_url: Option<String>,
    pub final_state_via: Option<FinalStateVia>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct Token {
    version: u32,
    kind: PollerKind,
    method: String,
    original_url: String,
    polling_url: String,
    #[serde(default)]
    result_url: Option<String>,
    #[serde(default)]
    final_state_via: Option<FinalStateVia>,
}

#[derive(Deserialize)]
struct Versioned {
    version: u32,
}

impl PollingState {
    pub fn encode(&self) -> Result<String> {
        let token = Token {
            version: VERSION,
            kind: self.kind,
            method: self.method.to_string(),
            original_url: self.original_url.clone(),
            polling_url: self.polling_url.clone(),
            result_url: self.result_url.clone(),
            final_state_via: self.final_state_via,
        };
        let json = serde_json::to_vec(&token).map_err(Error::ser)?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    pub fn decode(token: &str) -> Result<Self> {
        let token = token.trim();
        if token.is_empty() {
            return Err(Error::invalid_resume_token("the resume token is empty"));
        }
        let json = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(Error::invalid_resume_token)?;
        let versioned =
            serde_json::from_slice::<Versioned>(&json).map_err(Error::invalid_resume_token)?;
        if versioned.version != VERSION {
            return Err(Error::invalid_resume_token(format!(
                "unsupported resume token version {}",
                versioned.version
            )));
        }
        let token = serde_json::from_slice::<Token>(&json).map_err(Error::invalid_resume_token)?;
        if token.kind == PollerKind::NoOp {
            return Err(Error::invalid_resume_token(
                "operations that complete immediately cannot be resumed",
            ));
        }
        let method = Method::from_bytes(token.method.as_bytes())
            .map_err(Error::invalid_resume_token)?;
        for url in [Some(&token.original_url), Some(&token.polling_url), token.result_url.as_ref()]
            .into_iter()
            .flatten()
        {
            if !is_absolute_url(url) {
                return Err(Error::invalid_resume_token(format!(
                    "the resume token contains a relative URL {url:?}"
                )));
            }
        }
        Ok(Self {
            kind: token.kind,
            method,
            original_url: token.original_url,
            polling_url: token.polling_url,
            result_url: token.result_url,
            final_state_via: token.final_state_via,
        })
    }
}
