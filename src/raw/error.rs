// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use bytes::Bytes;
use http::response::Parts;
use http::Response;
use http::StatusCode;
use serde::Deserialize;

use crate::Error;
use crate::ErrorKind;

/// The error envelope answered by Google APIs.
///
/// Both the storage and the compute services wrap failures in the same
/// shape:
///
/// ```json
/// {
///   "error": {
///     "errors": [
///       {
///         "domain": "global",
///         "reason": "required",
///         "message": "Login Required",
///         "locationType": "header",
///         "location": "Authorization"
///       }
///     ],
///     "code": 401,
///     "message": "Login Required"
///   }
/// }
/// ```
#[derive(Default, Debug, Deserialize)]
#[serde(default)]
struct GoogleErrorResponse {
    error: GoogleError,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default)]
struct GoogleError {
    code: usize,
    message: String,
    errors: Vec<GoogleErrorDetail>,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GoogleErrorDetail {
    domain: String,
    location: String,
    location_type: String,
    message: String,
    reason: String,
}

/// Parse a non-2xx vendor response into an [`Error`].
pub fn parse_error(resp: Response<Bytes>) -> Error {
    let (parts, body) = resp.into_parts();

    let (kind, retryable) = match parts.status {
        StatusCode::BAD_REQUEST => (ErrorKind::InvalidInput, false),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => (ErrorKind::PermissionDenied, false),
        StatusCode::NOT_FOUND => (ErrorKind::NotFound, false),
        StatusCode::CONFLICT => (ErrorKind::AlreadyExists, false),
        StatusCode::PRECONDITION_FAILED | StatusCode::NOT_MODIFIED => {
            (ErrorKind::PreconditionFailed, false)
        }
        StatusCode::TOO_MANY_REQUESTS => (ErrorKind::RateLimited, true),
        StatusCode::INTERNAL_SERVER_ERROR
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT => (ErrorKind::Unexpected, true),
        _ => (ErrorKind::Unexpected, false),
    };

    let message = match serde_json::from_slice::<GoogleErrorResponse>(&body) {
        Ok(parsed) => format!("{:?}", parsed.error),
        Err(_) => String::from_utf8_lossy(&body).into_owned(),
    };

    let mut err = Error::new(kind, message);

    err = with_error_response_context(err, parts);

    if retryable {
        err = err.set_temporary();
    }

    err
}

/// Add response context to error.
///
/// This helper function will:
///
/// - remove sensitive or useless headers from parts.
/// - attach the remaining parts as context.
fn with_error_response_context(err: Error, mut parts: Parts) -> Error {
    // The following headers may contain sensitive information.
    parts.headers.remove("Set-Cookie");
    parts.headers.remove("WWW-Authenticate");
    parts.headers.remove("Proxy-Authenticate");

    err.with_context("response", format!("{parts:?}"))
}

/// Create a new error happened during building request.
pub fn new_request_build_error(err: http::Error) -> Error {
    Error::new(ErrorKind::Unexpected, "building http request")
        .with_operation("http::Request::build")
        .set_source(err)
}

/// Create a new error happened during signing request.
pub fn new_request_sign_error(err: anyhow::Error) -> Error {
    Error::new(ErrorKind::Unexpected, "signing http request")
        .with_operation("reqsign::Sign")
        .set_source(err)
}

/// Create a new error happened during loading credential.
pub fn new_request_credential_error(err: anyhow::Error) -> Error {
    Error::new(ErrorKind::ConfigInvalid, "loading credential failed")
        .with_operation("reqsign::LoadCredential")
        .set_source(err)
}
