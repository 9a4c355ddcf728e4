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

use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Write;

use bytes::Bytes;
use http::header;
use http::header::CONTENT_LENGTH;
use http::header::CONTENT_TYPE;
use http::header::HOST;
use http::Request;
use http::Response;
use reqsign::GoogleSigner;
use reqsign::GoogleToken;
use reqsign::GoogleTokenLoader;

use crate::raw::new_json_serialize_error;
use crate::raw::new_request_build_error;
use crate::raw::new_request_credential_error;
use crate::raw::new_request_sign_error;
use crate::raw::percent_encode_component;
use crate::raw::HttpClient;
use crate::Error;
use crate::ErrorKind;
use crate::Result;
use crate::TargetInstance;

/// The pieces every compute request needs: endpoint, project, credentials
/// and the request builders themselves.
pub struct ComputeCore {
    pub endpoint: String,
    pub project: String,

    pub client: HttpClient,
    pub signer: GoogleSigner,
    pub token_loader: GoogleTokenLoader,
    pub token: Option<String>,

    pub allow_anonymous: bool,
}

impl Debug for ComputeCore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComputeCore")
            .field("endpoint", &self.endpoint)
            .field("project", &self.project)
            .finish_non_exhaustive()
    }
}

impl ComputeCore {
    async fn load_token(&self) -> Result<Option<GoogleToken>> {
        let token = self
            .token_loader
            .load()
            .await
            .map_err(new_request_credential_error)?;

        if let Some(token) = token {
            return Ok(Some(token));
        }

        if self.allow_anonymous {
            return Ok(None);
        }

        Err(Error::new(
            ErrorKind::ConfigInvalid,
            "no valid credential found",
        ))
    }

    pub async fn sign<T>(&self, req: &mut Request<T>) -> Result<()> {
        if let Some(token) = &self.token {
            let header_value = format!("Bearer {token}").parse().map_err(|err| {
                Error::new(
                    ErrorKind::ConfigInvalid,
                    "configured token is not a valid header value",
                )
                .with_operation("ComputeCore::sign")
                .set_source(err)
            })?;
            req.headers_mut().insert(header::AUTHORIZATION, header_value);
        } else if let Some(token) = self.load_token().await? {
            self.signer
                .sign(req, &token)
                .map_err(new_request_sign_error)?;
        } else {
            // Anonymous access, the request goes out unsigned.
            return Ok(());
        }

        // Always remove host header, let users' client to set it based on HTTP
        // version.
        //
        // As discussed in <https://github.com/seanmonstar/reqwest/issues/1809>,
        // google server could send RST_STREAM of PROTOCOL_ERROR if our request
        // contains host header.
        req.headers_mut().remove(HOST);

        Ok(())
    }

    #[inline]
    pub async fn send(&self, req: Request<Bytes>) -> Result<Response<Bytes>> {
        self.client.send(req).await
    }
}

impl ComputeCore {
    pub fn delete_target_instance_request(
        &self,
        name: &str,
        zone: &str,
    ) -> Result<Request<Bytes>> {
        let url = format!(
            "{}/compute/v1/projects/{}/zones/{}/targetInstances/{}",
            self.endpoint,
            self.project,
            percent_encode_component(normalize_zone(zone)),
            percent_encode_component(name)
        );

        Request::delete(&url)
            .body(Bytes::new())
            .map_err(new_request_build_error)
    }

    pub fn get_target_instance_request(&self, name: &str, zone: &str) -> Result<Request<Bytes>> {
        let url = format!(
            "{}/compute/v1/projects/{}/zones/{}/targetInstances/{}",
            self.endpoint,
            self.project,
            percent_encode_component(normalize_zone(zone)),
            percent_encode_component(name)
        );

        Request::get(&url)
            .body(Bytes::new())
            .map_err(new_request_build_error)
    }

    pub fn insert_target_instance_request(
        &self,
        target: &TargetInstance,
        zone: &str,
    ) -> Result<Request<Bytes>> {
        let url = format!(
            "{}/compute/v1/projects/{}/zones/{}/targetInstances",
            self.endpoint,
            self.project,
            percent_encode_component(normalize_zone(zone))
        );

        let body = serde_json::to_vec(target).map_err(new_json_serialize_error)?;

        Request::post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(CONTENT_LENGTH, body.len())
            .body(Bytes::from(body))
            .map_err(new_request_build_error)
    }

    pub fn list_target_instances_request(
        &self,
        zone: &str,
        filter: Option<&str>,
    ) -> Result<Request<Bytes>> {
        let mut url = format!(
            "{}/compute/v1/projects/{}/zones/{}/targetInstances",
            self.endpoint,
            self.project,
            percent_encode_component(normalize_zone(zone))
        );

        if let Some(filter) = filter {
            write!(url, "?filter={}", percent_encode_component(filter))
                .expect("write into string must succeed");
        }

        Request::get(&url)
            .body(Bytes::new())
            .map_err(new_request_build_error)
    }
}

/// A zone may arrive as a bare name or as a fully qualified resource URL;
/// the API path wants the bare name, the trailing path segment.
fn normalize_zone(zone: &str) -> &str {
    if zone.starts_with("http") {
        zone.split('/').last().unwrap_or(zone)
    } else {
        zone
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn test_core() -> ComputeCore {
        ComputeCore {
            endpoint: "https://compute.googleapis.com".to_string(),
            project: "example".to_string(),
            client: HttpClient::new(),
            signer: GoogleSigner::new("compute"),
            token_loader: GoogleTokenLoader::new(
                "https://www.googleapis.com/auth/compute",
                reqwest::Client::new(),
            ),
            token: None,
            allow_anonymous: true,
        }
    }

    #[test]
    fn test_normalize_zone() {
        assert_eq!(normalize_zone("us-central1-b"), "us-central1-b");
        assert_eq!(
            normalize_zone(
                "https://www.googleapis.com/compute/v1/projects/example/zones/us-central1-b"
            ),
            "us-central1-b"
        );
        assert_eq!(normalize_zone("http://zones/europe-west1-d"), "europe-west1-d");
    }

    #[test]
    fn test_delete_target_instance_request_normalizes_zone() {
        let core = test_core();

        let bare = core
            .delete_target_instance_request("t1", "us-central1-b")
            .expect("request must build succeed");
        let full = core
            .delete_target_instance_request(
                "t1",
                "https://www.googleapis.com/compute/v1/projects/example/zones/us-central1-b",
            )
            .expect("request must build succeed");

        // The two spellings of the zone must produce the same call.
        assert_eq!(bare.uri(), full.uri());
        assert_eq!(bare.method(), http::Method::DELETE);
        assert_eq!(
            bare.uri().to_string(),
            "https://compute.googleapis.com/compute/v1/projects/example/zones/us-central1-b/targetInstances/t1"
        );
    }

    #[test]
    fn test_insert_target_instance_request() {
        let core = test_core();

        let target = TargetInstance::new(
            "edge-target",
            "https://www.googleapis.com/compute/v1/projects/example/zones/us-central1-b/instances/edge-vm",
        );
        let req = core
            .insert_target_instance_request(&target, "us-central1-b")
            .expect("request must build succeed");

        assert_eq!(req.method(), http::Method::POST);
        assert_eq!(
            req.uri().to_string(),
            "https://compute.googleapis.com/compute/v1/projects/example/zones/us-central1-b/targetInstances"
        );
        assert_eq!(
            req.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let body = String::from_utf8(req.body().to_vec()).unwrap();
        assert!(body.contains(r#""name":"edge-target""#));
        assert!(body.contains(r#""natPolicy":"NO_NAT""#));
        // Vendor owned fields stay out of the insert body.
        assert!(!body.contains("selfLink"));
    }

    #[test]
    fn test_list_target_instances_request_filter() {
        let core = test_core();

        let req = core
            .list_target_instances_request("us-central1-b", None)
            .expect("request must build succeed");
        assert_eq!(
            req.uri().to_string(),
            "https://compute.googleapis.com/compute/v1/projects/example/zones/us-central1-b/targetInstances"
        );

        let req = core
            .list_target_instances_request("us-central1-b", Some("name eq edge-target"))
            .expect("request must build succeed");
        assert_eq!(
            req.uri().to_string(),
            "https://compute.googleapis.com/compute/v1/projects/example/zones/us-central1-b/targetInstances?filter=name%20eq%20edge-target"
        );
    }
}
