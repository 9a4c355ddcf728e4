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

use std::collections::HashMap;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::sync::Arc;

use async_trait::async_trait;
use http::StatusCode;
use log::debug;
use reqsign::GoogleCredentialLoader;
use reqsign::GoogleSigner;
use reqsign::GoogleTokenLoader;
use serde::Deserialize;
use serde::Serialize;

use super::core::ComputeCore;
use super::Compute;
use super::InstanceManager;
use crate::raw::new_json_deserialize_error;
use crate::raw::parse_error;
use crate::raw::ConfigDeserializer;
use crate::raw::HttpClient;
use crate::ComputeOperation;
use crate::Error;
use crate::ErrorKind;
use crate::Operation;
use crate::Result;
use crate::TargetInstance;
use crate::TargetInstanceList;

const DEFAULT_COMPUTE_ENDPOINT: &str = "https://compute.googleapis.com";
const DEFAULT_COMPUTE_SCOPE: &str = "https://www.googleapis.com/auth/compute";

/// Config for the Google Compute Engine backend.
#[derive(Default, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct GoogleComputeConfig {
    /// Endpoint of the service, `https://compute.googleapis.com` if not set.
    pub endpoint: Option<String>,
    /// Project id every compute call is scoped to. Required.
    pub project: Option<String>,
    /// Scope token requests are made under,
    /// `https://www.googleapis.com/auth/compute` if not set.
    pub scope: Option<String>,
    /// Credentials string used for OAuth2 authentication, base64 encoded.
    pub credential: Option<String>,
    /// Local path to a credentials file used for OAuth2 authentication.
    pub credential_path: Option<String>,
    /// A fixed OAuth2 token, skipping the token loader entirely.
    pub token: Option<String>,
    /// Allow anonymous requests, typically against compute emulators.
    pub allow_anonymous: bool,
}

impl Debug for GoogleComputeConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleComputeConfig")
            .field("endpoint", &self.endpoint)
            .field("project", &self.project)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

/// Builder for the Google Compute Engine backend.
#[derive(Default)]
pub struct GoogleComputeBuilder {
    config: GoogleComputeConfig,

    http_client: Option<HttpClient>,
}

impl Debug for GoogleComputeBuilder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut ds = f.debug_struct("GoogleComputeBuilder");

        ds.field("config", &self.config);
        ds.finish_non_exhaustive()
    }
}

impl GoogleComputeBuilder {
    /// Create a builder with everything unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder from a string keyed config map.
    ///
    /// Keys match the [`GoogleComputeConfig`] field names.
    pub fn from_map(map: HashMap<String, String>) -> Self {
        let config = GoogleComputeConfig::deserialize(ConfigDeserializer::new(map))
            .expect("config deserialize must succeed");

        GoogleComputeBuilder {
            config,
            ..GoogleComputeBuilder::default()
        }
    }

    /// Set the endpoint the service uses, e.g. a local emulator address.
    pub fn endpoint(mut self, endpoint: &str) -> Self {
        if !endpoint.is_empty() {
            self.config.endpoint = Some(endpoint.to_string())
        };
        self
    }

    /// Set the project id every call is scoped to. Required.
    pub fn project(mut self, project: &str) -> Self {
        if !project.is_empty() {
            self.config.project = Some(project.to_string())
        };
        self
    }

    /// Set the service scope.
    ///
    /// If not set, we will use `https://www.googleapis.com/auth/compute`.
    pub fn scope(mut self, scope: &str) -> Self {
        if !scope.is_empty() {
            self.config.scope = Some(scope.to_string())
        };
        self
    }

    /// Set the base64 hashed credentials string used for OAuth2
    /// authentication.
    pub fn credential(mut self, credential: &str) -> Self {
        if !credential.is_empty() {
            self.config.credential = Some(credential.to_string())
        };
        self
    }

    /// Set the local path to the credentials file used for OAuth2
    /// authentication.
    pub fn credential_path(mut self, path: &str) -> Self {
        if !path.is_empty() {
            self.config.credential_path = Some(path.to_string())
        };
        self
    }

    /// Provide the OAuth2 token to use directly, skipping the token loader.
    pub fn token(mut self, token: String) -> Self {
        if !token.is_empty() {
            self.config.token = Some(token);
        }
        self
    }

    /// Allow anonymous requests.
    pub fn allow_anonymous(mut self) -> Self {
        self.config.allow_anonymous = true;
        self
    }

    /// Specify the http client used by this backend.
    pub fn http_client(mut self, client: HttpClient) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Consume the builder and wire up the backend.
    pub fn build(self) -> Result<Compute> {
        debug!("backend build started: {self:?}");

        let project = match &self.config.project {
            Some(project) if !project.is_empty() => Ok(project.clone()),
            _ => Err(
                Error::new(ErrorKind::ConfigInvalid, "The project id is misconfigured")
                    .with_operation("Builder::build")
                    .with_context("service", "compute"),
            ),
        }?;

        let endpoint = self
            .config
            .endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_COMPUTE_ENDPOINT.to_string());
        debug!("backend use endpoint: {endpoint}, project: {project}");

        let mut cred_loader = GoogleCredentialLoader::default();
        if let Some(cred) = &self.config.credential {
            cred_loader = cred_loader.with_content(cred);
        }
        if let Some(cred) = &self.config.credential_path {
            cred_loader = cred_loader.with_path(cred);
        }

        let scope = if let Some(scope) = &self.config.scope {
            scope
        } else {
            DEFAULT_COMPUTE_SCOPE
        };

        let client = self.http_client.unwrap_or_default();

        let mut token_loader = GoogleTokenLoader::new(scope, client.client());
        if let Ok(Some(cred)) = cred_loader.load() {
            token_loader = token_loader.with_credentials(cred)
        }

        let signer = GoogleSigner::new("compute");

        let backend = GoogleComputeBackend {
            core: Arc::new(ComputeCore {
                endpoint,
                project,
                client,
                signer,
                token_loader,
                token: self.config.token,
                allow_anonymous: self.config.allow_anonymous,
            }),
        };

        Ok(Compute::new(backend))
    }
}

/// Backend for the Google Compute Engine service.
#[derive(Debug, Clone)]
pub(crate) struct GoogleComputeBackend {
    core: Arc<ComputeCore>,
}

#[async_trait]
impl InstanceManager for GoogleComputeBackend {
    async fn delete_target_instance(&self, name: &str, zone: &str) -> Result<ComputeOperation> {
        let mut req = self.core.delete_target_instance_request(name, zone)?;
        self.core.sign(&mut req).await?;
        let resp = self.core.send(req).await?;

        match resp.status() {
            StatusCode::OK => {
                serde_json::from_slice(resp.body()).map_err(new_json_deserialize_error)
            }
            _ => Err(parse_error(resp)
                .with_operation(Operation::DeleteTargetInstance)
                .with_context("target_instance", name)
                .with_context("zone", zone)),
        }
    }

    async fn get_target_instance(&self, name: &str, zone: &str) -> Result<TargetInstance> {
        let mut req = self.core.get_target_instance_request(name, zone)?;
        self.core.sign(&mut req).await?;
        let resp = self.core.send(req).await?;

        match resp.status() {
            StatusCode::OK => {
                serde_json::from_slice(resp.body()).map_err(new_json_deserialize_error)
            }
            _ => Err(parse_error(resp)
                .with_operation(Operation::GetTargetInstance)
                .with_context("target_instance", name)
                .with_context("zone", zone)),
        }
    }

    async fn insert_target_instance(
        &self,
        target: TargetInstance,
        zone: &str,
    ) -> Result<ComputeOperation> {
        let mut req = self.core.insert_target_instance_request(&target, zone)?;
        self.core.sign(&mut req).await?;
        let resp = self.core.send(req).await?;

        match resp.status() {
            StatusCode::OK => {
                serde_json::from_slice(resp.body()).map_err(new_json_deserialize_error)
            }
            _ => Err(parse_error(resp)
                .with_operation(Operation::InsertTargetInstance)
                .with_context("target_instance", target.name)
                .with_context("zone", zone)),
        }
    }

    async fn list_target_instances(
        &self,
        zone: &str,
        filter: Option<&str>,
    ) -> Result<TargetInstanceList> {
        let mut req = self.core.list_target_instances_request(zone, filter)?;
        self.core.sign(&mut req).await?;
        let resp = self.core.send(req).await?;

        match resp.status() {
            StatusCode::OK => {
                serde_json::from_slice(resp.body()).map_err(new_json_deserialize_error)
            }
            _ => Err(parse_error(resp)
                .with_operation(Operation::ListTargetInstances)
                .with_context("zone", zone)),
        }
    }
}
