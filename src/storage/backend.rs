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
use std::time::Duration;

use async_trait::async_trait;
use http::header::CONTENT_TYPE;
use http::HeaderMap;
use http::StatusCode;
use log::debug;
use reqsign::GoogleCredentialLoader;
use reqsign::GoogleSigner;
use reqsign::GoogleTokenLoader;
use serde::Deserialize;
use serde::Serialize;

use super::core::StorageCore;
use super::ObjectStore;
use super::Storage;
use crate::raw::new_json_deserialize_error;
use crate::raw::parse_error;
use crate::raw::ConfigDeserializer;
use crate::raw::HttpClient;
use crate::AclList;
use crate::Bucket;
use crate::BucketList;
use crate::Error;
use crate::ErrorKind;
use crate::ListObjectsOptions;
use crate::Object;
use crate::ObjectAccessControl;
use crate::ObjectList;
use crate::ObjectMetadata;
use crate::Operation;
use crate::Payload;
use crate::PresignOperation;
use crate::PresignedRequest;
use crate::PutObjectOptions;
use crate::Result;

const DEFAULT_GCS_ENDPOINT: &str = "https://storage.googleapis.com";
const DEFAULT_GCS_SCOPE: &str = "https://www.googleapis.com/auth/devstorage.read_write";

/// Config for the Google Cloud Storage backend.
#[derive(Default, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct GoogleStorageConfig {
    /// Endpoint of the service, `https://storage.googleapis.com` if not set.
    pub endpoint: Option<String>,
    /// Project id, only consulted by bucket level operations.
    pub project: Option<String>,
    /// Scope token requests are made under,
    /// `https://www.googleapis.com/auth/devstorage.read_write` if not set.
    pub scope: Option<String>,
    /// Service account used to fetch tokens from vm metadata, `default` if
    /// not set.
    pub service_account: Option<String>,
    /// Credentials string used for OAuth2 authentication, base64 encoded.
    pub credential: Option<String>,
    /// Local path to a credentials file used for OAuth2 authentication.
    pub credential_path: Option<String>,
    /// A fixed OAuth2 token, skipping the token loader entirely.
    pub token: Option<String>,
    /// Predefined ACL applied to uploads that don't carry one themselves.
    pub predefined_acl: Option<String>,
    /// Storage class applied to uploads that don't carry one themselves.
    pub default_storage_class: Option<String>,
    /// Disable attempting to load credentials from the vm metadata server.
    pub disable_vm_metadata: bool,
    /// Disable loading configuration from the environment.
    pub disable_config_load: bool,
    /// Allow anonymous requests, typically against public buckets or storage
    /// emulators.
    pub allow_anonymous: bool,
}

impl Debug for GoogleStorageConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleStorageConfig")
            .field("endpoint", &self.endpoint)
            .field("project", &self.project)
            .field("scope", &self.scope)
            .field("predefined_acl", &self.predefined_acl)
            .field("default_storage_class", &self.default_storage_class)
            .finish_non_exhaustive()
    }
}

/// Builder for the Google Cloud Storage backend.
#[derive(Default)]
pub struct GoogleStorageBuilder {
    config: GoogleStorageConfig,

    http_client: Option<HttpClient>,
}

impl Debug for GoogleStorageBuilder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut ds = f.debug_struct("GoogleStorageBuilder");

        ds.field("config", &self.config);
        ds.finish_non_exhaustive()
    }
}

impl GoogleStorageBuilder {
    /// Create a builder with everything unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder from a string keyed config map.
    ///
    /// Keys match the [`GoogleStorageConfig`] field names. Boolean fields
    /// accept `true`/`false` and `on`/`off`.
    pub fn from_map(map: HashMap<String, String>) -> Self {
        let config = GoogleStorageConfig::deserialize(ConfigDeserializer::new(map))
            .expect("config deserialize must succeed");

        GoogleStorageBuilder {
            config,
            ..GoogleStorageBuilder::default()
        }
    }

    /// Set the endpoint the service uses, e.g. a local emulator address.
    pub fn endpoint(mut self, endpoint: &str) -> Self {
        if !endpoint.is_empty() {
            self.config.endpoint = Some(endpoint.to_string())
        };
        self
    }

    /// Set the project id.
    ///
    /// Only bucket level operations consult it; object operations carry the
    /// bucket name instead.
    pub fn project(mut self, project: &str) -> Self {
        if !project.is_empty() {
            self.config.project = Some(project.to_string())
        };
        self
    }

    /// Set the service scope.
    ///
    /// If not set, we will use `https://www.googleapis.com/auth/devstorage.read_write`.
    ///
    /// # Valid scope examples
    ///
    /// - read-only: `https://www.googleapis.com/auth/devstorage.read_only`
    /// - read-write: `https://www.googleapis.com/auth/devstorage.read_write`
    /// - full-control: `https://www.googleapis.com/auth/devstorage.full_control`
    pub fn scope(mut self, scope: &str) -> Self {
        if !scope.is_empty() {
            self.config.scope = Some(scope.to_string())
        };
        self
    }

    /// Set the service account.
    ///
    /// The service account will be used to fetch a token from vm metadata.
    /// If not set, we will try to fetch with the `default` account.
    pub fn service_account(mut self, service_account: &str) -> Self {
        if !service_account.is_empty() {
            self.config.service_account = Some(service_account.to_string())
        };
        self
    }

    /// Set the base64 hashed credentials string used for OAuth2
    /// authentication.
    ///
    /// Alternatively use [`credential_path`][Self::credential_path] to point
    /// at a credentials file. One of the two completes the OAuth2 flow.
    pub fn credential(mut self, credential: &str) -> Self {
        if !credential.is_empty() {
            self.config.credential = Some(credential.to_string())
        };
        self
    }

    /// Set the local path to the credentials file used for OAuth2
    /// authentication.
    ///
    /// The file contains the original credentials that have not been base64
    /// hashed.
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

    /// Set the predefined acl applied to uploads that don't carry one.
    ///
    /// Available values are:
    /// - `authenticatedRead`
    /// - `bucketOwnerFullControl`
    /// - `bucketOwnerRead`
    /// - `private`
    /// - `projectPrivate`
    /// - `publicRead`
    pub fn predefined_acl(mut self, acl: &str) -> Self {
        if !acl.is_empty() {
            self.config.predefined_acl = Some(acl.to_string())
        };
        self
    }

    /// Set the storage class applied to uploads that don't carry one.
    ///
    /// Available values are:
    /// - `STANDARD`
    /// - `NEARLINE`
    /// - `COLDLINE`
    /// - `ARCHIVE`
    pub fn default_storage_class(mut self, class: &str) -> Self {
        if !class.is_empty() {
            self.config.default_storage_class = Some(class.to_string())
        };
        self
    }

    /// Disable attempting to load credentials from the vm metadata server.
    pub fn disable_vm_metadata(mut self) -> Self {
        self.config.disable_vm_metadata = true;
        self
    }

    /// Disable loading configuration from the environment.
    pub fn disable_config_load(mut self) -> Self {
        self.config.disable_config_load = true;
        self
    }

    /// Allow anonymous requests.
    ///
    /// This is typically used for buckets which are open to the public or
    /// local storage emulators.
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
    pub fn build(self) -> Result<Storage> {
        debug!("backend build started: {self:?}");

        let endpoint = self
            .config
            .endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_GCS_ENDPOINT.to_string());
        debug!("backend use endpoint: {endpoint}");

        let mut cred_loader = GoogleCredentialLoader::default();
        if let Some(cred) = &self.config.credential {
            cred_loader = cred_loader.with_content(cred);
        }
        if let Some(cred) = &self.config.credential_path {
            cred_loader = cred_loader.with_path(cred);
        }
        if self.config.disable_config_load {
            cred_loader = cred_loader
                .with_disable_env()
                .with_disable_well_known_location();
        }

        let scope = if let Some(scope) = &self.config.scope {
            scope
        } else {
            DEFAULT_GCS_SCOPE
        };

        let client = self.http_client.unwrap_or_default();

        let mut token_loader = GoogleTokenLoader::new(scope, client.client());
        if let Some(account) = &self.config.service_account {
            token_loader = token_loader.with_service_account(account);
        }
        if let Ok(Some(cred)) = cred_loader.load() {
            token_loader = token_loader.with_credentials(cred)
        }
        if self.config.disable_vm_metadata {
            token_loader = token_loader.with_disable_vm_metadata(true);
        }

        let signer = GoogleSigner::new("storage");

        let backend = GoogleStorageBackend {
            core: Arc::new(StorageCore {
                endpoint,
                project: self.config.project.unwrap_or_default(),
                client,
                signer,
                token_loader,
                token: self.config.token,
                credential_loader: cred_loader,
                predefined_acl: self.config.predefined_acl,
                default_storage_class: self.config.default_storage_class,
                allow_anonymous: self.config.allow_anonymous,
            }),
        };

        Ok(Storage::new(backend))
    }
}

/// Backend for the Google Cloud Storage service.
#[derive(Debug, Clone)]
pub(crate) struct GoogleStorageBackend {
    core: Arc<StorageCore>,
}

#[async_trait]
impl ObjectStore for GoogleStorageBackend {
    async fn put_object(
        &self,
        bucket: &str,
        object: &str,
        payload: Payload,
        predefined_acl: Option<&str>,
        options: PutObjectOptions,
    ) -> Result<ObjectMetadata> {
        let (body, implied_type) = payload.resolve().await?;
        // An explicit option always beats whatever the payload shape implies.
        let content_type = options
            .content_type()
            .map(str::to_string)
            .or(implied_type);

        let mut req = self.core.insert_object_request(
            bucket,
            object,
            predefined_acl,
            content_type.as_deref(),
            &options,
            body,
        )?;
        self.core.sign(&mut req).await?;
        let resp = self.core.send(req).await?;

        match resp.status() {
            StatusCode::OK => {
                serde_json::from_slice(resp.body()).map_err(new_json_deserialize_error)
            }
            _ => Err(parse_error(resp)
                .with_operation(Operation::PutObject)
                .with_context("bucket", bucket)
                .with_context("object", object)),
        }
    }

    async fn get_object(&self, bucket: &str, object: &str) -> Result<Object> {
        let mut req = self.core.get_object_request(bucket, object)?;
        self.core.sign(&mut req).await?;
        let resp = self.core.send(req).await?;

        match resp.status() {
            StatusCode::OK => {
                let (parts, body) = resp.into_parts();
                let content_type = parse_content_type(&parts.headers)?
                    .unwrap_or_default()
                    .to_string();

                Ok(Object {
                    name: object.to_string(),
                    content_type,
                    size: body.len() as u64,
                    body,
                })
            }
            _ => Err(parse_error(resp)
                .with_operation(Operation::GetObject)
                .with_context("bucket", bucket)
                .with_context("object", object)),
        }
    }

    async fn get_object_metadata(&self, bucket: &str, object: &str) -> Result<ObjectMetadata> {
        let mut req = self.core.get_object_metadata_request(bucket, object)?;
        self.core.sign(&mut req).await?;
        let resp = self.core.send(req).await?;

        match resp.status() {
            StatusCode::OK => {
                serde_json::from_slice(resp.body()).map_err(new_json_deserialize_error)
            }
            _ => Err(parse_error(resp)
                .with_operation(Operation::GetObjectMetadata)
                .with_context("bucket", bucket)
                .with_context("object", object)),
        }
    }

    async fn delete_object(&self, bucket: &str, object: &str) -> Result<()> {
        let mut req = self.core.delete_object_request(bucket, object)?;
        self.core.sign(&mut req).await?;
        let resp = self.core.send(req).await?;

        match resp.status() {
            StatusCode::NO_CONTENT => Ok(()),
            _ => Err(parse_error(resp)
                .with_operation(Operation::DeleteObject)
                .with_context("bucket", bucket)
                .with_context("object", object)),
        }
    }

    async fn copy_object(
        &self,
        source_bucket: &str,
        source_object: &str,
        destination_bucket: &str,
        destination_object: &str,
    ) -> Result<ObjectMetadata> {
        let mut req = self.core.copy_object_request(
            source_bucket,
            source_object,
            destination_bucket,
            destination_object,
        )?;
        self.core.sign(&mut req).await?;
        let resp = self.core.send(req).await?;

        match resp.status() {
            StatusCode::OK => {
                serde_json::from_slice(resp.body()).map_err(new_json_deserialize_error)
            }
            _ => Err(parse_error(resp)
                .with_operation(Operation::CopyObject)
                .with_context("bucket", source_bucket)
                .with_context("object", source_object)
                .with_context("to_bucket", destination_bucket)
                .with_context("to_object", destination_object)),
        }
    }

    async fn list_objects(
        &self,
        bucket: &str,
        options: ListObjectsOptions,
    ) -> Result<ObjectList> {
        let mut req = self.core.list_objects_request(bucket, &options)?;
        self.core.sign(&mut req).await?;
        let resp = self.core.send(req).await?;

        match resp.status() {
            StatusCode::OK => {
                serde_json::from_slice(resp.body()).map_err(new_json_deserialize_error)
            }
            _ => Err(parse_error(resp)
                .with_operation(Operation::ListObjects)
                .with_context("bucket", bucket)),
        }
    }

    async fn insert_object_acl(
        &self,
        bucket: &str,
        object: &str,
        rule: ObjectAccessControl,
    ) -> Result<ObjectAccessControl> {
        let mut req = self.core.insert_object_acl_request(bucket, object, &rule)?;
        self.core.sign(&mut req).await?;
        let resp = self.core.send(req).await?;

        match resp.status() {
            StatusCode::OK => {
                serde_json::from_slice(resp.body()).map_err(new_json_deserialize_error)
            }
            _ => Err(parse_error(resp)
                .with_operation(Operation::InsertObjectAcl)
                .with_context("bucket", bucket)
                .with_context("object", object)
                .with_context("entity", rule.entity)),
        }
    }

    async fn get_object_acl(
        &self,
        bucket: &str,
        object: &str,
        entity: &str,
    ) -> Result<ObjectAccessControl> {
        let mut req = self.core.get_object_acl_request(bucket, object, entity)?;
        self.core.sign(&mut req).await?;
        let resp = self.core.send(req).await?;

        match resp.status() {
            StatusCode::OK => {
                serde_json::from_slice(resp.body()).map_err(new_json_deserialize_error)
            }
            _ => Err(parse_error(resp)
                .with_operation(Operation::GetObjectAcl)
                .with_context("bucket", bucket)
                .with_context("object", object)
                .with_context("entity", entity)),
        }
    }

    async fn list_object_acls(&self, bucket: &str, object: &str) -> Result<AclList> {
        let mut req = self.core.list_object_acls_request(bucket, object)?;
        self.core.sign(&mut req).await?;
        let resp = self.core.send(req).await?;

        match resp.status() {
            StatusCode::OK => {
                serde_json::from_slice(resp.body()).map_err(new_json_deserialize_error)
            }
            _ => Err(parse_error(resp)
                .with_operation(Operation::ListObjectAcls)
                .with_context("bucket", bucket)
                .with_context("object", object)),
        }
    }

    async fn delete_object_acl(&self, bucket: &str, object: &str, entity: &str) -> Result<()> {
        let mut req = self.core.delete_object_acl_request(bucket, object, entity)?;
        self.core.sign(&mut req).await?;
        let resp = self.core.send(req).await?;

        match resp.status() {
            StatusCode::NO_CONTENT => Ok(()),
            _ => Err(parse_error(resp)
                .with_operation(Operation::DeleteObjectAcl)
                .with_context("bucket", bucket)
                .with_context("object", object)
                .with_context("entity", entity)),
        }
    }

    async fn insert_bucket(&self, bucket: &str) -> Result<Bucket> {
        let mut req = self.core.insert_bucket_request(bucket)?;
        self.core.sign(&mut req).await?;
        let resp = self.core.send(req).await?;

        match resp.status() {
            StatusCode::OK => {
                serde_json::from_slice(resp.body()).map_err(new_json_deserialize_error)
            }
            _ => Err(parse_error(resp)
                .with_operation(Operation::InsertBucket)
                .with_context("bucket", bucket)),
        }
    }

    async fn get_bucket(&self, bucket: &str) -> Result<Bucket> {
        let mut req = self.core.get_bucket_request(bucket)?;
        self.core.sign(&mut req).await?;
        let resp = self.core.send(req).await?;

        match resp.status() {
            StatusCode::OK => {
                serde_json::from_slice(resp.body()).map_err(new_json_deserialize_error)
            }
            _ => Err(parse_error(resp)
                .with_operation(Operation::GetBucket)
                .with_context("bucket", bucket)),
        }
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        let mut req = self.core.delete_bucket_request(bucket)?;
        self.core.sign(&mut req).await?;
        let resp = self.core.send(req).await?;

        match resp.status() {
            StatusCode::NO_CONTENT => Ok(()),
            _ => Err(parse_error(resp)
                .with_operation(Operation::DeleteBucket)
                .with_context("bucket", bucket)),
        }
    }

    async fn list_buckets(&self) -> Result<BucketList> {
        let mut req = self.core.list_buckets_request()?;
        self.core.sign(&mut req).await?;
        let resp = self.core.send(req).await?;

        match resp.status() {
            StatusCode::OK => {
                serde_json::from_slice(resp.body()).map_err(new_json_deserialize_error)
            }
            _ => Err(parse_error(resp).with_operation(Operation::ListBuckets)),
        }
    }

    async fn presign(
        &self,
        bucket: &str,
        object: &str,
        operation: PresignOperation,
        expire: Duration,
    ) -> Result<PresignedRequest> {
        let mut req = self.core.presign_object_request(bucket, object, operation)?;
        self.core.sign_query(&mut req, expire)?;

        // We don't need the request body, the signature is all in the query.
        let (parts, _) = req.into_parts();

        Ok(PresignedRequest::new(parts.method, parts.uri, parts.headers))
    }
}

fn parse_content_type(headers: &HeaderMap) -> Result<Option<&str>> {
    match headers.get(CONTENT_TYPE) {
        None => Ok(None),
        Some(v) => Ok(Some(v.to_str().map_err(|e| {
            Error::new(
                ErrorKind::Unexpected,
                "header value has to be valid utf-8 string",
            )
            .set_source(e)
        })?)),
    }
}
