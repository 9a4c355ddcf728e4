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
use std::time::Duration;

use bytes::Bytes;
use http::header;
use http::header::CONTENT_LENGTH;
use http::header::CONTENT_TYPE;
use http::header::HOST;
use http::Request;
use http::Response;
use reqsign::GoogleCredential;
use reqsign::GoogleCredentialLoader;
use reqsign::GoogleSigner;
use reqsign::GoogleToken;
use reqsign::GoogleTokenLoader;
use serde_json::json;

use crate::raw::new_json_serialize_error;
use crate::raw::new_request_build_error;
use crate::raw::new_request_credential_error;
use crate::raw::new_request_sign_error;
use crate::raw::percent_encode_component;
use crate::raw::percent_encode_path;
use crate::raw::HttpClient;
use crate::raw::Multipart;
use crate::raw::RelatedPart;
use crate::Error;
use crate::ErrorKind;
use crate::ListObjectsOptions;
use crate::ObjectAccessControl;
use crate::PresignOperation;
use crate::PutObjectOptions;
use crate::Result;

/// The pieces every storage request needs: endpoint, credentials and the
/// request builders themselves.
pub struct StorageCore {
    pub endpoint: String,
    pub project: String,

    pub client: HttpClient,
    pub signer: GoogleSigner,
    pub token_loader: GoogleTokenLoader,
    pub token: Option<String>,
    pub credential_loader: GoogleCredentialLoader,

    pub predefined_acl: Option<String>,
    pub default_storage_class: Option<String>,

    pub allow_anonymous: bool,
}

impl Debug for StorageCore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageCore")
            .field("endpoint", &self.endpoint)
            .field("project", &self.project)
            .finish_non_exhaustive()
    }
}

impl StorageCore {
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

    fn load_credential(&self) -> Result<Option<GoogleCredential>> {
        let cred = self
            .credential_loader
            .load()
            .map_err(new_request_credential_error)?;

        if let Some(cred) = cred {
            return Ok(Some(cred));
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
                .with_operation("StorageCore::sign")
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

    pub fn sign_query<T>(&self, req: &mut Request<T>, duration: Duration) -> Result<()> {
        if let Some(token) = &self.token {
            let header_value = format!("Bearer {token}").parse().map_err(|err| {
                Error::new(
                    ErrorKind::ConfigInvalid,
                    "configured token is not a valid header value",
                )
                .with_operation("StorageCore::sign_query")
                .set_source(err)
            })?;
            req.headers_mut().insert(header::AUTHORIZATION, header_value);
            req.headers_mut().remove(HOST);
            return Ok(());
        }

        let cred = self.load_credential()?.ok_or_else(|| {
            Error::new(
                ErrorKind::ConfigInvalid,
                "presign requires a service account credential",
            )
        })?;

        self.signer
            .sign_query(req, duration, &cred)
            .map_err(new_request_sign_error)?;

        req.headers_mut().remove(HOST);

        Ok(())
    }

    #[inline]
    pub async fn send(&self, req: Request<Bytes>) -> Result<Response<Bytes>> {
        self.client.send(req).await
    }

    fn project(&self) -> Result<&str> {
        if self.project.is_empty() {
            return Err(Error::new(
                ErrorKind::ConfigInvalid,
                "project id is required for bucket operations",
            )
            .with_operation("GoogleStorageBuilder::project"));
        }

        Ok(&self.project)
    }
}

impl StorageCore {
    pub fn insert_object_request(
        &self,
        bucket: &str,
        object: &str,
        predefined_acl: Option<&str>,
        content_type: Option<&str>,
        options: &PutObjectOptions,
        body: Bytes,
    ) -> Result<Request<Bytes>> {
        // Anything beyond a content type can't ride the media upload, it
        // needs the object record of a multipart upload.
        let multipart_upload =
            options.requires_multipart() || self.default_storage_class.is_some();

        let mut url = format!(
            "{}/upload/storage/v1/b/{}/o?uploadType={}&name={}",
            self.endpoint,
            bucket,
            if multipart_upload { "multipart" } else { "media" },
            percent_encode_component(object)
        );

        // The per call value is authoritative, the configured one is only
        // the default.
        if let Some(acl) = predefined_acl.or(self.predefined_acl.as_deref()) {
            write!(&mut url, "&predefinedAcl={}", percent_encode_component(acl))
                .expect("write into string must succeed");
        }

        if !multipart_upload {
            let mut req = Request::post(&url);

            req = req.header(CONTENT_LENGTH, body.len());

            if let Some(content_type) = content_type {
                req = req.header(CONTENT_TYPE, content_type);
            }

            return req.body(body).map_err(new_request_build_error);
        }

        let mut record = options.object_record(object, content_type);
        if let Some(class) = &self.default_storage_class {
            record
                .entry("storageClass")
                .or_insert_with(|| json!(class));
        }

        let mut media_part = RelatedPart::new().content(body);
        if let Some(content_type) = content_type {
            media_part = media_part.header(
                CONTENT_TYPE,
                content_type
                    .parse()
                    .map_err(|_| Error::new(ErrorKind::Unexpected, "invalid header value"))?,
            );
        }

        Multipart::new()
            .part(
                RelatedPart::new()
                    .header(
                        CONTENT_TYPE,
                        "application/json; charset=UTF-8".parse().unwrap(),
                    )
                    .content(serde_json::Value::Object(record).to_string()),
            )
            .part(media_part)
            .apply(Request::post(&url))
    }

    pub fn get_object_request(&self, bucket: &str, object: &str) -> Result<Request<Bytes>> {
        let url = format!(
            "{}/storage/v1/b/{}/o/{}?alt=media",
            self.endpoint,
            bucket,
            percent_encode_component(object)
        );

        Request::get(&url)
            .body(Bytes::new())
            .map_err(new_request_build_error)
    }

    pub fn get_object_metadata_request(
        &self,
        bucket: &str,
        object: &str,
    ) -> Result<Request<Bytes>> {
        let url = format!(
            "{}/storage/v1/b/{}/o/{}",
            self.endpoint,
            bucket,
            percent_encode_component(object)
        );

        Request::get(&url)
            .body(Bytes::new())
            .map_err(new_request_build_error)
    }

    pub fn delete_object_request(&self, bucket: &str, object: &str) -> Result<Request<Bytes>> {
        let url = format!(
            "{}/storage/v1/b/{}/o/{}",
            self.endpoint,
            bucket,
            percent_encode_component(object)
        );

        Request::delete(&url)
            .body(Bytes::new())
            .map_err(new_request_build_error)
    }

    pub fn copy_object_request(
        &self,
        source_bucket: &str,
        source_object: &str,
        destination_bucket: &str,
        destination_object: &str,
    ) -> Result<Request<Bytes>> {
        let url = format!(
            "{}/storage/v1/b/{}/o/{}/copyTo/b/{}/o/{}",
            self.endpoint,
            source_bucket,
            percent_encode_component(source_object),
            destination_bucket,
            percent_encode_component(destination_object)
        );

        Request::post(&url)
            .header(CONTENT_LENGTH, 0)
            .body(Bytes::new())
            .map_err(new_request_build_error)
    }

    pub fn list_objects_request(
        &self,
        bucket: &str,
        options: &ListObjectsOptions,
    ) -> Result<Request<Bytes>> {
        let mut url = format!(
            "{}/storage/v1/b/{}/o?prefix={}",
            self.endpoint,
            bucket,
            percent_encode_component(options.prefix().unwrap_or_default())
        );

        if let Some(delimiter) = options.delimiter() {
            write!(url, "&delimiter={}", percent_encode_component(delimiter))
                .expect("write into string must succeed");
        }
        if let Some(limit) = options.max_results() {
            write!(url, "&maxResults={limit}").expect("write into string must succeed");
        }
        if let Some(page_token) = options.page_token() {
            write!(url, "&pageToken={}", percent_encode_component(page_token))
                .expect("write into string must succeed");
        }
        if options.versions() {
            write!(url, "&versions=true").expect("write into string must succeed");
        }

        Request::get(&url)
            .body(Bytes::new())
            .map_err(new_request_build_error)
    }

    pub fn insert_object_acl_request(
        &self,
        bucket: &str,
        object: &str,
        rule: &ObjectAccessControl,
    ) -> Result<Request<Bytes>> {
        let url = format!(
            "{}/storage/v1/b/{}/o/{}/acl",
            self.endpoint,
            bucket,
            percent_encode_component(object)
        );

        let body = serde_json::to_vec(rule).map_err(new_json_serialize_error)?;

        Request::post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(CONTENT_LENGTH, body.len())
            .body(Bytes::from(body))
            .map_err(new_request_build_error)
    }

    pub fn get_object_acl_request(
        &self,
        bucket: &str,
        object: &str,
        entity: &str,
    ) -> Result<Request<Bytes>> {
        let url = format!(
            "{}/storage/v1/b/{}/o/{}/acl/{}",
            self.endpoint,
            bucket,
            percent_encode_component(object),
            percent_encode_component(entity)
        );

        Request::get(&url)
            .body(Bytes::new())
            .map_err(new_request_build_error)
    }

    pub fn list_object_acls_request(&self, bucket: &str, object: &str) -> Result<Request<Bytes>> {
        let url = format!(
            "{}/storage/v1/b/{}/o/{}/acl",
            self.endpoint,
            bucket,
            percent_encode_component(object)
        );

        Request::get(&url)
            .body(Bytes::new())
            .map_err(new_request_build_error)
    }

    pub fn delete_object_acl_request(
        &self,
        bucket: &str,
        object: &str,
        entity: &str,
    ) -> Result<Request<Bytes>> {
        let url = format!(
            "{}/storage/v1/b/{}/o/{}/acl/{}",
            self.endpoint,
            bucket,
            percent_encode_component(object),
            percent_encode_component(entity)
        );

        Request::delete(&url)
            .body(Bytes::new())
            .map_err(new_request_build_error)
    }

    pub fn insert_bucket_request(&self, bucket: &str) -> Result<Request<Bytes>> {
        let url = format!(
            "{}/storage/v1/b?project={}",
            self.endpoint,
            percent_encode_component(self.project()?)
        );

        let body = json!({ "name": bucket }).to_string();

        Request::post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(CONTENT_LENGTH, body.len())
            .body(Bytes::from(body))
            .map_err(new_request_build_error)
    }

    pub fn get_bucket_request(&self, bucket: &str) -> Result<Request<Bytes>> {
        let url = format!("{}/storage/v1/b/{}", self.endpoint, bucket);

        Request::get(&url)
            .body(Bytes::new())
            .map_err(new_request_build_error)
    }

    pub fn delete_bucket_request(&self, bucket: &str) -> Result<Request<Bytes>> {
        let url = format!("{}/storage/v1/b/{}", self.endpoint, bucket);

        Request::delete(&url)
            .body(Bytes::new())
            .map_err(new_request_build_error)
    }

    pub fn list_buckets_request(&self) -> Result<Request<Bytes>> {
        let url = format!(
            "{}/storage/v1/b?project={}",
            self.endpoint,
            percent_encode_component(self.project()?)
        );

        Request::get(&url)
            .body(Bytes::new())
            .map_err(new_request_build_error)
    }

    // Query signing only covers the XML style url, so presigned requests
    // address the object by plain path instead of the JSON API.
    pub fn presign_object_request(
        &self,
        bucket: &str,
        object: &str,
        operation: PresignOperation,
    ) -> Result<Request<Bytes>> {
        let url = format!(
            "{}/{}/{}",
            self.endpoint,
            bucket,
            percent_encode_path(object)
        );

        Request::builder()
            .method(operation.into_method())
            .uri(&url)
            .body(Bytes::new())
            .map_err(new_request_build_error)
    }
}
