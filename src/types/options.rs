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

use serde_json::json;
use serde_json::Map;
use serde_json::Value;

use crate::ObjectAccessControl;

/// Options carried by [`put_object`][crate::ObjectStore::put_object].
///
/// Every field is optional. Recognized vendor metadata has a named field;
/// anything else goes through [`with_extra`][PutObjectOptions::with_extra]
/// and is handed to the vendor untouched.
///
/// When building the vendor object record, named fields win over `extra`
/// entries with the same wire key, and the object name is always injected by
/// the library, overriding any caller-supplied value.
#[derive(Debug, Default, Clone)]
pub struct PutObjectOptions {
    content_type: Option<String>,
    content_encoding: Option<String>,
    content_disposition: Option<String>,
    content_language: Option<String>,
    cache_control: Option<String>,
    md5_hash: Option<String>,
    crc32c: Option<String>,
    storage_class: Option<String>,
    metadata: HashMap<String, String>,
    acl: Vec<ObjectAccessControl>,
    extra: HashMap<String, Value>,
}

impl PutObjectOptions {
    /// Create a new empty options set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the content type.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Set the content type, overriding whatever the payload shape implies.
    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.content_type = Some(content_type.to_string());
        self
    }

    /// Get the content encoding.
    pub fn content_encoding(&self) -> Option<&str> {
        self.content_encoding.as_deref()
    }

    /// Set the content encoding.
    pub fn with_content_encoding(mut self, content_encoding: &str) -> Self {
        self.content_encoding = Some(content_encoding.to_string());
        self
    }

    /// Get the content disposition.
    pub fn content_disposition(&self) -> Option<&str> {
        self.content_disposition.as_deref()
    }

    /// Set the content disposition.
    pub fn with_content_disposition(mut self, content_disposition: &str) -> Self {
        self.content_disposition = Some(content_disposition.to_string());
        self
    }

    /// Get the content language.
    pub fn content_language(&self) -> Option<&str> {
        self.content_language.as_deref()
    }

    /// Set the content language.
    pub fn with_content_language(mut self, content_language: &str) -> Self {
        self.content_language = Some(content_language.to_string());
        self
    }

    /// Get the cache control.
    pub fn cache_control(&self) -> Option<&str> {
        self.cache_control.as_deref()
    }

    /// Set the cache control.
    pub fn with_cache_control(mut self, cache_control: &str) -> Self {
        self.cache_control = Some(cache_control.to_string());
        self
    }

    /// Get the md5 hash.
    pub fn md5_hash(&self) -> Option<&str> {
        self.md5_hash.as_deref()
    }

    /// Set the base64 encoded md5 hash the vendor should verify against.
    pub fn with_md5_hash(mut self, md5_hash: &str) -> Self {
        self.md5_hash = Some(md5_hash.to_string());
        self
    }

    /// Get the crc32c checksum.
    pub fn crc32c(&self) -> Option<&str> {
        self.crc32c.as_deref()
    }

    /// Set the base64 encoded crc32c checksum the vendor should verify
    /// against.
    pub fn with_crc32c(mut self, crc32c: &str) -> Self {
        self.crc32c = Some(crc32c.to_string());
        self
    }

    /// Get the storage class.
    pub fn storage_class(&self) -> Option<&str> {
        self.storage_class.as_deref()
    }

    /// Set the storage class for this object, e.g. `STANDARD` or `COLDLINE`.
    pub fn with_storage_class(mut self, storage_class: &str) -> Self {
        self.storage_class = Some(storage_class.to_string());
        self
    }

    /// Get the user metadata.
    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }

    /// Set the user metadata attached to this object.
    pub fn with_metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Get the per-object ACL rules.
    pub fn acl(&self) -> &[ObjectAccessControl] {
        &self.acl
    }

    /// Set per-object ACL rules recorded on creation.
    pub fn with_acl(mut self, acl: Vec<ObjectAccessControl>) -> Self {
        self.acl = acl;
        self
    }

    /// Add one unrecognized vendor metadata entry by its wire key.
    ///
    /// The value is serialized into the object record untouched.
    pub fn with_extra(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }

    /// Whether the options carry anything the simple media upload cannot
    /// express. Content type travels as a header there, everything else
    /// needs the multipart object record.
    pub(crate) fn requires_multipart(&self) -> bool {
        self.content_encoding.is_some()
            || self.content_disposition.is_some()
            || self.content_language.is_some()
            || self.cache_control.is_some()
            || self.md5_hash.is_some()
            || self.crc32c.is_some()
            || self.storage_class.is_some()
            || !self.metadata.is_empty()
            || !self.acl.is_empty()
            || !self.extra.is_empty()
    }

    /// Build the vendor object record from these options.
    ///
    /// `content_type` is the effective type after payload resolution. The
    /// object name always comes from the call, overriding any caller value.
    pub(crate) fn object_record(
        &self,
        object: &str,
        content_type: Option<&str>,
    ) -> Map<String, Value> {
        let mut record = Map::new();

        for (k, v) in &self.extra {
            record.insert(k.clone(), v.clone());
        }

        if let Some(v) = content_type {
            record.insert("contentType".to_string(), json!(v));
        }
        if let Some(v) = &self.content_encoding {
            record.insert("contentEncoding".to_string(), json!(v));
        }
        if let Some(v) = &self.content_disposition {
            record.insert("contentDisposition".to_string(), json!(v));
        }
        if let Some(v) = &self.content_language {
            record.insert("contentLanguage".to_string(), json!(v));
        }
        if let Some(v) = &self.cache_control {
            record.insert("cacheControl".to_string(), json!(v));
        }
        if let Some(v) = &self.md5_hash {
            record.insert("md5Hash".to_string(), json!(v));
        }
        if let Some(v) = &self.crc32c {
            record.insert("crc32c".to_string(), json!(v));
        }
        if let Some(v) = &self.storage_class {
            record.insert("storageClass".to_string(), json!(v));
        }
        if !self.metadata.is_empty() {
            record.insert("metadata".to_string(), json!(self.metadata));
        }
        if !self.acl.is_empty() {
            record.insert("acl".to_string(), json!(self.acl));
        }

        record.insert("name".to_string(), json!(object));

        record
    }
}

/// Options carried by [`list_objects`][crate::ObjectStore::list_objects].
///
/// All entries are passed to the vendor unchanged. One call answers one
/// vendor page; follow `next_page_token` yourself if you need more.
#[derive(Debug, Default, Clone)]
pub struct ListObjectsOptions {
    prefix: Option<String>,
    delimiter: Option<String>,
    page_token: Option<String>,
    max_results: Option<u32>,
    versions: bool,
}

impl ListObjectsOptions {
    /// Create a new empty options set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the prefix.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Only list objects whose name starts with this prefix.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }

    /// Get the delimiter.
    pub fn delimiter(&self) -> Option<&str> {
        self.delimiter.as_deref()
    }

    /// Collapse names containing this delimiter past the prefix into
    /// `prefixes` entries, `/` gives directory-like listing.
    pub fn with_delimiter(mut self, delimiter: &str) -> Self {
        self.delimiter = Some(delimiter.to_string());
        self
    }

    /// Get the page token.
    pub fn page_token(&self) -> Option<&str> {
        self.page_token.as_deref()
    }

    /// Continue listing from a `next_page_token` of a previous answer.
    pub fn with_page_token(mut self, page_token: &str) -> Self {
        self.page_token = Some(page_token.to_string());
        self
    }

    /// Get the max results.
    pub fn max_results(&self) -> Option<u32> {
        self.max_results
    }

    /// Cap the number of items in the answered page.
    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = Some(max_results);
        self
    }

    /// Get whether noncurrent object versions are listed.
    pub fn versions(&self) -> bool {
        self.versions
    }

    /// Also list noncurrent object versions.
    pub fn with_versions(mut self, versions: bool) -> Self {
        self.versions = versions;
        self
    }
}
