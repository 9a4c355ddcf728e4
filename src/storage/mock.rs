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

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use bytes::Bytes;
use chrono::SecondsFormat;
use chrono::Utc;
use md5::Digest;
use md5::Md5;

use super::ObjectStore;
use crate::raw::percent_encode_component;
use crate::raw::percent_encode_path;
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

/// The endpoint stamped into record links and presigned URLs.
const MOCK_ENDPOINT: &str = "https://storage.googleapis.com";

/// The access id carried by fake presign signatures.
const MOCK_ACCESS_ID: &str = "mock@stratus.iam.gserviceaccount.com";

/// The closed set the vendor accepts for `predefinedAcl`.
///
/// The live backend passes the value through and lets the vendor answer a
/// 400; here we are the vendor, so unknown names fail the same way.
const VALID_PREDEFINED_ACLS: &[&str] = &[
    "authenticatedRead",
    "bucketOwnerFullControl",
    "bucketOwnerRead",
    "private",
    "projectPrivate",
    "publicRead",
];

/// Value stored per object containing both the record and the content.
#[derive(Clone)]
struct StoredObject {
    record: ObjectMetadata,
    content: Bytes,
}

struct BucketEntry {
    record: Bucket,
    objects: BTreeMap<String, StoredObject>,
}

impl BucketEntry {
    fn new(name: &str) -> Self {
        let now = mock_timestamp();

        Self {
            record: Bucket {
                id: name.to_string(),
                name: name.to_string(),
                location: "US".to_string(),
                storage_class: "STANDARD".to_string(),
                project_number: "0".to_string(),
                metageneration: "1".to_string(),
                etag: BASE64_STANDARD.encode(Md5::digest(name.as_bytes()).as_slice()),
                time_created: now.clone(),
                updated: now,
            },
            objects: BTreeMap::new(),
        }
    }
}

#[derive(Default)]
struct State {
    buckets: BTreeMap<String, BucketEntry>,
    // Fake generation clock, bumped on every object write.
    generation: u64,
}

impl State {
    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }
}

/// In-memory stand-in for the Google Cloud Storage backend.
///
/// Objects round-trip through a map so every storage behavior is checkable
/// offline. Validation the vendor would perform server side, like rejecting
/// an unknown predefined ACL, happens here instead.
#[derive(Default, Clone)]
pub(crate) struct MockStorage {
    state: Arc<Mutex<State>>,
}

impl Debug for MockStorage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockStorage").finish_non_exhaustive()
    }
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ObjectStore for MockStorage {
    async fn put_object(
        &self,
        bucket: &str,
        object: &str,
        payload: Payload,
        predefined_acl: Option<&str>,
        options: PutObjectOptions,
    ) -> Result<ObjectMetadata> {
        if let Some(acl) = predefined_acl {
            if !VALID_PREDEFINED_ACLS.contains(&acl) {
                return Err(Error::new(
                    ErrorKind::InvalidInput,
                    format!("invalid predefined acl: {acl}"),
                )
                .with_operation(Operation::PutObject)
                .with_context("bucket", bucket)
                .with_context("object", object));
            }
        }

        let (content, implied_type) = payload.resolve().await?;
        let content_type = options
            .content_type()
            .map(str::to_string)
            .or(implied_type)
            // With nothing resolved the vendor falls back to its default.
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let md5_hash = BASE64_STANDARD.encode(Md5::digest(&content).as_slice());
        if let Some(declared) = options.md5_hash() {
            if declared != md5_hash {
                return Err(Error::new(
                    ErrorKind::InvalidInput,
                    format!("md5 hash mismatch: declared {declared}, computed {md5_hash}"),
                )
                .with_operation(Operation::PutObject)
                .with_context("bucket", bucket)
                .with_context("object", object));
            }
        }

        let mut state = self.state.lock().unwrap();
        let generation = state.next_generation();
        let entry = state
            .buckets
            .entry(bucket.to_string())
            .or_insert_with(|| BucketEntry::new(bucket));

        let now = mock_timestamp();
        let record = ObjectMetadata {
            id: format!("{bucket}/{object}/{generation}"),
            self_link: object_self_link(bucket, object),
            media_link: object_media_link(bucket, object, generation),
            name: object.to_string(),
            bucket: bucket.to_string(),
            generation: generation.to_string(),
            metageneration: "1".to_string(),
            content_type,
            content_encoding: options.content_encoding().unwrap_or_default().to_string(),
            content_disposition: options
                .content_disposition()
                .unwrap_or_default()
                .to_string(),
            content_language: options.content_language().unwrap_or_default().to_string(),
            cache_control: options.cache_control().unwrap_or_default().to_string(),
            storage_class: options.storage_class().unwrap_or("STANDARD").to_string(),
            size: content.len().to_string(),
            md5_hash,
            crc32c: options.crc32c().unwrap_or_default().to_string(),
            etag: object_etag(bucket, object, generation),
            time_created: now.clone(),
            updated: now,
            metadata: options.metadata().clone(),
            acl: options.acl().to_vec(),
        };

        entry.objects.insert(
            object.to_string(),
            StoredObject {
                record: record.clone(),
                content,
            },
        );

        Ok(record)
    }

    async fn get_object(&self, bucket: &str, object: &str) -> Result<Object> {
        let state = self.state.lock().unwrap();
        let stored = state
            .buckets
            .get(bucket)
            .and_then(|entry| entry.objects.get(object))
            .ok_or_else(|| object_not_found(Operation::GetObject, bucket, object))?;

        Ok(Object {
            name: object.to_string(),
            content_type: stored.record.content_type.clone(),
            size: stored.content.len() as u64,
            body: stored.content.clone(),
        })
    }

    async fn get_object_metadata(&self, bucket: &str, object: &str) -> Result<ObjectMetadata> {
        let state = self.state.lock().unwrap();
        state
            .buckets
            .get(bucket)
            .and_then(|entry| entry.objects.get(object))
            .map(|stored| stored.record.clone())
            .ok_or_else(|| object_not_found(Operation::GetObjectMetadata, bucket, object))
    }

    async fn delete_object(&self, bucket: &str, object: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state
            .buckets
            .get_mut(bucket)
            .and_then(|entry| entry.objects.remove(object))
            .map(|_| ())
            .ok_or_else(|| object_not_found(Operation::DeleteObject, bucket, object))
    }

    async fn copy_object(
        &self,
        source_bucket: &str,
        source_object: &str,
        destination_bucket: &str,
        destination_object: &str,
    ) -> Result<ObjectMetadata> {
        let mut state = self.state.lock().unwrap();
        let stored = state
            .buckets
            .get(source_bucket)
            .and_then(|entry| entry.objects.get(source_object))
            .cloned()
            .ok_or_else(|| {
                object_not_found(Operation::CopyObject, source_bucket, source_object)
            })?;

        let generation = state.next_generation();
        let entry = state
            .buckets
            .entry(destination_bucket.to_string())
            .or_insert_with(|| BucketEntry::new(destination_bucket));

        let now = mock_timestamp();
        let mut record = stored.record;
        record.id = format!("{destination_bucket}/{destination_object}/{generation}");
        record.self_link = object_self_link(destination_bucket, destination_object);
        record.media_link = object_media_link(destination_bucket, destination_object, generation);
        record.name = destination_object.to_string();
        record.bucket = destination_bucket.to_string();
        record.generation = generation.to_string();
        record.etag = object_etag(destination_bucket, destination_object, generation);
        record.time_created = now.clone();
        record.updated = now;

        entry.objects.insert(
            destination_object.to_string(),
            StoredObject {
                record: record.clone(),
                content: stored.content,
            },
        );

        Ok(record)
    }

    async fn list_objects(
        &self,
        bucket: &str,
        options: ListObjectsOptions,
    ) -> Result<ObjectList> {
        let state = self.state.lock().unwrap();
        let entry = state
            .buckets
            .get(bucket)
            .ok_or_else(|| bucket_not_found(Operation::ListObjects, bucket))?;

        let prefix = options.prefix().unwrap_or_default();
        let mut items: Vec<ObjectMetadata> = Vec::new();
        let mut prefixes = BTreeSet::new();
        let mut next_page_token = None;

        for (name, stored) in entry.objects.range(prefix.to_string()..) {
            if !name.starts_with(prefix) {
                break;
            }
            if let Some(token) = options.page_token() {
                if name.as_str() <= token {
                    continue;
                }
            }
            if let Some(delimiter) = options.delimiter() {
                let remainder = &name[prefix.len()..];
                if let Some(idx) = remainder.find(delimiter) {
                    prefixes.insert(format!(
                        "{prefix}{}",
                        &remainder[..idx + delimiter.len()]
                    ));
                    continue;
                }
            }
            if let Some(limit) = options.max_results() {
                if items.len() as u32 >= limit {
                    // The token names the last answered item; the next page
                    // resumes strictly after it.
                    next_page_token = items.last().map(|record| record.name.clone());
                    break;
                }
            }

            items.push(stored.record.clone());
        }

        Ok(ObjectList {
            next_page_token,
            prefixes: prefixes.into_iter().collect(),
            items,
        })
    }

    async fn insert_object_acl(
        &self,
        bucket: &str,
        object: &str,
        rule: ObjectAccessControl,
    ) -> Result<ObjectAccessControl> {
        let mut state = self.state.lock().unwrap();
        let stored = state
            .buckets
            .get_mut(bucket)
            .and_then(|entry| entry.objects.get_mut(object))
            .ok_or_else(|| object_not_found(Operation::InsertObjectAcl, bucket, object))?;

        let mut rule = rule;
        rule.bucket = Some(bucket.to_string());
        rule.object = Some(object.to_string());
        rule.generation = Some(stored.record.generation.clone());
        rule.etag = Some(stored.record.etag.clone());

        // One rule per entity; inserting again overwrites.
        stored.record.acl.retain(|r| r.entity != rule.entity);
        stored.record.acl.push(rule.clone());

        Ok(rule)
    }

    async fn get_object_acl(
        &self,
        bucket: &str,
        object: &str,
        entity: &str,
    ) -> Result<ObjectAccessControl> {
        let state = self.state.lock().unwrap();
        let stored = state
            .buckets
            .get(bucket)
            .and_then(|entry| entry.objects.get(object))
            .ok_or_else(|| object_not_found(Operation::GetObjectAcl, bucket, object))?;

        stored
            .record
            .acl
            .iter()
            .find(|r| r.entity == entity)
            .cloned()
            .ok_or_else(|| entity_not_found(Operation::GetObjectAcl, bucket, object, entity))
    }

    async fn list_object_acls(&self, bucket: &str, object: &str) -> Result<AclList> {
        let state = self.state.lock().unwrap();
        let stored = state
            .buckets
            .get(bucket)
            .and_then(|entry| entry.objects.get(object))
            .ok_or_else(|| object_not_found(Operation::ListObjectAcls, bucket, object))?;

        Ok(AclList {
            items: stored.record.acl.clone(),
        })
    }

    async fn delete_object_acl(&self, bucket: &str, object: &str, entity: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let stored = state
            .buckets
            .get_mut(bucket)
            .and_then(|entry| entry.objects.get_mut(object))
            .ok_or_else(|| object_not_found(Operation::DeleteObjectAcl, bucket, object))?;

        let before = stored.record.acl.len();
        stored.record.acl.retain(|r| r.entity != entity);
        if stored.record.acl.len() == before {
            return Err(entity_not_found(
                Operation::DeleteObjectAcl,
                bucket,
                object,
                entity,
            ));
        }

        Ok(())
    }

    async fn insert_bucket(&self, bucket: &str) -> Result<Bucket> {
        let mut state = self.state.lock().unwrap();
        if state.buckets.contains_key(bucket) {
            return Err(Error::new(
                ErrorKind::AlreadyExists,
                "bucket already exists",
            )
            .with_operation(Operation::InsertBucket)
            .with_context("bucket", bucket));
        }

        let entry = BucketEntry::new(bucket);
        let record = entry.record.clone();
        state.buckets.insert(bucket.to_string(), entry);

        Ok(record)
    }

    async fn get_bucket(&self, bucket: &str) -> Result<Bucket> {
        let state = self.state.lock().unwrap();
        state
            .buckets
            .get(bucket)
            .map(|entry| entry.record.clone())
            .ok_or_else(|| bucket_not_found(Operation::GetBucket, bucket))
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let entry = state
            .buckets
            .get(bucket)
            .ok_or_else(|| bucket_not_found(Operation::DeleteBucket, bucket))?;

        // The vendor answers a 409 conflict on a non-empty bucket.
        if !entry.objects.is_empty() {
            return Err(Error::new(ErrorKind::AlreadyExists, "bucket is not empty")
                .with_operation(Operation::DeleteBucket)
                .with_context("bucket", bucket));
        }

        state.buckets.remove(bucket);
        Ok(())
    }

    async fn list_buckets(&self) -> Result<BucketList> {
        let state = self.state.lock().unwrap();

        Ok(BucketList {
            next_page_token: None,
            items: state
                .buckets
                .values()
                .map(|entry| entry.record.clone())
                .collect(),
        })
    }

    async fn presign(
        &self,
        bucket: &str,
        object: &str,
        operation: PresignOperation,
        expire: Duration,
    ) -> Result<PresignedRequest> {
        let expires = Utc::now().timestamp() + expire.as_secs() as i64;
        let signature = BASE64_STANDARD.encode(
            Md5::digest(
                format!("{}\n/{bucket}/{object}\n{expires}", operation.into_method()).as_bytes(),
            )
            .as_slice(),
        );

        let uri = format!(
            "{MOCK_ENDPOINT}/{bucket}/{}?GoogleAccessId={MOCK_ACCESS_ID}&Expires={expires}&Signature={}",
            percent_encode_path(object),
            percent_encode_component(&signature)
        );
        let uri: http::Uri = uri.parse().map_err(|err| {
            Error::new(ErrorKind::Unexpected, "constructed presign uri is invalid")
                .with_operation(Operation::Presign)
                .with_context("bucket", bucket)
                .with_context("object", object)
                .set_source(err)
        })?;

        Ok(PresignedRequest::new(
            operation.into_method(),
            uri,
            http::HeaderMap::new(),
        ))
    }
}

fn mock_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn object_self_link(bucket: &str, object: &str) -> String {
    format!(
        "{MOCK_ENDPOINT}/storage/v1/b/{bucket}/o/{}",
        percent_encode_component(object)
    )
}

fn object_media_link(bucket: &str, object: &str, generation: u64) -> String {
    format!(
        "{MOCK_ENDPOINT}/download/storage/v1/b/{bucket}/o/{}?generation={generation}&alt=media",
        percent_encode_component(object)
    )
}

fn object_etag(bucket: &str, object: &str, generation: u64) -> String {
    BASE64_STANDARD.encode(
        Md5::digest(format!("{bucket}/{object}/{generation}").as_bytes()).as_slice(),
    )
}

fn object_not_found(op: Operation, bucket: &str, object: &str) -> Error {
    Error::new(ErrorKind::NotFound, "object not found")
        .with_operation(op)
        .with_context("bucket", bucket)
        .with_context("object", object)
}

fn bucket_not_found(op: Operation, bucket: &str) -> Error {
    Error::new(ErrorKind::NotFound, "bucket not found")
        .with_operation(op)
        .with_context("bucket", bucket)
}

fn entity_not_found(op: Operation, bucket: &str, object: &str, entity: &str) -> Error {
    Error::new(ErrorKind::NotFound, "acl entity not found")
        .with_operation(op)
        .with_context("bucket", bucket)
        .with_context("object", object)
        .with_context("entity", entity)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn test_put_validates_predefined_acl() {
        let mock = MockStorage::new();

        let err = mock
            .put_object(
                "fixtures",
                "data.bin",
                Payload::from("content"),
                Some("allTheHumans"),
                PutObjectOptions::default(),
            )
            .await
            .expect_err("unknown predefined acl must be rejected");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        for acl in VALID_PREDEFINED_ACLS {
            mock.put_object(
                "fixtures",
                "data.bin",
                Payload::from("content"),
                Some(acl),
                PutObjectOptions::default(),
            )
            .await
            .expect("valid predefined acl must be accepted");
        }
    }

    #[tokio::test]
    async fn test_put_verifies_declared_md5() {
        let mock = MockStorage::new();

        let err = mock
            .put_object(
                "fixtures",
                "data.bin",
                Payload::from("content"),
                None,
                PutObjectOptions::default().with_md5_hash("bm90IHRoZSBoYXNo"),
            )
            .await
            .expect_err("wrong declared md5 must be rejected");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let expected = BASE64_STANDARD.encode(Md5::digest(b"content").as_slice());
        let meta = mock
            .put_object(
                "fixtures",
                "data.bin",
                Payload::from("content"),
                None,
                PutObjectOptions::default().with_md5_hash(&expected),
            )
            .await
            .expect("matching declared md5 must be accepted");
        assert_eq!(meta.md5_hash, expected);
    }

    #[tokio::test]
    async fn test_list_objects_delimiter_and_pagination() {
        let mock = MockStorage::new();
        for name in ["a.txt", "dir/b.txt", "dir/c.txt", "e.txt", "f.txt"] {
            mock.put_object(
                "fixtures",
                name,
                Payload::from("x"),
                None,
                PutObjectOptions::default(),
            )
            .await
            .expect("put must succeed");
        }

        let page = mock
            .list_objects(
                "fixtures",
                ListObjectsOptions::default().with_delimiter("/"),
            )
            .await
            .expect("list must succeed");
        assert_eq!(page.prefixes, vec!["dir/".to_string()]);
        assert_eq!(
            page.items.iter().map(|v| v.name.as_str()).collect::<Vec<_>>(),
            vec!["a.txt", "e.txt", "f.txt"]
        );

        let page = mock
            .list_objects(
                "fixtures",
                ListObjectsOptions::default().with_max_results(2),
            )
            .await
            .expect("list must succeed");
        assert_eq!(page.items.len(), 2);
        let token = page.next_page_token.expect("token must be present");

        let rest = mock
            .list_objects(
                "fixtures",
                ListObjectsOptions::default().with_page_token(&token),
            )
            .await
            .expect("list must succeed");
        assert_eq!(rest.next_page_token, None);
        assert_eq!(
            rest.items.iter().map(|v| v.name.as_str()).collect::<Vec<_>>(),
            vec!["dir/c.txt", "e.txt", "f.txt"]
        );
    }

    #[tokio::test]
    async fn test_delete_bucket_refuses_non_empty() {
        let mock = MockStorage::new();
        mock.insert_bucket("fixtures").await.expect("insert bucket");
        mock.put_object(
            "fixtures",
            "data.bin",
            Payload::from("x"),
            None,
            PutObjectOptions::default(),
        )
        .await
        .expect("put must succeed");

        let err = mock
            .delete_bucket("fixtures")
            .await
            .expect_err("non-empty bucket must not delete");
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);

        mock.delete_object("fixtures", "data.bin")
            .await
            .expect("delete object");
        mock.delete_bucket("fixtures")
            .await
            .expect("empty bucket must delete");
    }

    #[tokio::test]
    async fn test_presign_answers_signed_url_shape() {
        let mock = MockStorage::new();

        let req = mock
            .presign(
                "fixtures",
                "dir/file.txt",
                PresignOperation::Write,
                Duration::from_secs(3600),
            )
            .await
            .expect("presign must succeed");

        assert_eq!(req.method(), &http::Method::PUT);
        let uri = req.uri().to_string();
        assert!(uri.starts_with("https://storage.googleapis.com/fixtures/dir/file.txt?"));
        assert!(uri.contains("GoogleAccessId="));
        assert!(uri.contains("Expires="));
        assert!(uri.contains("Signature="));
    }
}
