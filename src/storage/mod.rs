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

//! Object storage support: the [`ObjectStore`] capability trait, the live
//! Google Cloud Storage backend, the in-memory mock, and the [`Storage`]
//! facade callers hold.

mod backend;
mod core;
mod mock;

pub use backend::GoogleStorageBuilder;
pub use backend::GoogleStorageConfig;

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::AclList;
use crate::Bucket;
use crate::BucketList;
use crate::ListObjectsOptions;
use crate::Object;
use crate::ObjectAccessControl;
use crate::ObjectList;
use crate::ObjectMetadata;
use crate::Payload;
use crate::PresignOperation;
use crate::PresignedRequest;
use crate::PutObjectOptions;
use crate::Result;

/// The object storage capability.
///
/// One implementor talks to the live vendor API, another simulates it in
/// memory. Which one a [`Storage`] holds is decided at construction time;
/// call sites are identical across the two.
///
/// Every operation is one request, one response. Vendor pagination is
/// answered one page at a time, vendor errors map onto
/// [`Error`][crate::Error] kinds and are otherwise passed through.
#[async_trait]
pub trait ObjectStore: Send + Sync + Debug {
    /// Upload a payload as a named object in a bucket.
    ///
    /// `predefined_acl` is handed to the vendor untouched; when `None`, a
    /// backend-configured default applies if one was set. `options` carries
    /// the object metadata record, see [`PutObjectOptions`].
    async fn put_object(
        &self,
        bucket: &str,
        object: &str,
        payload: Payload,
        predefined_acl: Option<&str>,
        options: PutObjectOptions,
    ) -> Result<ObjectMetadata>;

    /// Download an object's content.
    async fn get_object(&self, bucket: &str, object: &str) -> Result<Object>;

    /// Read an object's resource record without its content.
    async fn get_object_metadata(&self, bucket: &str, object: &str) -> Result<ObjectMetadata>;

    /// Delete an object. Deleting an absent object answers `NotFound`.
    async fn delete_object(&self, bucket: &str, object: &str) -> Result<()>;

    /// Copy an object to another (bucket, name) pair, preserving content.
    async fn copy_object(
        &self,
        source_bucket: &str,
        source_object: &str,
        destination_bucket: &str,
        destination_object: &str,
    ) -> Result<ObjectMetadata>;

    /// List one page of objects in a bucket.
    async fn list_objects(&self, bucket: &str, options: ListObjectsOptions)
        -> Result<ObjectList>;

    /// Grant an entity a role on an object.
    async fn insert_object_acl(
        &self,
        bucket: &str,
        object: &str,
        rule: ObjectAccessControl,
    ) -> Result<ObjectAccessControl>;

    /// Read one entity's access rule on an object.
    async fn get_object_acl(
        &self,
        bucket: &str,
        object: &str,
        entity: &str,
    ) -> Result<ObjectAccessControl>;

    /// List every access rule on an object.
    async fn list_object_acls(&self, bucket: &str, object: &str) -> Result<AclList>;

    /// Revoke an entity's access rule on an object.
    async fn delete_object_acl(&self, bucket: &str, object: &str, entity: &str) -> Result<()>;

    /// Create a bucket under the configured project.
    async fn insert_bucket(&self, bucket: &str) -> Result<Bucket>;

    /// Read a bucket's resource record.
    async fn get_bucket(&self, bucket: &str) -> Result<Bucket>;

    /// Delete a bucket. A non-empty bucket answers `AlreadyExists`, the
    /// vendor's 409 conflict.
    async fn delete_bucket(&self, bucket: &str) -> Result<()>;

    /// List the configured project's buckets.
    async fn list_buckets(&self) -> Result<BucketList>;

    /// Produce a presigned request authorizing `operation` on an object for
    /// `expire`, without sending anything.
    async fn presign(
        &self,
        bucket: &str,
        object: &str,
        operation: PresignOperation,
        expire: Duration,
    ) -> Result<PresignedRequest>;
}

/// The user-facing entry for object storage.
///
/// `Storage` is cheap to clone and safe to share across tasks. It forwards
/// every call to the [`ObjectStore`] backend it was constructed over, so the
/// same code runs against the live service or the in-memory mock.
///
/// # Examples
///
/// Offline, against the mock:
///
/// ```
/// # use anyhow::Result;
/// use stratus::Storage;
///
/// # async fn test() -> Result<()> {
/// let storage = Storage::mock();
///
/// storage.put_object("fixtures", "hello.txt", "Hello, World!").await?;
/// let object = storage.get_object("fixtures", "hello.txt").await?;
/// assert_eq!(object.body, "Hello, World!");
/// # Ok(())
/// # }
/// ```
///
/// Against the live service:
///
/// ```no_run
/// # use anyhow::Result;
/// use stratus::Storage;
///
/// # fn test() -> Result<()> {
/// let storage = Storage::google()
///     .project("example")
///     .credential_path("/path/to/credentials.json")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Storage {
    inner: Arc<dyn ObjectStore>,
}

impl Storage {
    /// Create a `Storage` over a backend.
    pub fn new(backend: impl ObjectStore + 'static) -> Self {
        Self {
            inner: Arc::new(backend),
        }
    }

    /// Create a `Storage` over a fresh in-memory mock backend.
    ///
    /// The mock round-trips objects, ACL rules and buckets through a map and
    /// performs the validations the vendor would, so behavior tests run
    /// without credentials or network.
    pub fn mock() -> Self {
        Self::new(mock::MockStorage::new())
    }

    /// Start building a live Google Cloud Storage backend.
    ///
    /// Shorthand for [`GoogleStorageBuilder::new`]; finish with
    /// [`build`][GoogleStorageBuilder::build].
    pub fn google() -> GoogleStorageBuilder {
        GoogleStorageBuilder::new()
    }

    /// Upload a payload as a named object in a bucket.
    ///
    /// Shorthand for [`put_object_with`][Self::put_object_with] without a
    /// predefined ACL or options. Anything convertible into a
    /// [`Payload`] is accepted: a string uploads as `text/plain`, an open
    /// [`tokio::fs::File`] uploads with its content type sniffed from the
    /// header bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// # use anyhow::Result;
    /// # use stratus::Storage;
    /// # async fn test(storage: Storage) -> Result<()> {
    /// let meta = storage.put_object("fixtures", "o1", "A file body").await?;
    /// assert_eq!(meta.name, "o1");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn put_object(
        &self,
        bucket: &str,
        object: &str,
        payload: impl Into<Payload>,
    ) -> Result<ObjectMetadata> {
        self.inner
            .put_object(bucket, object, payload.into(), None, PutObjectOptions::default())
            .await
    }

    /// Upload a payload with a predefined ACL and full options.
    ///
    /// The per-call `predefined_acl` overrides any backend-configured
    /// default. See [`PutObjectOptions`] for the metadata fields and the
    /// escape hatch for unrecognized vendor keys.
    ///
    /// # Examples
    ///
    /// ```
    /// # use anyhow::Result;
    /// # use stratus::Storage;
    /// use stratus::Payload;
    /// use stratus::PutObjectOptions;
    ///
    /// # async fn test(storage: Storage) -> Result<()> {
    /// let options = PutObjectOptions::new().with_cache_control("public, max-age=3600");
    /// let meta = storage
    ///     .put_object_with(
    ///         "fixtures",
    ///         "logo.png",
    ///         Payload::DescribedSource {
    ///             path: "assets/logo.png".into(),
    ///             content_type: "image/png".to_string(),
    ///         },
    ///         Some("publicRead"),
    ///         options,
    ///     )
    ///     .await?;
    /// assert_eq!(meta.content_type, "image/png");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn put_object_with(
        &self,
        bucket: &str,
        object: &str,
        payload: impl Into<Payload>,
        predefined_acl: Option<&str>,
        options: PutObjectOptions,
    ) -> Result<ObjectMetadata> {
        self.inner
            .put_object(bucket, object, payload.into(), predefined_acl, options)
            .await
    }

    /// Download an object's content.
    ///
    /// # Examples
    ///
    /// ```
    /// # use anyhow::Result;
    /// # use stratus::Storage;
    /// # async fn test(storage: Storage) -> Result<()> {
    /// let object = storage.get_object("fixtures", "o1").await?;
    /// println!("{} is {} bytes", object.name, object.size);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_object(&self, bucket: &str, object: &str) -> Result<Object> {
        self.inner.get_object(bucket, object).await
    }

    /// Read an object's resource record without downloading its content.
    pub async fn get_object_metadata(&self, bucket: &str, object: &str) -> Result<ObjectMetadata> {
        self.inner.get_object_metadata(bucket, object).await
    }

    /// Delete an object.
    ///
    /// There is no idempotency check: deleting an absent object answers the
    /// vendor's `NotFound`.
    pub async fn delete_object(&self, bucket: &str, object: &str) -> Result<()> {
        self.inner.delete_object(bucket, object).await
    }

    /// Copy an object to another (bucket, name) pair.
    pub async fn copy_object(
        &self,
        source_bucket: &str,
        source_object: &str,
        destination_bucket: &str,
        destination_object: &str,
    ) -> Result<ObjectMetadata> {
        self.inner
            .copy_object(
                source_bucket,
                source_object,
                destination_bucket,
                destination_object,
            )
            .await
    }

    /// List one page of objects in a bucket.
    ///
    /// Answers at most one vendor page; follow
    /// [`ObjectList::next_page_token`] with
    /// [`ListObjectsOptions::with_page_token`] for the next one.
    ///
    /// # Examples
    ///
    /// ```
    /// # use anyhow::Result;
    /// # use stratus::Storage;
    /// use stratus::ListObjectsOptions;
    ///
    /// # async fn test(storage: Storage) -> Result<()> {
    /// let options = ListObjectsOptions::new().with_prefix("photos/").with_delimiter("/");
    /// let page = storage.list_objects("fixtures", options).await?;
    /// for object in &page.items {
    ///     println!("{}", object.name);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn list_objects(
        &self,
        bucket: &str,
        options: ListObjectsOptions,
    ) -> Result<ObjectList> {
        self.inner.list_objects(bucket, options).await
    }

    /// Grant an entity a role on an object.
    ///
    /// # Examples
    ///
    /// ```
    /// # use anyhow::Result;
    /// # use stratus::Storage;
    /// use stratus::ObjectAccessControl;
    ///
    /// # async fn test(storage: Storage) -> Result<()> {
    /// storage
    ///     .insert_object_acl("fixtures", "o1", ObjectAccessControl::new("allUsers", "READER"))
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn insert_object_acl(
        &self,
        bucket: &str,
        object: &str,
        rule: ObjectAccessControl,
    ) -> Result<ObjectAccessControl> {
        self.inner.insert_object_acl(bucket, object, rule).await
    }

    /// Read one entity's access rule on an object.
    pub async fn get_object_acl(
        &self,
        bucket: &str,
        object: &str,
        entity: &str,
    ) -> Result<ObjectAccessControl> {
        self.inner.get_object_acl(bucket, object, entity).await
    }

    /// List every access rule on an object.
    pub async fn list_object_acls(&self, bucket: &str, object: &str) -> Result<AclList> {
        self.inner.list_object_acls(bucket, object).await
    }

    /// Revoke an entity's access rule on an object.
    pub async fn delete_object_acl(
        &self,
        bucket: &str,
        object: &str,
        entity: &str,
    ) -> Result<()> {
        self.inner.delete_object_acl(bucket, object, entity).await
    }

    /// Create a bucket under the configured project.
    pub async fn insert_bucket(&self, bucket: &str) -> Result<Bucket> {
        self.inner.insert_bucket(bucket).await
    }

    /// Read a bucket's resource record.
    pub async fn get_bucket(&self, bucket: &str) -> Result<Bucket> {
        self.inner.get_bucket(bucket).await
    }

    /// Delete a bucket.
    pub async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        self.inner.delete_bucket(bucket).await
    }

    /// List the configured project's buckets.
    pub async fn list_buckets(&self) -> Result<BucketList> {
        self.inner.list_buckets().await
    }

    /// Produce a presigned request for an arbitrary operation.
    ///
    /// Nothing is sent; hand the answered uri (and headers, when present) to
    /// any HTTP client. The live backend signs the query with the service
    /// account credential and fails `ConfigInvalid` without one.
    pub async fn presign(
        &self,
        bucket: &str,
        object: &str,
        operation: PresignOperation,
        expire: Duration,
    ) -> Result<PresignedRequest> {
        self.inner.presign(bucket, object, operation, expire).await
    }

    /// Presign downloading an object.
    ///
    /// # Examples
    ///
    /// ```
    /// # use anyhow::Result;
    /// # use std::time::Duration;
    /// # use stratus::Storage;
    /// # async fn test(storage: Storage) -> Result<()> {
    /// let req = storage
    ///     .presign_read("fixtures", "o1", Duration::from_secs(3600))
    ///     .await?;
    /// println!("GET {}", req.uri());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn presign_read(
        &self,
        bucket: &str,
        object: &str,
        expire: Duration,
    ) -> Result<PresignedRequest> {
        self.inner
            .presign(bucket, object, PresignOperation::Read, expire)
            .await
    }

    /// Presign uploading an object.
    pub async fn presign_write(
        &self,
        bucket: &str,
        object: &str,
        expire: Duration,
    ) -> Result<PresignedRequest> {
        self.inner
            .presign(bucket, object, PresignOperation::Write, expire)
            .await
    }

    /// Presign deleting an object.
    pub async fn presign_delete(
        &self,
        bucket: &str,
        object: &str,
        expire: Duration,
    ) -> Result<PresignedRequest> {
        self.inner
            .presign(bucket, object, PresignOperation::Delete, expire)
            .await
    }
}
