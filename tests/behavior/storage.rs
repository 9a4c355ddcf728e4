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
use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use stratus::ErrorKind;
use stratus::ListObjectsOptions;
use stratus::ObjectAccessControl;
use stratus::Payload;
use stratus::PutObjectOptions;
use stratus::Storage;

use crate::utils::gen_bytes;

/// Every case below runs twice: against the mock backend with a fresh
/// bucket name, and against the live service when the environment provides
/// one. Object names are randomized so live runs don't collide.
macro_rules! behavior_storage_tests {
    ($($test:ident),* $(,)?) => {
        mod storage_mock {
            $(
                #[tokio::test]
                async fn $test() -> anyhow::Result<()> {
                    let bucket = format!("bucket-{}", uuid::Uuid::new_v4());
                    crate::storage::$test(stratus::Storage::mock(), bucket).await
                }
            )*
        }

        mod storage_gcs {
            $(
                #[tokio::test]
                async fn $test() -> anyhow::Result<()> {
                    match crate::utils::init_gcs_service() {
                        Some((storage, bucket)) => crate::storage::$test(storage, bucket).await,
                        None => {
                            log::warn!("gcs backend not configured, ignored");
                            Ok(())
                        }
                    }
                }
            )*
        }
    };
}

behavior_storage_tests!(
    test_put_inline_text_and_get,
    test_put_file_handle_sniffs_content_type,
    test_put_described_source,
    test_put_random_file_content,
    test_put_object_with_nested_name,
    test_put_object_with_predefined_acl,
    test_put_object_invalid_predefined_acl,
    test_put_object_with_metadata,
    test_put_object_checksum_mismatch,
    test_get_object_not_exist,
    test_get_object_metadata,
    test_delete_object,
    test_delete_object_not_exist,
    test_copy_object,
    test_list_objects_with_prefix,
    test_list_objects_with_delimiter,
    test_list_objects_paging,
    test_object_acl_round_trip,
    test_presign_read,
);

/// Uploading literal text stores it under the implied `text/plain`.
pub async fn test_put_inline_text_and_get(storage: Storage, bucket: String) -> Result<()> {
    let name = uuid::Uuid::new_v4().to_string();

    let meta = storage.put_object(&bucket, &name, "A file body").await?;
    assert_eq!(meta.name, name);
    assert_eq!(meta.bucket, bucket);

    let object = storage.get_object(&bucket, &name).await?;
    assert_eq!(object.body, "A file body");
    assert_eq!(object.content_type, "text/plain");
    assert_eq!(object.size, 11);

    storage
        .delete_object(&bucket, &name)
        .await
        .expect("delete must succeed");
    Ok(())
}

/// An opened file gets its content type sniffed from the header bytes.
pub async fn test_put_file_handle_sniffs_content_type(
    storage: Storage,
    bucket: String,
) -> Result<()> {
    let name = format!("{}.png", uuid::Uuid::new_v4());

    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(&[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'])?;
    let handle = tokio::fs::File::open(file.path()).await?;

    storage.put_object(&bucket, &name, handle).await?;

    let object = storage.get_object(&bucket, &name).await?;
    assert_eq!(object.content_type, "image/png");
    assert_eq!(object.size, 8);

    storage
        .delete_object(&bucket, &name)
        .await
        .expect("delete must succeed");
    Ok(())
}

/// A described source uses the declared content type verbatim, no sniffing.
pub async fn test_put_described_source(storage: Storage, bucket: String) -> Result<()> {
    let name = format!("{}.png", uuid::Uuid::new_v4());

    let mut file = tempfile::NamedTempFile::new()?;
    // Plain text on disk, the declared type must win anyway.
    file.write_all(b"pixels")?;

    storage
        .put_object(
            &bucket,
            &name,
            Payload::DescribedSource {
                path: file.path().to_path_buf(),
                content_type: "image/png".to_string(),
            },
        )
        .await?;

    let object = storage.get_object(&bucket, &name).await?;
    assert_eq!(object.body, "pixels");
    assert_eq!(object.content_type, "image/png");

    storage
        .delete_object(&bucket, &name)
        .await
        .expect("delete must succeed");
    Ok(())
}

/// Binary content survives the round trip unchanged.
pub async fn test_put_random_file_content(storage: Storage, bucket: String) -> Result<()> {
    let name = uuid::Uuid::new_v4().to_string();
    let (content, size) = gen_bytes();

    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(&content)?;
    let handle = tokio::fs::File::open(file.path()).await?;

    storage.put_object(&bucket, &name, handle).await?;

    let object = storage.get_object(&bucket, &name).await?;
    assert_eq!(object.size, size as u64);
    assert_eq!(object.body, content);

    storage
        .delete_object(&bucket, &name)
        .await
        .expect("delete must succeed");
    Ok(())
}

/// Slashes in object names are names, not directories.
pub async fn test_put_object_with_nested_name(storage: Storage, bucket: String) -> Result<()> {
    let name = format!("dir/sub/{}.txt", uuid::Uuid::new_v4());

    let meta = storage.put_object(&bucket, &name, "A file body").await?;
    assert_eq!(meta.name, name);

    let object = storage.get_object(&bucket, &name).await?;
    assert_eq!(object.body, "A file body");

    storage
        .delete_object(&bucket, &name)
        .await
        .expect("delete must succeed");
    Ok(())
}

/// A known predefined ACL name is passed through and accepted.
pub async fn test_put_object_with_predefined_acl(storage: Storage, bucket: String) -> Result<()> {
    let name = uuid::Uuid::new_v4().to_string();

    storage
        .put_object_with(
            &bucket,
            &name,
            "A file body",
            Some("publicRead"),
            PutObjectOptions::new(),
        )
        .await?;

    storage
        .delete_object(&bucket, &name)
        .await
        .expect("delete must succeed");
    Ok(())
}

/// An unknown predefined ACL name is refused as invalid input.
pub async fn test_put_object_invalid_predefined_acl(
    storage: Storage,
    bucket: String,
) -> Result<()> {
    let name = uuid::Uuid::new_v4().to_string();

    let err = storage
        .put_object_with(
            &bucket,
            &name,
            "A file body",
            Some("not-a-real-acl"),
            PutObjectOptions::new(),
        )
        .await
        .expect_err("put must fail");
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    Ok(())
}

/// User metadata set on upload comes back on a metadata read.
pub async fn test_put_object_with_metadata(storage: Storage, bucket: String) -> Result<()> {
    let name = uuid::Uuid::new_v4().to_string();

    storage
        .put_object_with(
            &bucket,
            &name,
            "A file body",
            None,
            PutObjectOptions::new()
                .with_metadata(HashMap::from([("owner".to_string(), "team-data".to_string())])),
        )
        .await?;

    let meta = storage.get_object_metadata(&bucket, &name).await?;
    assert_eq!(meta.metadata.get("owner"), Some(&"team-data".to_string()));

    storage
        .delete_object(&bucket, &name)
        .await
        .expect("delete must succeed");
    Ok(())
}

/// A declared md5 that doesn't match the content fails the upload.
pub async fn test_put_object_checksum_mismatch(storage: Storage, bucket: String) -> Result<()> {
    let name = uuid::Uuid::new_v4().to_string();

    let err = storage
        .put_object_with(
            &bucket,
            &name,
            "A file body",
            None,
            PutObjectOptions::new().with_md5_hash("bm90IHRoZSBoYXNo"),
        )
        .await
        .expect_err("put must fail");
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    Ok(())
}

/// Reading a missing object answers not found.
pub async fn test_get_object_not_exist(storage: Storage, bucket: String) -> Result<()> {
    let name = uuid::Uuid::new_v4().to_string();

    let err = storage
        .get_object(&bucket, &name)
        .await
        .expect_err("get must fail");
    assert_eq!(err.kind(), ErrorKind::NotFound);
    Ok(())
}

/// The metadata read answers the stored record without the content.
pub async fn test_get_object_metadata(storage: Storage, bucket: String) -> Result<()> {
    let name = uuid::Uuid::new_v4().to_string();

    storage.put_object(&bucket, &name, "A file body").await?;

    let meta = storage.get_object_metadata(&bucket, &name).await?;
    assert_eq!(meta.name, name);
    assert_eq!(meta.content_length(), 11);
    assert!(!meta.md5_hash.is_empty());
    assert!(!meta.etag.is_empty());

    storage
        .delete_object(&bucket, &name)
        .await
        .expect("delete must succeed");
    Ok(())
}

/// A deleted object is gone.
pub async fn test_delete_object(storage: Storage, bucket: String) -> Result<()> {
    let name = uuid::Uuid::new_v4().to_string();

    storage.put_object(&bucket, &name, "A file body").await?;
    storage.delete_object(&bucket, &name).await?;

    let err = storage
        .get_object(&bucket, &name)
        .await
        .expect_err("get must fail");
    assert_eq!(err.kind(), ErrorKind::NotFound);
    Ok(())
}

/// Deleting a missing object answers not found.
pub async fn test_delete_object_not_exist(storage: Storage, bucket: String) -> Result<()> {
    let name = uuid::Uuid::new_v4().to_string();

    let err = storage
        .delete_object(&bucket, &name)
        .await
        .expect_err("delete must fail");
    assert_eq!(err.kind(), ErrorKind::NotFound);
    Ok(())
}

/// A server side copy preserves the content.
pub async fn test_copy_object(storage: Storage, bucket: String) -> Result<()> {
    let source = uuid::Uuid::new_v4().to_string();
    let target = uuid::Uuid::new_v4().to_string();

    storage.put_object(&bucket, &source, "A file body").await?;
    let meta = storage
        .copy_object(&bucket, &source, &bucket, &target)
        .await?;
    assert_eq!(meta.name, target);

    let object = storage.get_object(&bucket, &target).await?;
    assert_eq!(object.body, "A file body");

    storage
        .delete_object(&bucket, &source)
        .await
        .expect("delete must succeed");
    storage
        .delete_object(&bucket, &target)
        .await
        .expect("delete must succeed");
    Ok(())
}

/// A prefix narrows the listing to matching names, answered in order.
pub async fn test_list_objects_with_prefix(storage: Storage, bucket: String) -> Result<()> {
    let prefix = format!("list-{}/", uuid::Uuid::new_v4());
    let inside = [format!("{prefix}a.txt"), format!("{prefix}b.txt")];
    let outside = format!("outside-{}.txt", uuid::Uuid::new_v4());

    for name in inside.iter().chain([&outside]) {
        storage.put_object(&bucket, name, "A file body").await?;
    }

    let page = storage
        .list_objects(&bucket, ListObjectsOptions::new().with_prefix(&prefix))
        .await?;
    let names = page
        .items
        .iter()
        .map(|item| item.name.clone())
        .collect::<Vec<_>>();
    assert_eq!(names, inside);

    for name in inside.iter().chain([&outside]) {
        storage
            .delete_object(&bucket, name)
            .await
            .expect("delete must succeed");
    }
    Ok(())
}

/// A delimiter folds deeper names into prefixes, like directories.
pub async fn test_list_objects_with_delimiter(storage: Storage, bucket: String) -> Result<()> {
    let prefix = format!("dl-{}/", uuid::Uuid::new_v4());
    let flat = format!("{prefix}a.txt");
    let nested = format!("{prefix}sub/b.txt");

    storage.put_object(&bucket, &flat, "A file body").await?;
    storage.put_object(&bucket, &nested, "A file body").await?;

    let page = storage
        .list_objects(
            &bucket,
            ListObjectsOptions::new()
                .with_prefix(&prefix)
                .with_delimiter("/"),
        )
        .await?;
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name, flat);
    assert_eq!(page.prefixes, vec![format!("{prefix}sub/")]);

    storage
        .delete_object(&bucket, &flat)
        .await
        .expect("delete must succeed");
    storage
        .delete_object(&bucket, &nested)
        .await
        .expect("delete must succeed");
    Ok(())
}

/// Capped pages chain through `next_page_token` until everything is listed.
pub async fn test_list_objects_paging(storage: Storage, bucket: String) -> Result<()> {
    let prefix = format!("pg-{}/", uuid::Uuid::new_v4());
    let names = [
        format!("{prefix}a.txt"),
        format!("{prefix}b.txt"),
        format!("{prefix}c.txt"),
    ];

    for name in &names {
        storage.put_object(&bucket, name, "A file body").await?;
    }

    let first = storage
        .list_objects(
            &bucket,
            ListObjectsOptions::new()
                .with_prefix(&prefix)
                .with_max_results(2),
        )
        .await?;
    assert_eq!(first.items.len(), 2);
    let token = first.next_page_token.expect("first page must continue");

    let second = storage
        .list_objects(
            &bucket,
            ListObjectsOptions::new()
                .with_prefix(&prefix)
                .with_max_results(2)
                .with_page_token(&token),
        )
        .await?;
    assert_eq!(second.items.len(), 1);
    assert!(second.next_page_token.is_none());

    let mut listed = first
        .items
        .iter()
        .chain(second.items.iter())
        .map(|item| item.name.clone())
        .collect::<Vec<_>>();
    listed.sort_unstable();
    assert_eq!(listed, names);

    for name in &names {
        storage
            .delete_object(&bucket, name)
            .await
            .expect("delete must succeed");
    }
    Ok(())
}

/// Granting, reading, listing and revoking one entity's access.
pub async fn test_object_acl_round_trip(storage: Storage, bucket: String) -> Result<()> {
    let name = uuid::Uuid::new_v4().to_string();

    storage.put_object(&bucket, &name, "A file body").await?;

    let rule = storage
        .insert_object_acl(&bucket, &name, ObjectAccessControl::new("allUsers", "READER"))
        .await?;
    assert_eq!(rule.entity, "allUsers");
    assert_eq!(rule.role, "READER");

    let rule = storage.get_object_acl(&bucket, &name, "allUsers").await?;
    assert_eq!(rule.role, "READER");

    let rules = storage.list_object_acls(&bucket, &name).await?;
    assert!(rules.items.iter().any(|rule| rule.entity == "allUsers"));

    storage.delete_object_acl(&bucket, &name, "allUsers").await?;
    let err = storage
        .get_object_acl(&bucket, &name, "allUsers")
        .await
        .expect_err("rule must be gone");
    assert_eq!(err.kind(), ErrorKind::NotFound);

    storage
        .delete_object(&bucket, &name)
        .await
        .expect("delete must succeed");
    Ok(())
}

/// A presigned read is a plain GET on the object, authorized by its query.
pub async fn test_presign_read(storage: Storage, bucket: String) -> Result<()> {
    let name = uuid::Uuid::new_v4().to_string();

    storage.put_object(&bucket, &name, "A file body").await?;

    let req = storage
        .presign_read(&bucket, &name, Duration::from_secs(3600))
        .await?;
    assert_eq!(req.method().as_str(), "GET");
    let uri = req.uri().to_string();
    assert!(uri.contains(&bucket));
    assert!(uri.contains(&name));
    assert!(req.uri().query().is_some());

    storage
        .delete_object(&bucket, &name)
        .await
        .expect("delete must succeed");
    Ok(())
}

/// Bucket management is mock only here: creating and deleting live buckets
/// needs project level billing nobody wants a test suite to touch.
mod bucket_mock {
    use anyhow::Result;
    use stratus::ErrorKind;
    use stratus::Storage;

    #[tokio::test]
    async fn test_bucket_lifecycle() -> Result<()> {
        let storage = Storage::mock();
        let bucket = format!("bucket-{}", uuid::Uuid::new_v4());

        let created = storage.insert_bucket(&bucket).await?;
        assert_eq!(created.name, bucket);

        let err = storage
            .insert_bucket(&bucket)
            .await
            .expect_err("second create must fail");
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);

        let found = storage.get_bucket(&bucket).await?;
        assert_eq!(found.name, bucket);

        let page = storage.list_buckets().await?;
        assert!(page.items.iter().any(|b| b.name == bucket));

        storage.delete_bucket(&bucket).await?;
        let err = storage
            .get_bucket(&bucket)
            .await
            .expect_err("bucket must be gone");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_bucket_refuses_non_empty() -> Result<()> {
        let storage = Storage::mock();
        let bucket = format!("bucket-{}", uuid::Uuid::new_v4());

        storage.put_object(&bucket, "keep.txt", "A file body").await?;

        let err = storage
            .delete_bucket(&bucket)
            .await
            .expect_err("delete must fail while objects remain");
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);

        storage.delete_object(&bucket, "keep.txt").await?;
        storage.delete_bucket(&bucket).await?;
        Ok(())
    }
}
