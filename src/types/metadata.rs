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

use bytes::Bytes;
use serde::Deserialize;

use crate::ObjectAccessControl;

/// A downloaded object: the requested name, what the response headers said
/// about the content, and the body itself.
#[derive(Clone)]
pub struct Object {
    /// The name the object was requested under.
    pub name: String,
    /// Content type answered by the vendor, empty when the vendor didn't
    /// say.
    pub content_type: String,
    /// Body length in bytes.
    pub size: u64,
    /// The object content.
    pub body: Bytes,
}

impl Debug for Object {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Object")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// The vendor object resource record.
///
/// Answered by uploads, metadata reads, copies and listing. Numeric fields
/// arrive string encoded on the wire and are kept that way; see
/// [`content_length`][ObjectMetadata::content_length] for the parsed size.
///
/// Refer to <https://cloud.google.com/storage/docs/json_api/v1/objects> for
/// the full field set.
#[derive(Default, Debug, Clone, Eq, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObjectMetadata {
    /// The ID of the object, including bucket name, object name and
    /// generation.
    pub id: String,
    /// The link to this object.
    pub self_link: String,
    /// The link to download the object content.
    pub media_link: String,
    /// The name of the object.
    pub name: String,
    /// The name of the bucket containing this object.
    pub bucket: String,
    /// The content generation of this object.
    pub generation: String,
    /// The metadata generation of this object.
    pub metageneration: String,
    /// Content-Type of the object data.
    pub content_type: String,
    /// Content-Encoding of the object data.
    pub content_encoding: String,
    /// Content-Disposition of the object data.
    pub content_disposition: String,
    /// Content-Language of the object data.
    pub content_language: String,
    /// Cache-Control directive for the object data.
    pub cache_control: String,
    /// Storage class of the object.
    pub storage_class: String,
    /// Content-Length of the data in bytes, string encoded.
    pub size: String,
    /// MD5 hash of the data, base64 encoded.
    pub md5_hash: String,
    /// CRC32c checksum, base64 encoded.
    pub crc32c: String,
    /// HTTP 1.1 entity tag for the object.
    pub etag: String,
    /// The creation time of the object, RFC 3339.
    pub time_created: String,
    /// The modification time of the object metadata, RFC 3339.
    pub updated: String,
    /// User-provided metadata, in key/value pairs.
    pub metadata: HashMap<String, String>,
    /// Access controls on the object, when the vendor answers them.
    pub acl: Vec<ObjectAccessControl>,
}

impl ObjectMetadata {
    /// The object size parsed out of the string encoded wire field.
    pub fn content_length(&self) -> u64 {
        self.size.parse().unwrap_or_default()
    }
}

/// One page answered by the list objects API.
///
/// Refer to <https://cloud.google.com/storage/docs/json_api/v1/objects/list>
/// for details.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObjectList {
    /// The continuation token.
    ///
    /// If this is the last page of results, then no continuation token is
    /// returned.
    pub next_page_token: Option<String>,
    /// Object name prefixes for objects that matched the listing request
    /// but were excluded from `items` because of a delimiter.
    pub prefixes: Vec<String>,
    /// The list of objects, ordered lexicographically by name.
    pub items: Vec<ObjectMetadata>,
}

/// The vendor bucket resource record.
#[derive(Default, Debug, Clone, Eq, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Bucket {
    /// The ID of the bucket.
    pub id: String,
    /// The name of the bucket.
    pub name: String,
    /// The location of the bucket.
    pub location: String,
    /// The default storage class of the bucket.
    pub storage_class: String,
    /// The project number the bucket belongs to, string encoded.
    pub project_number: String,
    /// The metadata generation of this bucket.
    pub metageneration: String,
    /// HTTP 1.1 entity tag for the bucket.
    pub etag: String,
    /// The creation time of the bucket, RFC 3339.
    pub time_created: String,
    /// The modification time of the bucket, RFC 3339.
    pub updated: String,
}

/// One page answered by the list buckets API.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BucketList {
    /// The continuation token, absent on the last page.
    pub next_page_token: Option<String>,
    /// The list of buckets, ordered lexicographically by name.
    pub items: Vec<Bucket>,
}
