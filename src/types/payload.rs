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
use std::io;
use std::path::PathBuf;

use bytes::Bytes;
use tokio::io::AsyncReadExt;

use crate::Error;
use crate::ErrorKind;
use crate::Result;

/// The content type applied to inline text payloads.
const TEXT_PLAIN: &str = "text/plain";

/// Payload is the upload content accepted by
/// [`put_object`][crate::ObjectStore::put_object].
///
/// The variant set is closed: every payload resolves to a byte source and a
/// shape-implied content type before any request is built, so there is no
/// "unrecognized shape" failure mode.
///
/// - [`Payload::InlineText`] carries literal text, implied `text/plain`.
/// - [`Payload::FileHandle`] reads an open file, the content type is sniffed
///   from the file's header bytes.
/// - [`Payload::DescribedSource`] reads from a path and trusts the declared
///   content type, never sniffing.
///
/// The implied content type only applies when the caller didn't set one in
/// [`PutObjectOptions`][crate::PutObjectOptions].
pub enum Payload {
    /// Literal text content.
    InlineText(String),
    /// An already opened file. Bytes are read from the current cursor.
    FileHandle(tokio::fs::File),
    /// File-like content described by a path and a declared content type.
    DescribedSource {
        /// Path the bytes are read from.
        path: PathBuf,
        /// Content type to use verbatim, e.g. `image/png`.
        content_type: String,
    },
}

impl Payload {
    /// Resolve the payload into its byte source and implied content type.
    ///
    /// Runs before any network call. The implied content type is `None` only
    /// when sniffing a file handle doesn't recognize the header bytes.
    pub(crate) async fn resolve(self) -> Result<(Bytes, Option<String>)> {
        match self {
            Payload::InlineText(text) => Ok((Bytes::from(text), Some(TEXT_PLAIN.to_string()))),
            Payload::FileHandle(mut file) => {
                let mut content = Vec::new();
                file.read_to_end(&mut content)
                    .await
                    .map_err(new_payload_read_error)?;

                let content_type = infer::get(&content).map(|t| t.mime_type().to_string());
                Ok((Bytes::from(content), content_type))
            }
            Payload::DescribedSource { path, content_type } => {
                let content = tokio::fs::read(&path).await.map_err(|err| {
                    new_payload_read_error(err).with_context("path", path.display())
                })?;

                Ok((Bytes::from(content), Some(content_type)))
            }
        }
    }
}

impl Debug for Payload {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Payload::InlineText(text) => f
                .debug_struct("InlineText")
                .field("length", &text.len())
                .finish(),
            Payload::FileHandle(_) => f.debug_struct("FileHandle").finish_non_exhaustive(),
            Payload::DescribedSource { path, content_type } => f
                .debug_struct("DescribedSource")
                .field("path", path)
                .field("content_type", content_type)
                .finish(),
        }
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::InlineText(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::InlineText(text.to_string())
    }
}

impl From<tokio::fs::File> for Payload {
    fn from(file: tokio::fs::File) -> Self {
        Payload::FileHandle(file)
    }
}

fn new_payload_read_error(err: io::Error) -> Error {
    let kind = match err.kind() {
        io::ErrorKind::NotFound => ErrorKind::NotFound,
        io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
        _ => ErrorKind::Unexpected,
    };

    Error::new(kind, "reading payload content").set_source(err)
}
