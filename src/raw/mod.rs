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

//! Raw building blocks shared by the service backends.
//!
//! Mostly support code for the crate itself: vendor error parsing, the
//! multipart codec and URL encoding helpers. Only [`HttpClient`] is part
//! of the public API, so callers can hand a preconfigured client to the
//! builders.

mod client;
pub use client::HttpClient;

mod error;
pub(crate) use error::new_request_build_error;
pub(crate) use error::new_request_credential_error;
pub(crate) use error::new_request_sign_error;
pub(crate) use error::parse_error;

mod multipart;
pub(crate) use multipart::Multipart;
pub(crate) use multipart::RelatedPart;

mod serde_util;
pub(crate) use serde_util::new_json_deserialize_error;
pub(crate) use serde_util::new_json_serialize_error;
pub(crate) use serde_util::ConfigDeserializer;

mod uri;
pub(crate) use uri::percent_encode_component;
pub(crate) use uri::percent_encode_path;
