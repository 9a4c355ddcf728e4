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

use serde::Deserialize;
use serde::Serialize;

/// One access-control rule on an object.
///
/// Only `entity` and `role` are caller-supplied; the rest is vendor
/// bookkeeping answered on reads and skipped on writes when absent.
///
/// Entities follow the vendor grammar: `user-<email>`, `group-<email>`,
/// `domain-<domain>`, `project-<team>-<id>`, `allUsers`,
/// `allAuthenticatedUsers`. Roles are `READER`, `OWNER`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObjectAccessControl {
    /// The entity holding the permission.
    pub entity: String,
    /// The access permission for the entity.
    pub role: String,
    /// The bucket the rule applies to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    /// The object the rule applies to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    /// The content generation the rule applies to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation: Option<String>,
    /// The email address associated with the entity, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// The ID for the entity, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    /// The domain associated with the entity, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// HTTP 1.1 entity tag for the rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

impl ObjectAccessControl {
    /// Create a new rule from an entity and a role.
    pub fn new(entity: &str, role: &str) -> Self {
        Self {
            entity: entity.to_string(),
            role: role.to_string(),
            ..Default::default()
        }
    }
}

/// The list of access-control rules on an object.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AclList {
    /// The rules, one per entity.
    pub items: Vec<ObjectAccessControl>,
}
