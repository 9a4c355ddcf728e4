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

/// The vendor target instance resource record.
///
/// A target instance points a forwarding rule at a single VM instance.
/// Doubles as the insert request body; empty fields, including everything
/// the vendor owns (id, timestamps, links), drop out on serialization.
///
/// Refer to
/// <https://cloud.google.com/compute/docs/reference/rest/v1/targetInstances>
/// for the full field set.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TargetInstance {
    /// The unique identifier of the resource, string encoded.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// The name of the target instance.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// An optional description of this resource.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Full URL of the zone containing the target instance.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub zone: String,
    /// NAT policy for the target instance, always `NO_NAT`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub nat_policy: String,
    /// Full URL of the VM instance this target points at.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub instance: String,
    /// The creation time of the resource, RFC 3339.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub creation_timestamp: String,
    /// The link to this resource.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub self_link: String,
}

impl TargetInstance {
    /// Describe a target instance to create: a name and the full URL of the
    /// VM instance it points at.
    pub fn new(name: &str, instance: &str) -> Self {
        Self {
            name: name.to_string(),
            nat_policy: "NO_NAT".to_string(),
            instance: instance.to_string(),
            ..Default::default()
        }
    }
}

/// One page answered by the list target instances API.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TargetInstanceList {
    /// The continuation token, absent on the last page.
    pub next_page_token: Option<String>,
    /// The list of target instances in the requested zone.
    pub items: Vec<TargetInstance>,
}

/// The vendor zone operation record.
///
/// Mutations against compute resources answer an operation that tracks the
/// change; deleting a target instance hands one back immediately while the
/// deletion itself completes in the background.
#[derive(Default, Debug, Clone, Eq, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComputeOperation {
    /// The unique identifier of the operation, string encoded.
    pub id: String,
    /// The name of the operation.
    pub name: String,
    /// Full URL of the zone the operation runs in.
    pub zone: String,
    /// The type of operation, such as `insert` or `delete`.
    pub operation_type: String,
    /// Full URL of the resource the operation mutates.
    pub target_link: String,
    /// The unique identifier of the target resource, string encoded.
    pub target_id: String,
    /// Operation status, one of `PENDING`, `RUNNING` or `DONE`.
    pub status: String,
    /// Progress indicator between 0 and 100.
    pub progress: u32,
    /// The time the operation was requested, RFC 3339.
    pub insert_time: String,
    /// The time the operation started running, RFC 3339.
    pub start_time: String,
    /// The link to this operation.
    pub self_link: String,
}

impl ComputeOperation {
    /// Whether the vendor reports this operation as finished.
    pub fn is_done(&self) -> bool {
        self.status == "DONE"
    }
}
