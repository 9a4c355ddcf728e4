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

use std::fmt::Display;
use std::fmt::Formatter;

/// Operation is the name for APIs of the two backend families.
///
/// Threaded into [`crate::Error`] so failures always name the call that
/// produced them.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
#[non_exhaustive]
pub enum Operation {
    /// Operation for [`crate::ObjectStore::put_object`]
    PutObject,
    /// Operation for [`crate::ObjectStore::get_object`]
    GetObject,
    /// Operation for [`crate::ObjectStore::get_object_metadata`]
    GetObjectMetadata,
    /// Operation for [`crate::ObjectStore::delete_object`]
    DeleteObject,
    /// Operation for [`crate::ObjectStore::copy_object`]
    CopyObject,
    /// Operation for [`crate::ObjectStore::list_objects`]
    ListObjects,
    /// Operation for [`crate::ObjectStore::insert_object_acl`]
    InsertObjectAcl,
    /// Operation for [`crate::ObjectStore::get_object_acl`]
    GetObjectAcl,
    /// Operation for [`crate::ObjectStore::list_object_acls`]
    ListObjectAcls,
    /// Operation for [`crate::ObjectStore::delete_object_acl`]
    DeleteObjectAcl,
    /// Operation for [`crate::ObjectStore::insert_bucket`]
    InsertBucket,
    /// Operation for [`crate::ObjectStore::get_bucket`]
    GetBucket,
    /// Operation for [`crate::ObjectStore::delete_bucket`]
    DeleteBucket,
    /// Operation for [`crate::ObjectStore::list_buckets`]
    ListBuckets,
    /// Operation for [`crate::ObjectStore::presign`]
    Presign,
    /// Operation for [`crate::InstanceManager::delete_target_instance`]
    DeleteTargetInstance,
    /// Operation for [`crate::InstanceManager::get_target_instance`]
    GetTargetInstance,
    /// Operation for [`crate::InstanceManager::insert_target_instance`]
    InsertTargetInstance,
    /// Operation for [`crate::InstanceManager::list_target_instances`]
    ListTargetInstances,
}

impl Operation {
    /// Convert self into static str.
    pub fn into_static(self) -> &'static str {
        self.into()
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.into_static())
    }
}

impl From<Operation> for &'static str {
    fn from(v: Operation) -> &'static str {
        match v {
            Operation::PutObject => "put_object",
            Operation::GetObject => "get_object",
            Operation::GetObjectMetadata => "get_object_metadata",
            Operation::DeleteObject => "delete_object",
            Operation::CopyObject => "copy_object",
            Operation::ListObjects => "list_objects",
            Operation::InsertObjectAcl => "insert_object_acl",
            Operation::GetObjectAcl => "get_object_acl",
            Operation::ListObjectAcls => "list_object_acls",
            Operation::DeleteObjectAcl => "delete_object_acl",
            Operation::InsertBucket => "insert_bucket",
            Operation::GetBucket => "get_bucket",
            Operation::DeleteBucket => "delete_bucket",
            Operation::ListBuckets => "list_buckets",
            Operation::Presign => "presign",
            Operation::DeleteTargetInstance => "delete_target_instance",
            Operation::GetTargetInstance => "get_target_instance",
            Operation::InsertTargetInstance => "insert_target_instance",
            Operation::ListTargetInstances => "list_target_instances",
        }
    }
}
