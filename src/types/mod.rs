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

mod acl;
pub use acl::AclList;
pub use acl::ObjectAccessControl;

mod error;
pub use error::Error;
pub use error::ErrorKind;
pub use error::Result;

mod instance;
pub use instance::ComputeOperation;
pub use instance::TargetInstance;
pub use instance::TargetInstanceList;

mod metadata;
pub use metadata::Bucket;
pub use metadata::BucketList;
pub use metadata::Object;
pub use metadata::ObjectList;
pub use metadata::ObjectMetadata;

mod operation;
pub use operation::Operation;

mod options;
pub use options::ListObjectsOptions;
pub use options::PutObjectOptions;

mod payload;
pub use payload::Payload;

mod presign;
pub use presign::PresignOperation;
pub use presign::PresignedRequest;
