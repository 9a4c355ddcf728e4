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

//! Google Compute Engine bindings: the [`InstanceManager`] contract, the
//! [`Compute`] facade in front of it, and the live and mock backends.

mod backend;
mod core;
mod mock;

pub use backend::GoogleComputeBuilder;
pub use backend::GoogleComputeConfig;

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use crate::ComputeOperation;
use crate::Result;
use crate::TargetInstance;
use crate::TargetInstanceList;

/// The compute operations a backend must provide.
///
/// Implemented by the live Google Compute Engine backend and by the mock.
/// Zones are accepted both as bare names (`us-central1-b`) and as fully
/// qualified resource URLs; either spelling addresses the same zone.
#[async_trait]
pub trait InstanceManager: Send + Sync + Debug {
    /// Delete a target instance from a zone.
    ///
    /// Deletion is asynchronous on the vendor side; the returned
    /// [`ComputeOperation`] tracks its progress.
    async fn delete_target_instance(&self, name: &str, zone: &str) -> Result<ComputeOperation>;

    /// Fetch a single target instance by name.
    async fn get_target_instance(&self, name: &str, zone: &str) -> Result<TargetInstance>;

    /// Create a target instance in a zone.
    ///
    /// Vendor owned fields on `target` (id, timestamps, links) are left out
    /// of the request; the vendor fills them in.
    async fn insert_target_instance(
        &self,
        target: TargetInstance,
        zone: &str,
    ) -> Result<ComputeOperation>;

    /// List the target instances of a zone, optionally narrowed by a vendor
    /// filter expression such as `name eq edge-target`.
    async fn list_target_instances(
        &self,
        zone: &str,
        filter: Option<&str>,
    ) -> Result<TargetInstanceList>;
}

/// The entry point for compute calls.
///
/// `Compute` is a thin handle over an [`InstanceManager`] backend. Handles
/// are cheap to clone and share one backend.
///
/// # Examples
///
/// Build against the live service:
///
/// ```no_run
/// use stratus::Compute;
/// use stratus::Result;
///
/// fn example() -> Result<()> {
///     let compute = Compute::google()
///         .project("example")
///         .credential_path("/path/to/credentials.json")
///         .build()?;
///     Ok(())
/// }
/// ```
///
/// The mock accepts every call but supports none of them:
///
/// ```
/// # use stratus::Compute;
/// # use stratus::ErrorKind;
/// # use stratus::Result;
/// # async fn example() -> Result<()> {
/// let compute = Compute::mock();
///
/// let err = compute
///     .delete_target_instance("edge-target", "us-central1-b")
///     .await
///     .expect_err("the mock answers unsupported");
/// assert_eq!(err.kind(), ErrorKind::Unsupported);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Compute {
    inner: Arc<dyn InstanceManager>,
}

impl Compute {
    /// Wrap a backend into a handle.
    pub fn new(backend: impl InstanceManager + 'static) -> Self {
        Self {
            inner: Arc::new(backend),
        }
    }

    /// Create a handle over the mock backend.
    ///
    /// The mock signals [`ErrorKind::Unsupported`][crate::ErrorKind] for
    /// every operation; it exists so code paths that merely construct a
    /// compute handle keep working offline.
    pub fn mock() -> Self {
        Self::new(mock::MockCompute::new())
    }

    /// Start building a handle over the live Google Compute Engine backend.
    pub fn google() -> GoogleComputeBuilder {
        GoogleComputeBuilder::new()
    }

    /// Delete a target instance from a zone.
    ///
    /// The zone may be a bare name or a fully qualified resource URL.
    ///
    /// ```no_run
    /// # use stratus::Compute;
    /// # use stratus::Result;
    /// # async fn example(compute: Compute) -> Result<()> {
    /// let op = compute
    ///     .delete_target_instance("edge-target", "us-central1-b")
    ///     .await?;
    /// println!("deletion running: {}", op.status);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn delete_target_instance(&self, name: &str, zone: &str) -> Result<ComputeOperation> {
        self.inner.delete_target_instance(name, zone).await
    }

    /// Fetch a single target instance by name.
    pub async fn get_target_instance(&self, name: &str, zone: &str) -> Result<TargetInstance> {
        self.inner.get_target_instance(name, zone).await
    }

    /// Create a target instance in a zone.
    pub async fn insert_target_instance(
        &self,
        target: TargetInstance,
        zone: &str,
    ) -> Result<ComputeOperation> {
        self.inner.insert_target_instance(target, zone).await
    }

    /// List the target instances of a zone.
    ///
    /// `filter` is passed through to the vendor untouched.
    pub async fn list_target_instances(
        &self,
        zone: &str,
        filter: Option<&str>,
    ) -> Result<TargetInstanceList> {
        self.inner.list_target_instances(zone, filter).await
    }
}
