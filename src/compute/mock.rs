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

use async_trait::async_trait;

use super::InstanceManager;
use crate::ComputeOperation;
use crate::Error;
use crate::ErrorKind;
use crate::Operation;
use crate::Result;
use crate::TargetInstance;
use crate::TargetInstanceList;

/// An in-memory stand-in for the compute service.
///
/// Unlike [`MockStorage`][crate::storage] this one carries no state at all:
/// every operation answers [`ErrorKind::Unsupported`]. Callers that want to
/// exercise compute flows offline should stub at a higher level.
#[derive(Debug, Default, Clone)]
pub(crate) struct MockCompute;

impl MockCompute {
    pub fn new() -> Self {
        Self::default()
    }
}

fn unsupported(op: Operation) -> Error {
    Error::new(
        ErrorKind::Unsupported,
        "target instance operations are not implemented by the mock backend",
    )
    .with_operation(op)
}

#[async_trait]
impl InstanceManager for MockCompute {
    async fn delete_target_instance(&self, _name: &str, _zone: &str) -> Result<ComputeOperation> {
        Err(unsupported(Operation::DeleteTargetInstance))
    }

    async fn get_target_instance(&self, _name: &str, _zone: &str) -> Result<TargetInstance> {
        Err(unsupported(Operation::GetTargetInstance))
    }

    async fn insert_target_instance(
        &self,
        _target: TargetInstance,
        _zone: &str,
    ) -> Result<ComputeOperation> {
        Err(unsupported(Operation::InsertTargetInstance))
    }

    async fn list_target_instances(
        &self,
        _zone: &str,
        _filter: Option<&str>,
    ) -> Result<TargetInstanceList> {
        Err(unsupported(Operation::ListTargetInstances))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn test_every_operation_is_unsupported() {
        let mock = MockCompute::new();

        let err = mock
            .delete_target_instance("edge-target", "us-central1-b")
            .await
            .expect_err("delete must be unsupported");
        assert_eq!(err.kind(), ErrorKind::Unsupported);

        let err = mock
            .get_target_instance("edge-target", "us-central1-b")
            .await
            .expect_err("get must be unsupported");
        assert_eq!(err.kind(), ErrorKind::Unsupported);

        let err = mock
            .insert_target_instance(
                TargetInstance::new("edge-target", "zones/us-central1-b/instances/vm"),
                "us-central1-b",
            )
            .await
            .expect_err("insert must be unsupported");
        assert_eq!(err.kind(), ErrorKind::Unsupported);

        let err = mock
            .list_target_instances("us-central1-b", None)
            .await
            .expect_err("list must be unsupported");
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }
}
