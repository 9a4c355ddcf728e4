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

use anyhow::Result;
use stratus::Compute;
use stratus::ErrorKind;
use stratus::TargetInstance;

use crate::utils::init_gce_service;

/// The mock compute backend recognizes every operation and supports none.
#[tokio::test]
async fn test_mock_answers_unsupported() -> Result<()> {
    let compute = Compute::mock();

    let err = compute
        .delete_target_instance("edge-target", "us-central1-b")
        .await
        .expect_err("delete must be unsupported");
    assert_eq!(err.kind(), ErrorKind::Unsupported);

    let err = compute
        .get_target_instance("edge-target", "us-central1-b")
        .await
        .expect_err("get must be unsupported");
    assert_eq!(err.kind(), ErrorKind::Unsupported);

    let err = compute
        .insert_target_instance(
            TargetInstance::new("edge-target", "zones/us-central1-b/instances/vm"),
            "us-central1-b",
        )
        .await
        .expect_err("insert must be unsupported");
    assert_eq!(err.kind(), ErrorKind::Unsupported);

    let err = compute
        .list_target_instances("us-central1-b", None)
        .await
        .expect_err("list must be unsupported");
    assert_eq!(err.kind(), ErrorKind::Unsupported);

    Ok(())
}

/// A read-only smoke test against the live service: authentication, the
/// zone scoped URL and response parsing. Gated by `stratus_gce_test`.
#[tokio::test]
async fn test_live_list_target_instances() -> Result<()> {
    match init_gce_service() {
        Some((compute, zone)) => {
            let page = compute.list_target_instances(&zone, None).await?;
            log::debug!(
                "zone {} has {} target instances",
                zone,
                page.items.len()
            );
            Ok(())
        }
        None => {
            log::warn!("gce backend not configured, ignored");
            Ok(())
        }
    }
}
