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
use std::env;

use rand::prelude::*;
use stratus::Compute;
use stratus::GoogleComputeBuilder;
use stratus::GoogleStorageBuilder;
use stratus::Storage;

/// Init a live storage handle from the environment.
///
/// - If `stratus_gcs_test` is on, build the handle from the remaining
///   `stratus_gcs_*` variables and answer it together with the bucket named
///   by `stratus_gcs_bucket`.
/// - Else answer `None`, the caller skips.
///
/// The object ACL cases need a bucket with fine-grained ACLs; a bucket with
/// uniform access refuses per-object ACL calls.
pub fn init_gcs_service() -> Option<(Storage, String)> {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = dotenvy::dotenv();

    let mut cfg = env::vars()
        .filter_map(|(k, v)| {
            k.to_lowercase()
                .strip_prefix("stratus_gcs_")
                .map(|k| (k.to_string(), v))
        })
        .collect::<HashMap<String, String>>();

    let turn_on_test = cfg.remove("test").unwrap_or_default();
    if turn_on_test != "on" && turn_on_test != "true" {
        return None;
    }

    let bucket = cfg.remove("bucket").expect("bucket must be set");
    let storage = GoogleStorageBuilder::from_map(cfg)
        .build()
        .expect("init service must succeed");

    Some((storage, bucket))
}

/// Init a live compute handle from the environment.
///
/// Gated by `stratus_gce_test` the same way as the storage side; the zone
/// comes from `stratus_gce_zone` and falls back to `us-central1-b`.
pub fn init_gce_service() -> Option<(Compute, String)> {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = dotenvy::dotenv();

    let mut cfg = env::vars()
        .filter_map(|(k, v)| {
            k.to_lowercase()
                .strip_prefix("stratus_gce_")
                .map(|k| (k.to_string(), v))
        })
        .collect::<HashMap<String, String>>();

    let turn_on_test = cfg.remove("test").unwrap_or_default();
    if turn_on_test != "on" && turn_on_test != "true" {
        return None;
    }

    let zone = cfg
        .remove("zone")
        .unwrap_or_else(|| "us-central1-b".to_string());
    let compute = GoogleComputeBuilder::from_map(cfg)
        .build()
        .expect("init service must succeed");

    Some((compute, zone))
}

pub fn gen_bytes() -> (Vec<u8>, usize) {
    let mut rng = thread_rng();

    let size = rng.gen_range(1..128 * 1024);
    let mut content = vec![0; size];
    rng.fill_bytes(&mut content);

    (content, size)
}
