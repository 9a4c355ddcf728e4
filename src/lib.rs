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

//! Stratus is a typed async client for Google Cloud: object storage through
//! [`Storage`] and target instance management through [`Compute`].
//!
//! Both handles sit in front of a swappable backend. The live backends talk
//! to the Google JSON APIs; the mock backends let the same calling code run
//! offline, which is where tests usually live.
//!
//! # Quick Start
//!
//! ```no_run
//! use stratus::Result;
//! use stratus::Storage;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Pick a backend and configure it.
//!     let storage = Storage::google()
//!         .project("example")
//!         .credential_path("/path/to/credentials.json")
//!         .build()?;
//!
//!     // Upload
//!     storage
//!         .put_object("fixtures", "hello.txt", "Hello, World!")
//!         .await?;
//!
//!     // Download
//!     let object = storage.get_object("fixtures", "hello.txt").await?;
//!     assert_eq!(object.body, "Hello, World!");
//!
//!     // Delete
//!     storage.delete_object("fixtures", "hello.txt").await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! Swap in the mock and the same code runs without credentials or network:
//!
//! ```
//! # use stratus::Result;
//! # use stratus::Storage;
//! # async fn example() -> Result<()> {
//! let storage = Storage::mock();
//!
//! storage
//!     .put_object("fixtures", "hello.txt", "Hello, World!")
//!     .await?;
//! let object = storage.get_object("fixtures", "hello.txt").await?;
//! assert_eq!(object.body, "Hello, World!");
//! # Ok(())
//! # }
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]
// Deny unused qualifications.
#![deny(unused_qualifications)]

// Private module with public types, they will be accessed via `stratus::Xxxx`
mod types;
pub use types::*;

mod storage;
pub use storage::GoogleStorageBuilder;
pub use storage::GoogleStorageConfig;
pub use storage::ObjectStore;
pub use storage::Storage;

mod compute;
pub use compute::Compute;
pub use compute::GoogleComputeBuilder;
pub use compute::GoogleComputeConfig;
pub use compute::InstanceManager;

// Public modules, they will be accessed like `stratus::raw::Xxxx`
pub mod raw;
