//! AWS CloudFormation client for StackFlow
//!
//! Implements [`StackApi`](stackflow_cloud::StackApi) over the AWS SDK.
//! Signing, retries at the HTTP layer and response decoding belong to the
//! SDK; this crate maps its shapes and errors onto StackFlow's.
//!
//! # Example
//!
//! ```ignore
//! use stackflow_cloud::StackManager;
//! use stackflow_cloud_aws::{AwsConfig, CloudFormationApi};
//! use std::sync::Arc;
//!
//! let api = CloudFormationApi::connect(&AwsConfig::new("us-east-1")).await?;
//! let manager = StackManager::new(Arc::new(api));
//! manager.wait("base", Duration::from_secs(1800)).await?;
//! ```

pub mod client;
pub mod convert;
pub mod error;

pub use client::{AwsConfig, CloudFormationApi};
pub use error::{AwsError, Result};
