//! AWS client error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AwsError {
    #[error("AWS region is required")]
    MissingRegion,

    #[error("Invalid AWS profile name: {0:?}")]
    InvalidProfile(String),
}

pub type Result<T> = std::result::Result<T, AwsError>;
