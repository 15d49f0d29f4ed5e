//! StackFlow Cloud
//!
//! Lifecycle management for infrastructure stacks provisioned by a remote
//! control plane: encode create/update/delete requests into the control
//! plane's flattened wire format, then poll the stack until the operation
//! settles, collecting resource failures when it does not succeed.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  stack CLI                       │
//! │          (stack create/update/wait)              │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               stackflow-cloud                    │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │  StackManager                             │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐ ┌──────────┐ ┌────────────┐  │
//! │  │ParameterEnc. │ │ Tracker  │ │  Failures  │  │
//! │  └──────────────┘ └──────────┘ └────────────┘  │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │  trait StackApi { ... }                   │   │
//! │  └──────────────────────────────────────────┘   │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//!           ┌───────▼────────┐
//!           │ cloudformation │
//!           │    (aws sdk)   │
//!           └────────────────┘
//! ```

pub mod error;
pub mod failures;
pub mod inventory;
pub mod manager;
pub mod params;
pub mod provider;
pub mod stack;
pub mod status;
pub mod tracker;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-exports
pub use error::{FailuresError, Result, StackError};
pub use failures::list_failures;
pub use manager::StackManager;
pub use params::{ParameterSet, StackAction, WireRequest};
pub use provider::{StackApi, SubmitResponse};
pub use stack::{
    StackDescription, StackEvent, StackIdentity, StackParameter, StackResource, StackSummary,
    StackTag,
};
pub use status::{StackStatus, StatusClass};
pub use tracker::{LifecycleTracker, TrackerConfig, TrackerState};
