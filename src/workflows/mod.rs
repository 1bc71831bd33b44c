//! Multi-step branch workflows
//!
//! Each workflow is a linear sequence of gateway calls that stops at the
//! first failure and leaves the repository as it is for the operator.

pub mod lifecycle;
pub mod release;
pub mod sync;

pub use lifecycle::{
    create_feature_branch, create_production_release_branch, delete_feature_branch,
    delete_production_release_branch, link, new_production_release_branch_name,
    production_release_branch_name, unlink,
};
pub use release::{release_candidate, release_production_branch, ReleaseSummary};
pub use sync::{sync, FeatureSync, StashOutcome, SyncSummary};
