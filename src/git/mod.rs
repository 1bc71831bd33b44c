//! Git layer for the branching workflow
//!
//! This module provides:
//! - Branch classification by naming convention (main / production release / feature)
//! - The repository gateway that wraps every git invocation
//! - The normal / local operating mode
//! - The command runner abstraction the gateway executes through

pub mod classify;
pub mod mode;
pub mod repository;
pub mod runner;

pub use classify::{
    classify, is_main_branch_name, is_production_release_branch_name, parse_branch_list,
    parse_branch_list_line, production_tag_from_branch_name, remote_branch_origin_and_name,
    Branch, BranchKind, ProductionTag,
};
pub use mode::GitMode;
pub use repository::{discover_root, GitRepository, DEFAULT_REMOTE};
pub use runner::{check_git_available, render_command, CommandOutput, CommandRunner, SystemGit};
