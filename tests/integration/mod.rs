//! Integration tests for branchwise workflows
//!
//! These tests drive the git gateway and the workflows against real
//! temporary repositories (and a bare repository acting as the remote).

pub mod gateway;
pub mod sync;
