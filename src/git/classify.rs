//! Branch naming conventions and branch-listing parsing
//!
//! Branches carry no stored type. Their class is derived from the name every
//! time it is needed:
//!
//! - main: exactly the repository's main branch name (`main` or `master`)
//! - production release: `[<prefix>-]v<major>.<minor>.<patch>-prep`
//! - feature: everything else

use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{FlowError, Result};

static PRODUCTION_RELEASE_BRANCH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(.+)-)?v(\d+\.\d+\.\d+)-prep$").expect("static pattern is valid")
});

// `<marker>[<name>] <message>`; markers are the show-branch column flags.
static BRANCH_LIST_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ *!+-]*\[(.+?)\](?:\s+(.*))?$").expect("static pattern is valid")
});

/// A branch observed in the local repository or on a remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub name: String,
    pub last_commit_message: String,
    /// Remote name, present only for branches observed on a remote.
    pub origin: Option<String>,
}

impl Branch {
    pub fn local(name: impl Into<String>, last_commit_message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            last_commit_message: last_commit_message.into(),
            origin: None,
        }
    }

    pub fn is_remote(&self) -> bool {
        self.origin.is_some()
    }
}

/// The class a branch name falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchKind {
    Main,
    ProductionRelease,
    Feature,
}

impl fmt::Display for BranchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchKind::Main => write!(f, "main"),
            BranchKind::ProductionRelease => write!(f, "production release"),
            BranchKind::Feature => write!(f, "feature"),
        }
    }
}

/// Prefix and version recovered from a production release branch name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductionTag {
    pub prefix: Option<String>,
    pub version: String,
}

impl ProductionTag {
    /// `[<prefix>-]v<version>`
    pub fn tag_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}-v{}", self.version),
            None => format!("v{}", self.version),
        }
    }

    /// `[<prefix>-]v<version>-rc`
    pub fn release_candidate_tag_name(&self) -> String {
        format!("{}-rc", self.tag_name())
    }

    /// `[<prefix>-]v<version>-prep`
    pub fn branch_name(&self) -> String {
        format!("{}-prep", self.tag_name())
    }
}

/// Parse one line of `show-branch --list` style output.
///
/// Lines that do not carry a `[<name>]` column (separators, graph lines) are
/// skipped by returning `None`.
pub fn parse_branch_list_line(line: &str) -> Option<Branch> {
    let caps = BRANCH_LIST_LINE.captures(line.trim_end())?;
    let name = caps.get(1)?.as_str().trim();
    if name.is_empty() {
        return None;
    }
    let message = caps.get(2).map_or("", |m| m.as_str().trim());
    Some(Branch::local(name, message))
}

/// Parse a whole branch listing, keeping only well-formed lines.
pub fn parse_branch_list(output: &str) -> Vec<Branch> {
    output.lines().filter_map(parse_branch_list_line).collect()
}

pub fn is_production_release_branch_name(name: &str) -> bool {
    PRODUCTION_RELEASE_BRANCH.is_match(name)
}

pub fn is_main_branch_name(name: &str, main_branch_name: &str) -> bool {
    name == main_branch_name
}

/// Classify a branch name. Main takes precedence over production release.
pub fn classify(name: &str, main_branch_name: &str) -> BranchKind {
    if is_main_branch_name(name, main_branch_name) {
        BranchKind::Main
    } else if is_production_release_branch_name(name) {
        BranchKind::ProductionRelease
    } else {
        BranchKind::Feature
    }
}

/// Split `<remote>/<name>` on the first `/`.
pub fn remote_branch_origin_and_name(qualified_name: &str) -> Option<(&str, &str)> {
    match qualified_name.split_once('/') {
        Some((origin, name)) if !origin.is_empty() && !name.is_empty() => Some((origin, name)),
        _ => None,
    }
}

/// Recover the tag components from a production release branch name.
pub fn production_tag_from_branch_name(name: &str) -> Result<ProductionTag> {
    let caps = PRODUCTION_RELEASE_BRANCH
        .captures(name)
        .ok_or_else(|| FlowError::NotAProductionReleaseBranch(name.to_string()))?;

    Ok(ProductionTag {
        prefix: caps.get(1).map(|m| m.as_str().to_string()),
        version: caps[2].to_string(),
    })
}

/// Order production release branch names by version, then by prefix.
///
/// Names that do not match the pattern sort after those that do.
pub fn compare_production_release_names(a: &str, b: &str) -> Ordering {
    let key = |name: &str| {
        production_tag_from_branch_name(name).ok().and_then(|tag| {
            semver::Version::parse(&tag.version)
                .ok()
                .map(|version| (version, tag.prefix.unwrap_or_default()))
        })
    };

    match (key(a), key(b)) {
        (Some(ka), Some(kb)) => ka.cmp(&kb),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}
