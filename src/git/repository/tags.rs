//! Production and release candidate tags

use tracing::{debug, info};

use super::GitRepository;
use crate::error::{FlowError, Result};
use crate::git::classify::{production_tag_from_branch_name, ProductionTag};
use crate::git::runner::CommandRunner;

impl<R: CommandRunner> GitRepository<R> {
    pub fn tags(&self) -> Result<Vec<String>> {
        let stdout = self.git(&["tag", "--list"])?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }

    pub fn has_tag(&self, name: &str) -> Result<bool> {
        Ok(self.tags()?.iter().any(|t| t == name))
    }

    fn current_production_tag(&self) -> Result<ProductionTag> {
        production_tag_from_branch_name(&self.current_branch()?)
    }

    fn create_annotated_tag(&self, name: &str, message: &str) -> Result<()> {
        if self.has_tag(name)? {
            return Err(FlowError::TagAlreadyExists(name.to_string()));
        }
        self.git(&["tag", "-a", name, "-m", message])?;
        info!(tag = name, "tag created");
        Ok(())
    }

    /// Tag HEAD as `[<prefix>-]v<version>`, derived from the checked-out
    /// production release branch. Returns the tag name.
    pub fn create_production_tag(&self, message: Option<&str>) -> Result<String> {
        let name = self.current_production_tag()?.tag_name();
        let message = message.map_or_else(|| format!("Release {name}"), String::from);
        self.create_annotated_tag(&name, &message)?;
        Ok(name)
    }

    /// Tag HEAD as `[<prefix>-]v<version>-rc`, for releases routed through CI.
    pub fn create_release_candidate_tag(&self, message: Option<&str>) -> Result<String> {
        let name = self.current_production_tag()?.release_candidate_tag_name();
        let message = message.map_or_else(|| format!("Release candidate {name}"), String::from);
        self.create_annotated_tag(&name, &message)?;
        Ok(name)
    }

    pub fn delete_tag(&self, name: &str) -> Result<()> {
        self.delete_tags(&[name])
    }

    /// Delete tags locally, then on the remote where they exist there.
    pub fn delete_tags(&self, names: &[&str]) -> Result<()> {
        if names.is_empty() {
            return Ok(());
        }

        let mut args = vec!["tag", "-d"];
        args.extend_from_slice(names);
        self.git(&args)?;

        if !self.remote_enabled()? {
            return Ok(());
        }

        let remote_tags = self.remote_tags()?;
        let refspecs: Vec<String> = names
            .iter()
            .filter(|name| remote_tags.iter().any(|t| t.as_str() == **name))
            .map(|name| format!(":refs/tags/{name}"))
            .collect();
        if refspecs.is_empty() {
            debug!("no tags to delete on remote");
            return Ok(());
        }

        let mut args = vec!["push", self.remote.as_str()];
        args.extend(refspecs.iter().map(String::as_str));
        self.git(&args)?;
        Ok(())
    }

    fn remote_tags(&self) -> Result<Vec<String>> {
        let stdout = self.git(&["ls-remote", "--tags", "--refs", &self.remote])?;
        Ok(stdout
            .lines()
            .filter_map(|line| line.split('\t').nth(1))
            .filter_map(|r| r.strip_prefix("refs/tags/"))
            .map(String::from)
            .collect())
    }
}
