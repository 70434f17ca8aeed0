use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::RetentionPolicy;
use crate::registry::RegistryClient;
use crate::retention::{filter_excluded, format_age, is_expired};

/// What happened to a single tag during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagOutcome {
    Deleted,
    Kept,
    /// Creation time could not be resolved; the tag is left alone
    Unresolved,
}

/// Counters accumulated over one run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub repositories: usize,
    pub tags: usize,
    pub deleted: usize,
    pub kept: usize,
    pub unresolved: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: TagOutcome) {
        self.tags += 1;
        match outcome {
            TagOutcome::Deleted => self.deleted += 1,
            TagOutcome::Kept => self.kept += 1,
            TagOutcome::Unresolved => self.unresolved += 1,
        }
    }
}

pub struct Cleaner {
    client: RegistryClient,
    policy: RetentionPolicy,
}

impl Cleaner {
    pub fn new(client: RegistryClient, policy: RetentionPolicy) -> Self {
        Self { client, policy }
    }

    /// Repository catalog with the exclusion list already applied
    pub async fn catalog(&self) -> Result<Vec<String>> {
        let repositories = self
            .client
            .list_repositories()
            .await
            .context("Failed to fetch catalog")?;

        let total = repositories.len();
        let repositories = filter_excluded(repositories, &self.policy.exclusions);
        debug!(
            "Catalog has {} repositories, {} after exclusions",
            total,
            repositories.len()
        );
        Ok(repositories)
    }

    pub async fn run(&self) -> Result<RunSummary> {
        self.run_with_clock(Utc::now).await
    }

    /// Sweep every non-excluded repository, measuring tag ages against `now()`.
    ///
    /// Catalog, tag list and deletion failures abort the run. A tag whose
    /// creation time cannot be resolved is logged and skipped.
    pub async fn run_with_clock(&self, now: impl Fn() -> DateTime<Utc>) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        for repo in self.catalog().await? {
            info!(repository = %repo, "Processing repository");
            summary.repositories += 1;

            let tags = self
                .client
                .list_tags(&repo)
                .await
                .with_context(|| format!("Failed to list tags for {}", repo))?;

            for tag in &tags {
                let outcome = self.process_tag(&repo, tag, now()).await?;
                summary.record(outcome);
            }
        }

        Ok(summary)
    }

    async fn process_tag(&self, repo: &str, tag: &str, now: DateTime<Utc>) -> Result<TagOutcome> {
        info!(repository = %repo, tag = %tag, "Checking tag");

        let descriptor = match self.client.resolve_tag(repo, tag).await {
            Ok(descriptor) => descriptor,
            Err(e) => {
                warn!(repository = %repo, tag = %tag, error = %e, "Could not resolve creation time, skipping");
                return Ok(TagOutcome::Unresolved);
            }
        };

        let age = now.signed_duration_since(descriptor.created);
        if !is_expired(descriptor.created, now, self.policy.ttl) {
            debug!(repository = %repo, tag = %tag, age = %format_age(age), "Keeping tag");
            return Ok(TagOutcome::Kept);
        }

        info!(
            repository = %descriptor.repository,
            tag = %descriptor.tag,
            digest = %descriptor.digest,
            age = %format_age(age),
            "Deleting expired tag"
        );
        self.client
            .delete_manifest(repo, &descriptor.digest)
            .await
            .with_context(|| {
                format!(
                    "Failed to delete {}:{} (digest {})",
                    repo, tag, descriptor.digest
                )
            })?;

        Ok(TagOutcome::Deleted)
    }
}
