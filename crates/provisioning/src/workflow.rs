//! Branch policies for each supported workflow type.
//!
//! A policy lists the branches the workflow cares about, which of them are
//! protected ("stable"), and which branch becomes the repository default.

use serde::Serialize;

use crate::{Configuration, WorkflowType};

/// Protection settings for a single branch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BranchPolicy {
    pub name: &'static str,
    /// Stable branches get branch protection.
    pub stable: bool,
    /// The branch releases are cut from.
    pub releasable: bool,
    /// Branch prefixes allowed to open pull requests against this branch.
    pub accept_pr_from: &'static [&'static str],
    pub enforce_admins: bool,
    pub strict_status_checks: bool,
    pub required_status_checks: Vec<String>,
}

/// Every branch rule for one workflow type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowPolicy {
    pub workflow_type: WorkflowType,
    pub default_branch: &'static str,
    pub branches: Vec<BranchPolicy>,
}

impl WorkflowPolicy {
    /// Build the policy for `cfg.workflow_type` with `cfg`'s status checks.
    pub fn for_configuration(cfg: &Configuration) -> Self {
        match cfg.workflow_type {
            WorkflowType::Gitflow => gitflow(&cfg.required_status_checks),
        }
    }

    pub fn stable_branches(&self) -> impl Iterator<Item = &BranchPolicy> {
        self.branches.iter().filter(|b| b.stable)
    }

    /// The branch releases are cut from; new branches are created off it.
    pub fn releasable_branch(&self) -> Option<&BranchPolicy> {
        self.branches.iter().find(|b| b.releasable)
    }
}

fn gitflow(checks: &[String]) -> WorkflowPolicy {
    WorkflowPolicy {
        workflow_type: WorkflowType::Gitflow,
        default_branch: "develop",
        branches: vec![
            BranchPolicy {
                name: "master",
                stable: true,
                releasable: true,
                accept_pr_from: &["release", "hotfix"],
                enforce_admins: true,
                strict_status_checks: true,
                required_status_checks: checks.to_vec(),
            },
            BranchPolicy {
                name: "develop",
                stable: true,
                releasable: false,
                accept_pr_from: &["feature", "fix", "enhancement", "bugfix"],
                enforce_admins: true,
                strict_status_checks: true,
                required_status_checks: checks.to_vec(),
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg_with_checks(checks: &[&str]) -> Configuration {
        let mut cfg = Configuration::new("repo-a", WorkflowType::Gitflow);
        cfg.required_status_checks = checks.iter().map(|c| c.to_string()).collect();
        cfg
    }

    #[test]
    fn gitflow_protects_master_and_develop() {
        let policy = WorkflowPolicy::for_configuration(&cfg_with_checks(&["ci"]));

        let stable: Vec<&str> = policy.stable_branches().map(|b| b.name).collect();
        assert_eq!(stable, vec!["master", "develop"]);
        assert_eq!(policy.default_branch, "develop");
        assert_eq!(policy.releasable_branch().map(|b| b.name), Some("master"));
    }

    #[test]
    fn status_checks_are_copied_onto_every_stable_branch() {
        let policy = WorkflowPolicy::for_configuration(&cfg_with_checks(&["ci", "coverage"]));

        for branch in policy.stable_branches() {
            assert_eq!(branch.required_status_checks, vec!["ci", "coverage"]);
            assert!(branch.strict_status_checks);
        }
    }

    #[test]
    fn gitflow_pull_request_sources() {
        let policy = WorkflowPolicy::for_configuration(&cfg_with_checks(&[]));
        let sources: Vec<(&str, &[&str])> =
            policy.branches.iter().map(|b| (b.name, b.accept_pr_from)).collect();
        assert_eq!(
            sources,
            vec![
                ("master", &["release", "hotfix"][..]),
                ("develop", &["feature", "fix", "enhancement", "bugfix"][..]),
            ]
        );
    }
}
