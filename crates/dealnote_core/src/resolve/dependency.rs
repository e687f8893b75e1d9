//! Free-text dependency resolution against the deliverable store.
//!
//! # Responsibility
//! - Match a dependency description to an existing deliverable by
//!   case-sensitive containment, scoped to one project.
//! - Drive the placeholder auto-creation branch through the injected
//!   `DecisionProvider`.
//! - Guard accepted links with a bounded walk over the dependency chain.
//!
//! # Invariants
//! - Zero matches is a user-decision branch, never an error.
//! - Ambiguous matches resolve to the earliest-inserted row without
//!   signaling (`TieBreak::EarliestMatch`).
//! - This module is the only writer of placeholder deliverables.

use crate::model::deliverable::{DeliverableId, NewDeliverable};
use crate::repo::deliverable_repo::{DeliverableRepository, RepoResult};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};

/// Upper bound for the dependency-chain walk. Chains deeper than this are
/// rejected the same way as detected cycles.
const MAX_CHAIN_DEPTH: usize = 32;

/// Capability for the blocking yes/no decision on missing dependencies.
///
/// The CLI supplies an interactive terminal implementation; batch and test
/// contexts substitute [`AlwaysApprove`] or [`AlwaysDecline`].
pub trait DecisionProvider {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Policy that accepts every placeholder creation prompt.
pub struct AlwaysApprove;

impl DecisionProvider for AlwaysApprove {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Policy that declines every placeholder creation prompt.
pub struct AlwaysDecline;

impl DecisionProvider for AlwaysDecline {
    fn confirm(&self, _prompt: &str) -> bool {
        false
    }
}

/// Tie-break policy for ambiguous description matches.
///
/// `EarliestMatch` is the only implemented policy: the oldest row wins and
/// no ambiguity warning is raised. The enum exists so interactive
/// disambiguation can be added without changing resolver call sites.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TieBreak {
    #[default]
    EarliestMatch,
}

/// Non-fatal conditions surfaced to the caller alongside the resolved link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionWarning {
    /// No row matched the description. `created` carries the placeholder id
    /// when the decision provider accepted auto-creation.
    MissingDependency {
        description: String,
        created: Option<DeliverableId>,
    },
    /// The candidate's dependency chain cycles or exceeds the depth bound;
    /// the link was dropped instead of persisted.
    CycleRejected {
        description: String,
        candidate: DeliverableId,
    },
}

impl Display for ResolutionWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingDependency {
                description,
                created: Some(id),
            } => write!(f, "created missing dependency '{description}' with id {id}"),
            Self::MissingDependency {
                description,
                created: None,
            } => write!(f, "missing dependency: '{description}' (left unlinked)"),
            Self::CycleRejected {
                description,
                candidate,
            } => write!(
                f,
                "dependency '{description}' (id {candidate}) sits on a cyclic chain; link dropped"
            ),
        }
    }
}

/// Outcome of one resolution call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Resolved link to store on the new deliverable, when any.
    pub depends_on_id: Option<DeliverableId>,
    /// Placeholder row created during this call, when any.
    pub created_placeholder: Option<DeliverableId>,
    /// Non-fatal conditions for the caller to surface.
    pub warnings: Vec<ResolutionWarning>,
}

impl Resolution {
    fn unlinked() -> Self {
        Self {
            depends_on_id: None,
            created_placeholder: None,
            warnings: Vec::new(),
        }
    }
}

/// Resolves dependency descriptions against one project's deliverables.
pub struct DependencyResolver<'a, R: DeliverableRepository, D: DecisionProvider> {
    repo: &'a R,
    decisions: &'a D,
    tie_break: TieBreak,
}

impl<'a, R: DeliverableRepository, D: DecisionProvider> DependencyResolver<'a, R, D> {
    pub fn new(repo: &'a R, decisions: &'a D) -> Self {
        Self {
            repo,
            decisions,
            tie_break: TieBreak::default(),
        }
    }

    /// Resolves a free-text dependency description to a `depends_on_id`.
    ///
    /// # Contract
    /// - `None` or blank description resolves to no link without touching
    ///   the store.
    /// - Zero matches asks the decision provider whether to create a
    ///   placeholder scoped to `project_name`.
    /// - One or more matches resolves per [`TieBreak`]; the accepted
    ///   candidate's chain is walked before the link is handed back.
    ///
    /// # Errors
    /// Only storage failures propagate. Missing or rejected dependencies
    /// degrade to an unlinked resolution with warnings.
    pub fn resolve(
        &self,
        project_name: &str,
        depends_on_desc: Option<&str>,
    ) -> RepoResult<Resolution> {
        let Some(needle) = depends_on_desc.map(str::trim).filter(|d| !d.is_empty()) else {
            return Ok(Resolution::unlinked());
        };

        let matches = self.repo.find_by_description(project_name, needle)?;
        if matches.is_empty() {
            return self.handle_missing(project_name, needle);
        }

        let candidate = match self.tie_break {
            TieBreak::EarliestMatch => &matches[0],
        };
        debug!(
            "event=dependency_resolved module=resolve status=ok project={project_name} \
             candidate={} match_count={}",
            candidate.id,
            matches.len()
        );

        if self.chain_is_acyclic(candidate.id)? {
            Ok(Resolution {
                depends_on_id: Some(candidate.id),
                created_placeholder: None,
                warnings: Vec::new(),
            })
        } else {
            warn!(
                "event=dependency_cycle module=resolve status=rejected project={project_name} \
                 candidate={}",
                candidate.id
            );
            Ok(Resolution {
                depends_on_id: None,
                created_placeholder: None,
                warnings: vec![ResolutionWarning::CycleRejected {
                    description: needle.to_string(),
                    candidate: candidate.id,
                }],
            })
        }
    }

    fn handle_missing(&self, project_name: &str, needle: &str) -> RepoResult<Resolution> {
        warn!(
            "event=dependency_missing module=resolve status=prompt project={project_name} \
             description={needle:?}"
        );

        let prompt =
            format!("Would you like to create the missing dependency '{needle}' for '{project_name}'?");
        if !self.decisions.confirm(&prompt) {
            return Ok(Resolution {
                depends_on_id: None,
                created_placeholder: None,
                warnings: vec![ResolutionWarning::MissingDependency {
                    description: needle.to_string(),
                    created: None,
                }],
            });
        }

        let placeholder = NewDeliverable::placeholder(project_name, needle);
        let id = self.repo.insert(&placeholder)?;
        info!(
            "event=dependency_created module=resolve status=ok project={project_name} id={id}"
        );

        Ok(Resolution {
            depends_on_id: Some(id),
            created_placeholder: Some(id),
            warnings: vec![ResolutionWarning::MissingDependency {
                description: needle.to_string(),
                created: Some(id),
            }],
        })
    }

    /// Walks the `depends_on_id` chain from `start`, bounded by
    /// [`MAX_CHAIN_DEPTH`]. Returns `false` when a row repeats or the bound
    /// is exceeded. A dangling reference ends the walk; weak references do
    /// not owe their target a lifetime.
    fn chain_is_acyclic(&self, start: DeliverableId) -> RepoResult<bool> {
        let mut seen = HashSet::from([start]);
        let mut current = start;

        for _ in 0..MAX_CHAIN_DEPTH {
            let Some(row) = self.repo.get(current)? else {
                return Ok(true);
            };
            let Some(next) = row.depends_on_id else {
                return Ok(true);
            };
            if !seen.insert(next) {
                return Ok(false);
            }
            current = next;
        }

        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::ResolutionWarning;

    #[test]
    fn warning_display_names_the_outcome() {
        let declined = ResolutionWarning::MissingDependency {
            description: "Draft NDA".to_string(),
            created: None,
        };
        assert!(declined.to_string().contains("left unlinked"));

        let created = ResolutionWarning::MissingDependency {
            description: "Draft NDA".to_string(),
            created: Some(7),
        };
        assert!(created.to_string().contains("id 7"));

        let cycle = ResolutionWarning::CycleRejected {
            description: "Sign NDA".to_string(),
            candidate: 3,
        };
        assert!(cycle.to_string().contains("cyclic"));
    }
}
