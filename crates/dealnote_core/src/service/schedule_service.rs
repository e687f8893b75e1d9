//! Schedule rendering use-case service.
//!
//! # Responsibility
//! - Order a project's deliverables chronologically with an explicit
//!   undated group.
//! - Reconstruct dependency labels from the loaded row set.
//!
//! # Invariants
//! - Undated rows never participate in date comparison; they trail the
//!   dated rows under a `No date` marker.
//! - A dependency pointing outside the loaded set renders `Unknown`
//!   instead of failing.
//! - An unknown or empty project yields an empty result, never an error.

use crate::model::deliverable::{Deliverable, DeliverableId};
use crate::repo::deliverable_repo::{DeliverableRepository, RepoResult};
use log::info;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Marker rendered for rows without a due date.
pub const NO_DATE_LABEL: &str = "No date";
/// Sentinel rendered when a dependency row is not in the loaded set.
pub const UNKNOWN_DEPENDENCY_LABEL: &str = "Unknown";

/// One row of the all-projects tabular view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRow {
    pub project_name: String,
    pub due_date: Option<String>,
    pub description: String,
    /// Dependency label resolved by description, when a link exists.
    pub depends_on: Option<String>,
}

impl ScheduleRow {
    /// Whether this row participates in date-based charting.
    pub fn is_charted(&self) -> bool {
        self.due_date.is_some()
    }
}

/// Tabular result of the all-projects view, grouped by project name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleTable {
    pub rows: Vec<ScheduleRow>,
}

impl ScheduleTable {
    /// Rows eligible for date-based charting. Undated rows stay in the
    /// tabular listing but are excluded here.
    pub fn charted_rows(&self) -> Vec<&ScheduleRow> {
        self.rows.iter().filter(|row| row.is_charted()).collect()
    }
}

/// Schedule view facade over a deliverable repository.
pub struct ScheduleService<R: DeliverableRepository> {
    repo: R,
}

impl<R: DeliverableRepository> ScheduleService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Renders one project's schedule as ordered human-readable lines.
    ///
    /// Dated rows come first, ascending by due date; undated rows follow
    /// in insertion order under the `No date` marker.
    pub fn view_project(&self, project_name: &str) -> RepoResult<Vec<String>> {
        let deliverables = self.load_ordered(project_name)?;
        let labels = description_lookup(&deliverables);

        let lines = deliverables
            .iter()
            .map(|row| render_line(row, &labels))
            .collect::<Vec<_>>();

        info!(
            "event=schedule_view module=service status=ok project={project_name} rows={}",
            lines.len()
        );
        Ok(lines)
    }

    /// Loads every deliverable across projects as tabular rows grouped by
    /// project and ordered with the per-project schedule policy.
    pub fn view_all_projects(&self) -> RepoResult<ScheduleTable> {
        let mut table = ScheduleTable::default();

        for project_name in self.repo.list_distinct_projects()? {
            let deliverables = self.load_ordered(&project_name)?;
            let labels = description_lookup(&deliverables);

            for row in &deliverables {
                table.rows.push(ScheduleRow {
                    project_name: project_name.clone(),
                    due_date: row.due_date.clone(),
                    description: row.description.clone(),
                    depends_on: row
                        .depends_on_id
                        .map(|id| dependency_label(id, &labels).to_string()),
                });
            }
        }

        info!(
            "event=schedule_view_all module=service status=ok rows={}",
            table.rows.len()
        );
        Ok(table)
    }

    fn load_ordered(&self, project_name: &str) -> RepoResult<Vec<Deliverable>> {
        let mut deliverables = self.repo.list_by_project(project_name)?;
        deliverables.sort_by(compare_for_schedule);
        Ok(deliverables)
    }
}

/// Schedule ordering: dated rows ascending by due date (ISO 8601 strings
/// compare lexicographically), undated rows after, id as the tie-break.
fn compare_for_schedule(a: &Deliverable, b: &Deliverable) -> Ordering {
    match (&a.due_date, &b.due_date) {
        (Some(left), Some(right)) => left.cmp(right).then(a.id.cmp(&b.id)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.id.cmp(&b.id),
    }
}

fn description_lookup(deliverables: &[Deliverable]) -> HashMap<DeliverableId, &str> {
    deliverables
        .iter()
        .map(|row| (row.id, row.description.as_str()))
        .collect()
}

fn dependency_label<'a>(
    id: DeliverableId,
    labels: &HashMap<DeliverableId, &'a str>,
) -> &'a str {
    labels.get(&id).copied().unwrap_or(UNKNOWN_DEPENDENCY_LABEL)
}

fn render_line(row: &Deliverable, labels: &HashMap<DeliverableId, &str>) -> String {
    let date_label = row.due_date.as_deref().unwrap_or(NO_DATE_LABEL);
    match row.depends_on_id {
        Some(dep_id) => format!(
            "{date_label}: {}  <- depends on: {}",
            row.description,
            dependency_label(dep_id, labels)
        ),
        None => format!("{date_label}: {}", row.description),
    }
}
