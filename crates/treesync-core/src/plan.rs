//! Reconciliation plans handed to an execution engine
//!
//! A plan is an ordered list of work units with explicit dependency edges.
//! Copies carry no dependencies. When anything must be deleted, a single
//! delete step closes the plan and depends on every copy, so an engine that
//! honors the edges can never run a deletion ahead of the copies it guards.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use treesync_fs::{FileEntry, NormalizedPath};

use crate::{AncestorMetadata, Error, Result};

/// Position of a unit inside its plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(usize);

impl UnitId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One file that must be transferred from the source tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyIntent {
    pub source_entry: FileEntry,
    pub destination_path: NormalizedPath,
    #[serde(default, skip_serializing_if = "AncestorMetadata::is_empty")]
    pub ancestor_metadata: AncestorMetadata,
}

/// One file that must be removed from the target tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteIntent {
    pub target_entry: FileEntry,
    /// A copy in the same plan overwrites this file, so committing the
    /// delete step leaves it in place
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub replaced_by_copy: bool,
}

impl DeleteIntent {
    pub fn new(target_entry: FileEntry) -> Self {
        Self {
            target_entry,
            replaced_by_copy: false,
        }
    }

    /// Mark the file as overwritten by a copy of the same plan.
    pub fn replaced(mut self) -> Self {
        self.replaced_by_copy = true;
        self
    }
}

/// Every deletion of a plan, applied as one unit after the copies commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteStep {
    pub entries: Vec<DeleteIntent>,
    pub prune_empty_directories: bool,
    /// Root of the target tree; pruning never climbs past it
    pub target_root: NormalizedPath,
}

impl DeleteStep {
    pub fn new(entries: Vec<DeleteIntent>, prune_empty_directories: bool, target_root: NormalizedPath) -> Self {
        Self {
            entries,
            prune_empty_directories,
            target_root,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &NormalizedPath> {
        self.entries.iter().map(|intent| &intent.target_entry.absolute_path)
    }

    /// Paths that committing the step actually removes.
    pub fn removed_paths(&self) -> impl Iterator<Item = &NormalizedPath> {
        self.entries
            .iter()
            .filter(|intent| !intent.replaced_by_copy)
            .map(|intent| &intent.target_entry.absolute_path)
    }
}

/// A unit of work for the execution engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkUnit {
    Copy(CopyIntent),
    DeleteStep(DeleteStep),
}

/// A work unit with its position and the units it must wait for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedUnit {
    pub id: UnitId,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<UnitId>,
    pub unit: WorkUnit,
}

/// The ordered outcome of one reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PlanRecord")]
pub struct ReconciliationPlan {
    /// Grouping key for the engine; the dataset root as a string
    tag: String,
    units: Vec<PlannedUnit>,
}

#[derive(Deserialize)]
struct PlanRecord {
    tag: String,
    units: Vec<PlannedUnit>,
}

impl ReconciliationPlan {
    /// Lay out copies first, then the delete step depending on all of them.
    ///
    /// An empty delete step is dropped.
    pub fn new(tag: impl Into<String>, copies: Vec<CopyIntent>, delete_step: Option<DeleteStep>) -> Self {
        let mut units: Vec<PlannedUnit> = copies
            .into_iter()
            .enumerate()
            .map(|(index, intent)| PlannedUnit {
                id: UnitId(index),
                depends_on: Vec::new(),
                unit: WorkUnit::Copy(intent),
            })
            .collect();

        if let Some(step) = delete_step.filter(|step| !step.is_empty()) {
            let depends_on = units.iter().map(|planned| planned.id).collect();
            units.push(PlannedUnit {
                id: UnitId(units.len()),
                depends_on,
                unit: WorkUnit::DeleteStep(step),
            });
        }

        Self {
            tag: tag.into(),
            units,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn units(&self) -> &[PlannedUnit] {
        &self.units
    }

    pub fn unit(&self, id: UnitId) -> Option<&PlannedUnit> {
        self.units.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn copy_intents(&self) -> impl Iterator<Item = &CopyIntent> {
        self.units.iter().filter_map(|planned| match &planned.unit {
            WorkUnit::Copy(intent) => Some(intent),
            WorkUnit::DeleteStep(_) => None,
        })
    }

    pub fn copy_count(&self) -> usize {
        self.copy_intents().count()
    }

    /// Bytes the engine will transfer.
    pub fn total_copy_bytes(&self) -> u64 {
        self.copy_intents().map(|intent| intent.source_entry.size_bytes).sum()
    }

    pub fn delete_step(&self) -> Option<&DeleteStep> {
        self.delete_unit().and_then(|planned| match &planned.unit {
            WorkUnit::DeleteStep(step) => Some(step),
            WorkUnit::Copy(_) => None,
        })
    }

    /// The planned unit wrapping the delete step, with its dependency edges.
    pub fn delete_unit(&self) -> Option<&PlannedUnit> {
        self.units
            .last()
            .filter(|planned| matches!(planned.unit, WorkUnit::DeleteStep(_)))
    }

    /// Units grouped into layers; every unit's dependencies sit in earlier
    /// layers, so an engine may run each layer in parallel behind a barrier.
    pub fn stages(&self) -> Vec<Vec<&PlannedUnit>> {
        let mut levels: Vec<usize> = Vec::with_capacity(self.units.len());
        let mut stages: Vec<Vec<&PlannedUnit>> = Vec::new();

        for planned in &self.units {
            let level = planned
                .depends_on
                .iter()
                .map(|dep| levels[dep.0] + 1)
                .max()
                .unwrap_or(0);
            levels.push(level);
            if stages.len() <= level {
                stages.resize_with(level + 1, Vec::new);
            }
            stages[level].push(planned);
        }

        stages
    }
}

impl TryFrom<PlanRecord> for ReconciliationPlan {
    type Error = Error;

    fn try_from(record: PlanRecord) -> Result<Self> {
        validate(&record.units)?;
        Ok(Self {
            tag: record.tag,
            units: record.units,
        })
    }
}

fn validate(units: &[PlannedUnit]) -> Result<()> {
    let invalid = |message: String| Err(Error::InvalidPlan { message });

    let mut copies = BTreeSet::new();
    let mut destinations = BTreeSet::new();
    for (index, planned) in units.iter().enumerate() {
        if planned.id.0 != index {
            return invalid(format!("unit at position {} has id {}", index, planned.id));
        }
        if let Some(dep) = planned.depends_on.iter().find(|dep| dep.0 >= index) {
            return invalid(format!("unit {} depends on later unit {}", planned.id, dep));
        }

        match &planned.unit {
            WorkUnit::Copy(intent) => {
                copies.insert(planned.id);
                destinations.insert(&intent.destination_path);
            }
            WorkUnit::DeleteStep(step) => {
                if index + 1 != units.len() {
                    return invalid(format!("delete step {} is not the last unit", planned.id));
                }
                if step.is_empty() {
                    return invalid("delete step has no entries".to_string());
                }
                let deps: BTreeSet<UnitId> = planned.depends_on.iter().copied().collect();
                if deps != copies {
                    return invalid(format!(
                        "delete step {} must depend on all {} copy units",
                        planned.id,
                        copies.len()
                    ));
                }
                if let Some(orphan) = step
                    .entries
                    .iter()
                    .find(|entry| entry.replaced_by_copy && !destinations.contains(&entry.target_entry.absolute_path))
                {
                    return invalid(format!(
                        "{} is marked replaced but no copy writes it",
                        orphan.target_entry.absolute_path
                    ));
                }
            }
        }
    }

    Ok(())
}
