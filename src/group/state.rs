// ABOUTME: In-process record of each project's latest deployment.
// ABOUTME: Deploying moves to Active, Partial or Failed once `up` returns.

use crate::compose::UpOutcome;
use crate::types::ProjectName;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Where a project's most recent Create got to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentState {
    Deploying,
    /// Every service came up.
    Active,
    /// Some services failed; the rest are running.
    Partial,
    Failed,
}

impl DeploymentState {
    /// Terminal state for a finished `up`.
    pub fn after(outcome: &UpOutcome) -> Self {
        match (outcome.is_complete(), outcome.containers.is_empty()) {
            (true, _) => DeploymentState::Active,
            (false, false) => DeploymentState::Partial,
            (false, true) => DeploymentState::Failed,
        }
    }
}

/// Caller-visible status of a resource group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupStatus {
    Configuring,
    Active,
    Inactive,
}

impl From<DeploymentState> for GroupStatus {
    fn from(state: DeploymentState) -> Self {
        match state {
            DeploymentState::Deploying => GroupStatus::Configuring,
            DeploymentState::Active => GroupStatus::Active,
            DeploymentState::Partial | DeploymentState::Failed => GroupStatus::Inactive,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeploymentRecord {
    pub state: DeploymentState,
    pub since: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct DeploymentRegistry {
    records: RwLock<HashMap<ProjectName, DeploymentRecord>>,
}

impl DeploymentRegistry {
    pub fn set(&self, project: &ProjectName, state: DeploymentState) {
        tracing::debug!(project = %project, state = ?state, "deployment state");
        self.records.write().insert(
            project.clone(),
            DeploymentRecord {
                state,
                since: Utc::now(),
            },
        );
    }

    pub fn get(&self, project: &ProjectName) -> Option<DeploymentRecord> {
        self.records.read().get(project).copied()
    }

    pub fn forget(&self, project: &ProjectName) {
        self.records.write().remove(project);
    }
}
