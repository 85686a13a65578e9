// ABOUTME: Resource groups: the adapter's view of a deployed compose project.
// ABOUTME: Facade operations, deployment state tracking and per-project locking.

mod error;
mod facade;
mod locks;
mod state;

pub use error::{ErrorClass, GroupError, Stage};
pub use facade::{ResourceGroup, ResourceGroupFacade, WITH_PATH};
pub use locks::ProjectLocks;
pub use state::{DeploymentRecord, DeploymentRegistry, DeploymentState, GroupStatus};
