// ABOUTME: Compose project handling: storage, spec rewriting, and lifecycle.
// ABOUTME: Implements compose up/down natively on the container engine.

mod convert;
mod document;
mod error;
pub mod labels;
pub mod logging;
mod manager;
mod restart_policy;
mod spec;
mod store;

pub use convert::{ServicePlan, container_name, plan_service};
pub use document::ComposeDocument;
pub use error::{ComposeError, StoreError};
pub use logging::apply_default_logging;
pub use manager::{ComposeManager, ServiceFailure, UpOutcome};
pub use restart_policy::RestartPolicy;
pub use spec::ComposeSpec;
pub use store::{PACKAGES_DIR, ProjectStore, SPEC_FILE};
