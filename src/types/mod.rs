// ABOUTME: Type-safe identifiers and validated domain types.
// ABOUTME: Project names double as path components, so they are validated up front.

mod id;
mod image_ref;
mod network_alias;
mod project_name;

pub use id::{ContainerId, NetworkId};
pub use image_ref::{ImageRef, ParseImageRefError};
pub use network_alias::{NetworkAlias, NetworkAliasError};
pub use project_name::{ProjectName, ProjectNameError};
