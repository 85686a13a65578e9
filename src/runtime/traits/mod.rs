// ABOUTME: Composable capability traits for the container engine.
// ABOUTME: Defines ContainerOps, ImageOps, NetworkOps, ExecOps, CopyOps and RuntimeInfo.

mod container;
mod copy;
mod exec;
mod image;
mod network;
mod runtime_info;
pub(crate) mod sealed;
mod shared_types;

pub use container::{ContainerError, ContainerFilters, ContainerOps, ContainerSummary};
pub use copy::{CopyError, CopyOps};
pub use exec::{ExecError, ExecOps};
pub use image::{ImageError, ImageOps};
pub use network::{NetworkError, NetworkOps};
pub use runtime_info::{RuntimeInfo, RuntimeInfoError};
pub use shared_types::*;

/// Every capability the adapter needs from an engine.
pub trait FullRuntime:
    ContainerOps + ImageOps + NetworkOps + ExecOps + CopyOps + RuntimeInfo
{
}

impl<T> FullRuntime for T where
    T: ContainerOps + ImageOps + NetworkOps + ExecOps + CopyOps + RuntimeInfo
{
}
