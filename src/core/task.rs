//! Collaborator interfaces of the orchestrator
//!
//! The orchestrator never compiles or renders anything itself. It drives
//! these seams, which the CLI backs with external processes and tests back
//! with recording fakes.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Serialize;

use crate::core::selector::AppSelector;
use crate::core::workspace::ApplicationDescriptor;
use crate::error::BuildError;

/// Resolves an application selector to its descriptor
pub trait ConfigResolver: Send + Sync {
    /// Resolve `selector`, or the default application when absent
    fn resolve(&self, selector: Option<&AppSelector>) -> Result<ApplicationDescriptor, BuildError>;
}

/// An opaque asynchronous operation
///
/// Build tasks implement `Task<BuildOptions>`, render tasks
/// `Task<RenderRequest>`. Failures carry an arbitrary cause; the
/// orchestrator reports them without interpreting them.
#[async_trait]
pub trait Task<I>: Send + Sync
where
    I: Send + 'static,
{
    /// Value produced on success
    type Output: Send;

    /// Run the task to completion
    async fn run(&self, input: I) -> anyhow::Result<Self::Output>;
}

/// Inputs of the app shell render step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderRequest {
    /// Index document written by the client build
    pub input_index_path: PathBuf,
    /// Route to pre-render
    pub route: String,
    /// Output directory of the server build
    pub server_out_dir: PathBuf,
    /// Where the rendered document is written
    pub output_index_path: PathBuf,
}
