//! Remote collaborators for codecache.
//!
//! Ties extracted file records to the knowledge graph and the issue tracker.
//! Both are reached through [`RemoteExecutor`]; an unreachable collaborator
//! turns every call into a logged no-op.

pub mod graph;
pub mod issues;
pub mod remote;

pub use graph::{EntityAction, GraphIntegrator};
pub use issues::{
    BranchSummary, IssueDraft, IssueIntegrator, PullRequestDraft, RepoCoordinates,
    is_critical_path,
};
pub use remote::{Availability, RemoteError, RemoteExecutor, SimulatedExecutor, deliver};
