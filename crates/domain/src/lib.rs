//! Domain documents and task payload model for the role assignment engine.

#![forbid(unsafe_code)]

mod application;
mod mapping;
mod task;

pub use application::{RoleApplication, RoleApplicationStatus};
pub use mapping::{
    GroupConstraintsMapping, RoleAssignmentPolicy, RoleGroupMapping, RoleTypeAssignmentMapping,
    SubjectRolesMapping,
};
pub use task::{AuctionCandidate, ResolutionOutcome, RoleTaskAction, SelectionCriteria};
