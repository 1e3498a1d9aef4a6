//! Application services and ports for the role assignment engine.

#![forbid(unsafe_code)]

mod ports;
mod role_assignment_service;
mod task_executor;

pub use ports::{
    AssociationClient, AuctionGateway, BidOutcome, DslEvaluator, DslRunOutput,
    GroupConstraintsRepository, MappingQuery, RoleApplicationQuery, RoleApplicationRepository,
    RoleGroupRepository, RoleTypeAssignmentRepository, RoleTypeAssignmentUpdate,
    SubjectRolesRepository, SubjectSearchClient,
};
pub use role_assignment_service::RoleAssignmentService;
pub use task_executor::{RoleTaskExecutor, resolve_role_task};
