//! Ports implemented by infrastructure adapters.

mod clients;
mod repository;

pub use clients::{
    AssociationClient, AuctionGateway, BidOutcome, DslEvaluator, DslRunOutput, SubjectSearchClient,
};
pub use repository::{
    GroupConstraintsRepository, MappingQuery, RoleApplicationQuery, RoleApplicationRepository,
    RoleGroupRepository, RoleTypeAssignmentRepository, RoleTypeAssignmentUpdate,
    SubjectRolesRepository,
};
