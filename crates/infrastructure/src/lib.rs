//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod auction_runner;
mod http_association_client;
mod http_bid_submitter;
mod http_dsl_evaluator;
mod http_subject_search_client;
mod in_memory_role_store;
mod postgres_role_store;
mod redis_bid_event_listener;

pub use auction_runner::{AuctionRunner, BidEventListener, BidSubmitter};
pub use http_association_client::HttpAssociationClient;
pub use http_bid_submitter::HttpBidSubmitter;
pub use http_dsl_evaluator::HttpDslEvaluator;
pub use http_subject_search_client::HttpSubjectSearchClient;
pub use in_memory_role_store::InMemoryRoleStore;
pub use postgres_role_store::PostgresRoleStore;
pub use redis_bid_event_listener::RedisBidEventListener;
