use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::Mutex;

use rolegrid_core::{AppError, AppResult};
use rolegrid_domain::{
    AuctionCandidate, RoleAssignmentPolicy, RoleGroupMapping, RoleTypeAssignmentMapping,
    SelectionCriteria, SubjectRolesMapping,
};

use crate::ports::{
    AssociationClient, AuctionGateway, BidOutcome, DslEvaluator, DslRunOutput, MappingQuery,
    RoleGroupRepository, RoleTypeAssignmentRepository, RoleTypeAssignmentUpdate,
    SubjectRolesRepository, SubjectSearchClient,
};

use super::RoleAssignmentService;

#[derive(Default)]
struct FakeRoleTypeRepository {
    rows: Mutex<HashMap<String, RoleTypeAssignmentMapping>>,
}

impl FakeRoleTypeRepository {
    async fn seed(&self, mapping: RoleTypeAssignmentMapping) {
        self.rows
            .lock()
            .await
            .insert(mapping.role_type.clone(), mapping);
    }

    async fn position_filled(&self, role_type: &str) -> bool {
        self.rows
            .lock()
            .await
            .get(role_type)
            .map(|mapping| mapping.position_filled)
            .unwrap_or(false)
    }
}

#[async_trait]
impl RoleTypeAssignmentRepository for FakeRoleTypeRepository {
    async fn find(&self, role_type: &str) -> AppResult<Option<RoleTypeAssignmentMapping>> {
        Ok(self.rows.lock().await.get(role_type).cloned())
    }

    async fn insert(&self, mapping: RoleTypeAssignmentMapping) -> AppResult<()> {
        self.rows
            .lock()
            .await
            .insert(mapping.role_type.clone(), mapping);
        Ok(())
    }

    async fn update(&self, role_type: &str, update: RoleTypeAssignmentUpdate) -> AppResult<()> {
        let mut rows = self.rows.lock().await;
        let mapping = rows
            .get_mut(role_type)
            .ok_or_else(|| AppError::NotFound(format!("role type '{role_type}' not found")))?;

        if let Some(policy) = update.role_assignment_type {
            mapping.role_assignment_type = policy;
        }
        if let Some(filled) = update.position_filled {
            mapping.position_filled = filled;
        }
        Ok(())
    }

    async fn delete(&self, role_type: &str) -> AppResult<()> {
        self.rows.lock().await.remove(role_type);
        Ok(())
    }

    async fn list(&self, _query: MappingQuery) -> AppResult<Vec<RoleTypeAssignmentMapping>> {
        Ok(self.rows.lock().await.values().cloned().collect())
    }

    async fn try_fill_position(&self, role_type: &str) -> AppResult<bool> {
        let mut rows = self.rows.lock().await;
        let mapping = rows
            .get_mut(role_type)
            .ok_or_else(|| AppError::NotFound(format!("role type '{role_type}' not found")))?;

        if mapping.position_filled {
            return Ok(false);
        }

        mapping.position_filled = true;
        Ok(true)
    }
}

#[derive(Default)]
struct FakeSubjectRolesRepository {
    rows: Mutex<HashMap<String, SubjectRolesMapping>>,
}

impl FakeSubjectRolesRepository {
    async fn seed(&self, mapping: SubjectRolesMapping) {
        self.rows
            .lock()
            .await
            .insert(mapping.subject_id.clone(), mapping);
    }

    async fn row(&self, subject_id: &str) -> Option<SubjectRolesMapping> {
        self.rows.lock().await.get(subject_id).cloned()
    }

    async fn row_count(&self) -> usize {
        self.rows.lock().await.len()
    }
}

#[async_trait]
impl SubjectRolesRepository for FakeSubjectRolesRepository {
    async fn find(&self, subject_id: &str) -> AppResult<Option<SubjectRolesMapping>> {
        Ok(self.rows.lock().await.get(subject_id).cloned())
    }

    async fn insert(&self, mapping: SubjectRolesMapping) -> AppResult<()> {
        self.rows
            .lock()
            .await
            .insert(mapping.subject_id.clone(), mapping);
        Ok(())
    }

    async fn update_role_ids(&self, subject_id: &str, role_ids: Vec<String>) -> AppResult<()> {
        let mut rows = self.rows.lock().await;
        let mapping = rows
            .get_mut(subject_id)
            .ok_or_else(|| AppError::NotFound(format!("subject '{subject_id}' not found")))?;
        mapping.role_ids = role_ids;
        Ok(())
    }

    async fn delete(&self, subject_id: &str) -> AppResult<()> {
        self.rows.lock().await.remove(subject_id);
        Ok(())
    }

    async fn list(&self, _query: MappingQuery) -> AppResult<Vec<SubjectRolesMapping>> {
        Ok(self.rows.lock().await.values().cloned().collect())
    }
}

#[derive(Default)]
struct FakeRoleGroupRepository {
    rows: Mutex<HashMap<String, RoleGroupMapping>>,
}

impl FakeRoleGroupRepository {
    async fn seed(&self, mapping: RoleGroupMapping) {
        self.rows
            .lock()
            .await
            .insert(mapping.role_id.clone(), mapping);
    }

    async fn row(&self, role_id: &str) -> Option<RoleGroupMapping> {
        self.rows.lock().await.get(role_id).cloned()
    }

    async fn row_count(&self) -> usize {
        self.rows.lock().await.len()
    }
}

#[async_trait]
impl RoleGroupRepository for FakeRoleGroupRepository {
    async fn find(&self, role_id: &str) -> AppResult<Option<RoleGroupMapping>> {
        Ok(self.rows.lock().await.get(role_id).cloned())
    }

    async fn insert(&self, mapping: RoleGroupMapping) -> AppResult<()> {
        self.rows
            .lock()
            .await
            .insert(mapping.role_id.clone(), mapping);
        Ok(())
    }

    async fn delete(&self, role_id: &str) -> AppResult<()> {
        self.rows.lock().await.remove(role_id);
        Ok(())
    }

    async fn list(&self, _query: MappingQuery) -> AppResult<Vec<RoleGroupMapping>> {
        Ok(self.rows.lock().await.values().cloned().collect())
    }
}

/// Approves every workflow unless an explicit output is configured.
#[derive(Default)]
struct FakeDslEvaluator {
    outputs: Mutex<HashMap<String, Value>>,
}

impl FakeDslEvaluator {
    async fn set_output(&self, workflow_id: &str, output: Value) {
        self.outputs
            .lock()
            .await
            .insert(workflow_id.to_owned(), output);
    }
}

#[async_trait]
impl DslEvaluator for FakeDslEvaluator {
    async fn execute(&self, workflow_id: &str, _input: Value) -> AppResult<DslRunOutput> {
        let output = self
            .outputs
            .lock()
            .await
            .get(workflow_id)
            .cloned()
            .unwrap_or_else(|| json!({"final_output": true}));
        Ok(DslRunOutput::new(output))
    }
}

#[derive(Default)]
struct FakeAssociationClient {
    fail: Mutex<bool>,
}

impl FakeAssociationClient {
    async fn fail_next_calls(&self) {
        *self.fail.lock().await = true;
    }
}

#[async_trait]
impl AssociationClient for FakeAssociationClient {
    async fn create_association(
        &self,
        subject_id: &str,
        _subject_data: &Value,
        _role_data: &Value,
    ) -> AppResult<Value> {
        if *self.fail.lock().await {
            return Err(AppError::External(
                "association endpoint returned status 502".to_owned(),
            ));
        }
        Ok(json!({"association_id": format!("assoc-{subject_id}")}))
    }
}

#[derive(Default)]
struct FakeSubjectSearchClient {
    subjects: Mutex<Vec<String>>,
}

impl FakeSubjectSearchClient {
    async fn set_subjects(&self, subjects: Vec<&str>) {
        *self.subjects.lock().await = subjects.into_iter().map(str::to_owned).collect();
    }
}

#[async_trait]
impl SubjectSearchClient for FakeSubjectSearchClient {
    async fn search(
        &self,
        _search_filter: &Value,
        _selection_dsl_workflow_id: &str,
    ) -> AppResult<Vec<String>> {
        Ok(self.subjects.lock().await.clone())
    }
}

struct FakeAuctionGateway {
    outcome: Mutex<BidOutcome>,
}

impl Default for FakeAuctionGateway {
    fn default() -> Self {
        Self {
            outcome: Mutex::new(BidOutcome::Rejected {
                message: "no outcome configured".to_owned(),
            }),
        }
    }
}

impl FakeAuctionGateway {
    async fn set_outcome(&self, outcome: BidOutcome) {
        *self.outcome.lock().await = outcome;
    }
}

#[async_trait]
impl AuctionGateway for FakeAuctionGateway {
    async fn submit_bid_and_wait(&self, _bid_payload: Value) -> AppResult<BidOutcome> {
        Ok(self.outcome.lock().await.clone())
    }
}

struct Harness {
    role_types: Arc<FakeRoleTypeRepository>,
    subject_roles: Arc<FakeSubjectRolesRepository>,
    role_groups: Arc<FakeRoleGroupRepository>,
    dsl: Arc<FakeDslEvaluator>,
    association: Arc<FakeAssociationClient>,
    search: Arc<FakeSubjectSearchClient>,
    auction: Arc<FakeAuctionGateway>,
    service: RoleAssignmentService,
}

fn harness() -> Harness {
    let role_types = Arc::new(FakeRoleTypeRepository::default());
    let subject_roles = Arc::new(FakeSubjectRolesRepository::default());
    let role_groups = Arc::new(FakeRoleGroupRepository::default());
    let dsl = Arc::new(FakeDslEvaluator::default());
    let association = Arc::new(FakeAssociationClient::default());
    let search = Arc::new(FakeSubjectSearchClient::default());
    let auction = Arc::new(FakeAuctionGateway::default());

    let service = RoleAssignmentService::new(
        role_types.clone(),
        subject_roles.clone(),
        role_groups.clone(),
        dsl.clone(),
        association.clone(),
        search.clone(),
        auction.clone(),
    );

    Harness {
        role_types,
        subject_roles,
        role_groups,
        dsl,
        association,
        search,
        auction,
        service,
    }
}

fn role_type_fixture(policy: RoleAssignmentPolicy) -> RoleTypeAssignmentMapping {
    RoleTypeAssignmentMapping {
        role_type: "T1".to_owned(),
        role_assignment_type: policy,
        role_post_removal_dsl_workflow_id: "wf-eval".to_owned(),
        role_post_addition_dsl_workflow_id: "wf-pqt".to_owned(),
        role_auction_creation_dsl_workflow_id: "wf-auction".to_owned(),
        position_filled: false,
        job_space_id: "js-1".to_owned(),
    }
}

fn application_data() -> Value {
    json!({"role_type": "T1", "subject_type": "agent", "group_ids": ["g1"]})
}

fn selection_criteria() -> SelectionCriteria {
    SelectionCriteria {
        filter_data: json!({"skill": "routing"}),
        selection_dsl_workflow_id: "wf-select".to_owned(),
    }
}

fn candidates() -> Vec<AuctionCandidate> {
    vec![
        AuctionCandidate {
            subject_id: "s1".to_owned(),
            subject_data: json!({"name": "Alice"}),
        },
        AuctionCandidate {
            subject_id: "s2".to_owned(),
            subject_data: json!({"name": "Bob"}),
        },
    ]
}

#[tokio::test]
async fn direct_assignment_binds_subject_and_fills_position() {
    let harness = harness();
    harness
        .role_types
        .seed(role_type_fixture(RoleAssignmentPolicy::DynamicSingleSubject))
        .await;

    let outcome = harness
        .service
        .assign_direct("app-1", &application_data(), "s1", &json!({"name": "Alice"}))
        .await;
    assert!(outcome.is_ok());

    let outcome = outcome.unwrap_or_else(|_| unreachable!());
    assert!(outcome.success);

    let role_id = outcome.role_id.unwrap_or_default();
    assert!(!role_id.is_empty());
    assert!(outcome.association.is_some());

    let subject_row = harness.subject_roles.row("s1").await;
    assert!(subject_row.is_some());
    let subject_row = subject_row.unwrap_or_else(|| unreachable!());
    assert!(subject_row.role_ids.contains(&role_id));
    assert_eq!(subject_row.subject_type, "agent");
    assert_eq!(subject_row.job_space_id, "js-1");

    let group_row = harness.role_groups.row(role_id.as_str()).await;
    assert!(group_row.is_some());
    let group_row = group_row.unwrap_or_else(|| unreachable!());
    assert_eq!(group_row.role_type, "T1");
    assert_eq!(group_row.group_ids, vec!["g1".to_owned()]);

    assert!(harness.role_types.position_filled("T1").await);
}

#[tokio::test]
async fn second_direct_assignment_is_rejected_once_filled() {
    let harness = harness();
    harness
        .role_types
        .seed(role_type_fixture(RoleAssignmentPolicy::DynamicSingleSubject))
        .await;

    let first = harness
        .service
        .assign_direct("app-1", &application_data(), "s1", &json!({}))
        .await;
    assert!(first.is_ok_and(|outcome| outcome.success));

    let second = harness
        .service
        .assign_direct("app-2", &application_data(), "s2", &json!({}))
        .await;
    assert!(second.is_ok());

    let second = second.unwrap_or_else(|_| unreachable!());
    assert!(!second.success);
    assert_eq!(second.message.as_deref(), Some("Role already filled"));

    // Single-occupancy invariant: exactly one bound role for the type.
    assert_eq!(harness.role_groups.row_count().await, 1);
    assert_eq!(harness.subject_roles.row_count().await, 1);
}

#[tokio::test]
async fn multi_subject_role_type_accepts_repeated_assignment() {
    let harness = harness();
    harness
        .role_types
        .seed(role_type_fixture(RoleAssignmentPolicy::DynamicMultiSubject))
        .await;

    let first = harness
        .service
        .assign_direct("app-1", &application_data(), "s1", &json!({}))
        .await;
    assert!(first.is_ok_and(|outcome| outcome.success));

    let second = harness
        .service
        .assign_direct("app-2", &application_data(), "s2", &json!({}))
        .await;
    assert!(second.is_ok_and(|outcome| outcome.success));

    assert_eq!(harness.role_groups.row_count().await, 2);
    assert!(!harness.role_types.position_filled("T1").await);
}

#[tokio::test]
async fn direct_assignment_rejects_fixed_policy_without_writes() {
    let harness = harness();
    harness
        .role_types
        .seed(role_type_fixture(RoleAssignmentPolicy::Fixed))
        .await;

    let outcome = harness
        .service
        .assign_direct("app-1", &application_data(), "s1", &json!({}))
        .await;
    assert!(outcome.is_ok());

    let outcome = outcome.unwrap_or_else(|_| unreachable!());
    assert!(!outcome.success);
    assert_eq!(
        outcome.message.as_deref(),
        Some("Unsupported role assignment type")
    );
    assert_eq!(harness.role_groups.row_count().await, 0);
    assert_eq!(harness.subject_roles.row_count().await, 0);
}

#[tokio::test]
async fn direct_assignment_requires_role_type_in_payload() {
    let harness = harness();

    let outcome = harness
        .service
        .assign_direct("app-1", &json!({}), "s1", &json!({}))
        .await;
    assert!(outcome.is_err());
}

#[tokio::test]
async fn direct_assignment_fails_for_unknown_role_type() {
    let harness = harness();

    let outcome = harness
        .service
        .assign_direct("app-1", &application_data(), "s1", &json!({}))
        .await;
    assert!(outcome.is_err());
}

#[tokio::test]
async fn direct_assignment_stops_at_pqt_gate() {
    let harness = harness();
    harness
        .role_types
        .seed(role_type_fixture(RoleAssignmentPolicy::DynamicSingleSubject))
        .await;
    harness
        .dsl
        .set_output("wf-pqt", json!({"final_output": false}))
        .await;

    let outcome = harness
        .service
        .assign_direct("app-1", &application_data(), "s1", &json!({}))
        .await;
    assert!(outcome.is_ok());

    let outcome = outcome.unwrap_or_else(|_| unreachable!());
    assert!(!outcome.success);
    assert_eq!(outcome.message.as_deref(), Some("PQT check failed"));
    assert_eq!(harness.role_groups.row_count().await, 0);
    assert!(!harness.role_types.position_filled("T1").await);
}

#[tokio::test]
async fn direct_assignment_stops_at_evaluation_gate() {
    let harness = harness();
    harness
        .role_types
        .seed(role_type_fixture(RoleAssignmentPolicy::DynamicSingleSubject))
        .await;
    harness
        .dsl
        .set_output("wf-eval", json!({"final_output": false}))
        .await;

    let outcome = harness
        .service
        .assign_direct("app-1", &application_data(), "s1", &json!({}))
        .await;
    assert!(outcome.is_ok());

    let outcome = outcome.unwrap_or_else(|_| unreachable!());
    assert!(!outcome.success);
    assert_eq!(
        outcome.message.as_deref(),
        Some("Application evaluation failed")
    );
    assert_eq!(harness.role_groups.row_count().await, 0);
}

#[tokio::test]
async fn association_failure_aborts_binding_before_mapping_writes() {
    let harness = harness();
    harness
        .role_types
        .seed(role_type_fixture(RoleAssignmentPolicy::DynamicSingleSubject))
        .await;
    harness.association.fail_next_calls().await;

    let outcome = harness
        .service
        .assign_direct("app-1", &application_data(), "s1", &json!({}))
        .await;
    assert!(outcome.is_ok());

    let outcome = outcome.unwrap_or_else(|_| unreachable!());
    assert!(!outcome.success);
    assert_eq!(
        outcome.message.as_deref(),
        Some("Subject association failed")
    );
    assert_eq!(harness.subject_roles.row_count().await, 0);
    assert_eq!(harness.role_groups.row_count().await, 0);
    assert!(!harness.role_types.position_filled("T1").await);
}

#[tokio::test]
async fn repeated_binding_unions_into_existing_subject_row() {
    let harness = harness();
    harness
        .role_types
        .seed(role_type_fixture(RoleAssignmentPolicy::DynamicMultiSubject))
        .await;
    harness
        .subject_roles
        .seed(SubjectRolesMapping {
            subject_id: "s1".to_owned(),
            role_ids: vec!["r-existing".to_owned()],
            subject_type: "agent".to_owned(),
            job_space_id: "js-1".to_owned(),
        })
        .await;

    let outcome = harness
        .service
        .assign_direct("app-1", &application_data(), "s1", &json!({}))
        .await;
    assert!(outcome.is_ok_and(|outcome| outcome.success));

    let row = harness.subject_roles.row("s1").await;
    assert!(row.is_some_and(|row| {
        row.role_ids.len() == 2 && row.role_ids.contains(&"r-existing".to_owned())
    }));
}

#[tokio::test]
async fn criteria_assignment_rejects_empty_candidate_list_without_writes() {
    let harness = harness();
    harness
        .role_types
        .seed(role_type_fixture(RoleAssignmentPolicy::DynamicSingleSubject))
        .await;

    let outcome = harness
        .service
        .assign_by_criteria("app-1", &application_data(), &selection_criteria())
        .await;
    assert!(outcome.is_ok());

    let outcome = outcome.unwrap_or_else(|_| unreachable!());
    assert!(!outcome.success);
    assert_eq!(
        outcome.message.as_deref(),
        Some("No eligible subjects found")
    );
    assert_eq!(harness.subject_roles.row_count().await, 0);
    assert_eq!(harness.role_groups.row_count().await, 0);
    assert!(!harness.role_types.position_filled("T1").await);
}

#[tokio::test]
async fn criteria_assignment_selects_the_first_candidate() {
    let harness = harness();
    harness
        .role_types
        .seed(role_type_fixture(RoleAssignmentPolicy::DynamicSingleSubject))
        .await;
    harness.search.set_subjects(vec!["s7", "s8", "s9"]).await;

    let outcome = harness
        .service
        .assign_by_criteria("app-1", &application_data(), &selection_criteria())
        .await;
    assert!(outcome.is_ok());

    let outcome = outcome.unwrap_or_else(|_| unreachable!());
    assert!(outcome.success);
    assert_eq!(outcome.subject_id.as_deref(), Some("s7"));
    assert!(harness.subject_roles.row("s7").await.is_some());
    assert!(harness.role_types.position_filled("T1").await);
}

#[tokio::test]
async fn criteria_assignment_requires_selection_workflow_id() {
    let harness = harness();
    harness
        .role_types
        .seed(role_type_fixture(RoleAssignmentPolicy::DynamicSingleSubject))
        .await;

    let criteria = SelectionCriteria {
        filter_data: json!({}),
        selection_dsl_workflow_id: String::new(),
    };
    let outcome = harness
        .service
        .assign_by_criteria("app-1", &application_data(), &criteria)
        .await;
    assert!(outcome.is_err());
}

#[tokio::test]
async fn auction_assignment_binds_the_winner() {
    let harness = harness();
    harness
        .role_types
        .seed(role_type_fixture(RoleAssignmentPolicy::DynamicSingleSubject))
        .await;
    harness
        .auction
        .set_outcome(BidOutcome::Resolved {
            result: json!({"winner_subject_id": "s2", "winning_bid": 11}),
        })
        .await;

    let outcome = harness
        .service
        .assign_by_auction("app-1", &application_data(), &candidates())
        .await;
    assert!(outcome.is_ok());

    let outcome = outcome.unwrap_or_else(|_| unreachable!());
    assert!(outcome.success);
    assert_eq!(outcome.subject_id.as_deref(), Some("s2"));
    assert!(harness.subject_roles.row("s2").await.is_some());
    assert!(harness.role_types.position_filled("T1").await);
}

#[tokio::test]
async fn auction_timeout_is_reported_as_failure() {
    let harness = harness();
    harness
        .role_types
        .seed(role_type_fixture(RoleAssignmentPolicy::DynamicSingleSubject))
        .await;
    harness.auction.set_outcome(BidOutcome::TimedOut).await;

    let outcome = harness
        .service
        .assign_by_auction("app-1", &application_data(), &candidates())
        .await;
    assert!(outcome.is_ok());

    let outcome = outcome.unwrap_or_else(|_| unreachable!());
    assert!(!outcome.success);
    assert_eq!(
        outcome.message.as_deref(),
        Some("Timeout waiting for bid result")
    );
    assert_eq!(harness.role_groups.row_count().await, 0);
}

#[tokio::test]
async fn auction_submission_rejection_fails_the_task() {
    let harness = harness();
    harness
        .role_types
        .seed(role_type_fixture(RoleAssignmentPolicy::DynamicSingleSubject))
        .await;
    harness
        .auction
        .set_outcome(BidOutcome::Rejected {
            message: "bid task submission failed".to_owned(),
        })
        .await;

    let outcome = harness
        .service
        .assign_by_auction("app-1", &application_data(), &candidates())
        .await;
    assert!(outcome.is_ok());

    let outcome = outcome.unwrap_or_else(|_| unreachable!());
    assert!(!outcome.success);
    assert_eq!(outcome.message.as_deref(), Some("Auction execution failed"));
}

#[tokio::test]
async fn auction_winner_outside_candidate_list_is_rejected() {
    let harness = harness();
    harness
        .role_types
        .seed(role_type_fixture(RoleAssignmentPolicy::DynamicSingleSubject))
        .await;
    harness
        .auction
        .set_outcome(BidOutcome::Resolved {
            result: json!({"winner_subject_id": "s9"}),
        })
        .await;

    let outcome = harness
        .service
        .assign_by_auction("app-1", &application_data(), &candidates())
        .await;
    assert!(outcome.is_ok());

    let outcome = outcome.unwrap_or_else(|_| unreachable!());
    assert!(!outcome.success);
    assert_eq!(
        outcome.message.as_deref(),
        Some("Winner subject not found in original list")
    );
    assert_eq!(harness.subject_roles.row_count().await, 0);
}

#[tokio::test]
async fn auction_without_bid_payload_is_rejected() {
    let harness = harness();
    harness
        .role_types
        .seed(role_type_fixture(RoleAssignmentPolicy::DynamicSingleSubject))
        .await;
    harness
        .dsl
        .set_output("wf-auction", json!({"final_output": null}))
        .await;

    let outcome = harness
        .service
        .assign_by_auction("app-1", &application_data(), &candidates())
        .await;
    assert!(outcome.is_ok());

    let outcome = outcome.unwrap_or_else(|_| unreachable!());
    assert!(!outcome.success);
    assert_eq!(
        outcome.message.as_deref(),
        Some("Auction DSL failed to generate payload")
    );
}

#[tokio::test]
async fn auction_result_without_winner_is_rejected() {
    let harness = harness();
    harness
        .role_types
        .seed(role_type_fixture(RoleAssignmentPolicy::DynamicSingleSubject))
        .await;
    harness
        .auction
        .set_outcome(BidOutcome::Resolved {
            result: json!({"round": 3}),
        })
        .await;

    let outcome = harness
        .service
        .assign_by_auction("app-1", &application_data(), &candidates())
        .await;
    assert!(outcome.is_ok());

    let outcome = outcome.unwrap_or_else(|_| unreachable!());
    assert!(!outcome.success);
    assert_eq!(
        outcome.message.as_deref(),
        Some("No winner selected in auction")
    );
}

async fn seed_bound_role(harness: &Harness, policy: RoleAssignmentPolicy) {
    let mut role_type = role_type_fixture(policy);
    role_type.position_filled = policy.is_single_subject();
    harness.role_types.seed(role_type).await;
    harness
        .role_groups
        .seed(RoleGroupMapping {
            role_id: "r1".to_owned(),
            role_type: "T1".to_owned(),
            group_ids: vec!["g1".to_owned()],
            job_space_id: "js-1".to_owned(),
        })
        .await;
    harness
        .subject_roles
        .seed(SubjectRolesMapping {
            subject_id: "s1".to_owned(),
            role_ids: vec!["r1".to_owned()],
            subject_type: "agent".to_owned(),
            job_space_id: "js-1".to_owned(),
        })
        .await;
}

#[tokio::test]
async fn removal_deletes_binding_and_empty_subject_row() {
    let harness = harness();
    seed_bound_role(&harness, RoleAssignmentPolicy::DynamicSingleSubject).await;

    let outcome = harness.service.remove_role("r1", "s1").await;
    assert!(outcome.is_ok());

    let outcome = outcome.unwrap_or_else(|_| unreachable!());
    assert!(outcome.success);
    assert!(harness.role_groups.row("r1").await.is_none());
    assert!(harness.subject_roles.row("s1").await.is_none());
}

#[tokio::test]
async fn removal_keeps_subject_row_with_remaining_roles() {
    let harness = harness();
    seed_bound_role(&harness, RoleAssignmentPolicy::DynamicSingleSubject).await;
    harness
        .subject_roles
        .seed(SubjectRolesMapping {
            subject_id: "s1".to_owned(),
            role_ids: vec!["r1".to_owned(), "r2".to_owned()],
            subject_type: "agent".to_owned(),
            job_space_id: "js-1".to_owned(),
        })
        .await;

    let outcome = harness.service.remove_role("r1", "s1").await;
    assert!(outcome.is_ok_and(|outcome| outcome.success));

    let row = harness.subject_roles.row("s1").await;
    assert!(row.is_some_and(|row| row.role_ids == vec!["r2".to_owned()]));
}

#[tokio::test]
async fn removal_does_not_reset_position_filled() {
    let harness = harness();
    seed_bound_role(&harness, RoleAssignmentPolicy::DynamicSingleSubject).await;

    let outcome = harness.service.remove_role("r1", "s1").await;
    assert!(outcome.is_ok_and(|outcome| outcome.success));

    // Deliberately preserved: vacating the role leaves the flag set.
    assert!(harness.role_types.position_filled("T1").await);
}

#[tokio::test]
async fn removal_of_fixed_role_is_rejected_without_writes() {
    let harness = harness();
    seed_bound_role(&harness, RoleAssignmentPolicy::Fixed).await;

    let outcome = harness.service.remove_role("r1", "s1").await;
    assert!(outcome.is_ok());

    let outcome = outcome.unwrap_or_else(|_| unreachable!());
    assert!(!outcome.success);
    assert_eq!(
        outcome.message.as_deref(),
        Some("Role is fixed and cannot be removed")
    );
    assert!(harness.role_groups.row("r1").await.is_some());
    assert!(
        harness
            .subject_roles
            .row("s1")
            .await
            .is_some_and(|row| row.role_ids == vec!["r1".to_owned()])
    );
}

#[tokio::test]
async fn removal_denied_by_workflow_leaves_state_intact() {
    let harness = harness();
    seed_bound_role(&harness, RoleAssignmentPolicy::DynamicSingleSubject).await;
    harness
        .dsl
        .set_output("wf-eval", json!({"final_output": false}))
        .await;

    let outcome = harness.service.remove_role("r1", "s1").await;
    assert!(outcome.is_ok());

    let outcome = outcome.unwrap_or_else(|_| unreachable!());
    assert!(!outcome.success);
    assert_eq!(outcome.message.as_deref(), Some("DSL denied role removal"));
    assert!(harness.role_groups.row("r1").await.is_some());
}

#[tokio::test]
async fn removal_of_unknown_role_is_rejected() {
    let harness = harness();

    let outcome = harness.service.remove_role("r9", "s1").await;
    assert!(outcome.is_ok());

    let outcome = outcome.unwrap_or_else(|_| unreachable!());
    assert!(!outcome.success);
    assert_eq!(outcome.message.as_deref(), Some("Role r9 not found"));
}
