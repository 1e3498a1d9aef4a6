use serde::{Deserialize, Serialize};

/// Assignment policy governing how a role type may be filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleAssignmentPolicy {
    /// Role occupancy is provisioned out of band and never assigned here.
    Fixed,
    /// Exactly one subject may occupy the role type at a time.
    DynamicSingleSubject,
    /// Any number of subjects may occupy the role type concurrently.
    DynamicMultiSubject,
}

impl RoleAssignmentPolicy {
    /// Returns true when the engine is allowed to assign this role type.
    #[must_use]
    pub fn supports_dynamic_assignment(&self) -> bool {
        matches!(self, Self::DynamicSingleSubject | Self::DynamicMultiSubject)
    }

    /// Returns true for the single-occupancy policy.
    #[must_use]
    pub fn is_single_subject(&self) -> bool {
        matches!(self, Self::DynamicSingleSubject)
    }

    /// Returns the stable wire value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::DynamicSingleSubject => "dynamic_single_subject",
            Self::DynamicMultiSubject => "dynamic_multi_subject",
        }
    }

    /// Parses the stable wire value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "fixed" => Some(Self::Fixed),
            "dynamic_single_subject" => Some(Self::DynamicSingleSubject),
            "dynamic_multi_subject" => Some(Self::DynamicMultiSubject),
            _ => None,
        }
    }
}

/// Per-role-type assignment configuration document.
///
/// Field names are part of the wire contract. The
/// `role_post_removal_dsl_workflow_id` workflow doubles as the application
/// evaluation gate and the removal approval gate; the document shape is kept
/// compatible with existing stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleTypeAssignmentMapping {
    /// Role type key.
    pub role_type: String,
    /// Assignment policy for the role type.
    pub role_assignment_type: RoleAssignmentPolicy,
    /// Evaluation and removal-approval workflow id.
    #[serde(default)]
    pub role_post_removal_dsl_workflow_id: String,
    /// Pre-qualification (PQT) workflow id for direct assignment.
    #[serde(default)]
    pub role_post_addition_dsl_workflow_id: String,
    /// Workflow id that produces the auction bid payload.
    #[serde(default)]
    pub role_auction_creation_dsl_workflow_id: String,
    /// Single-occupancy flag for `dynamic_single_subject` role types.
    #[serde(default)]
    pub position_filled: bool,
    /// Owning job space.
    #[serde(default)]
    pub job_space_id: String,
}

/// Roles currently held by one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRolesMapping {
    /// Subject key.
    pub subject_id: String,
    /// Role ids held by the subject; set semantics, order irrelevant.
    #[serde(default)]
    pub role_ids: Vec<String>,
    /// Subject category.
    #[serde(default)]
    pub subject_type: String,
    /// Owning job space.
    #[serde(default)]
    pub job_space_id: String,
}

impl SubjectRolesMapping {
    /// Adds a role id, preserving set semantics.
    pub fn add_role(&mut self, role_id: &str) {
        if !self.role_ids.iter().any(|existing| existing == role_id) {
            self.role_ids.push(role_id.to_owned());
        }
    }

    /// Removes a role id; returns whether it was present.
    pub fn remove_role(&mut self, role_id: &str) -> bool {
        let before = self.role_ids.len();
        self.role_ids.retain(|existing| existing != role_id);
        self.role_ids.len() != before
    }

    /// Returns true once the subject holds no roles.
    #[must_use]
    pub fn holds_no_roles(&self) -> bool {
        self.role_ids.is_empty()
    }
}

/// One bound role occupancy and its group memberships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGroupMapping {
    /// Role id minted at bind time.
    pub role_id: String,
    /// Role type the occupancy belongs to.
    pub role_type: String,
    /// Groups the occupancy participates in.
    #[serde(default)]
    pub group_ids: Vec<String>,
    /// Owning job space.
    #[serde(default)]
    pub job_space_id: String,
}

/// Constraint set attached to one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupConstraintsMapping {
    /// Group key.
    pub group_id: String,
    /// Group category.
    #[serde(default)]
    pub group_type: String,
    /// Constraint ids bound to the group.
    #[serde(default)]
    pub constraint_ids: Vec<String>,
    /// Owning job space.
    #[serde(default)]
    pub job_space_id: String,
}

#[cfg(test)]
mod tests {
    use super::{RoleAssignmentPolicy, RoleTypeAssignmentMapping, SubjectRolesMapping};

    #[test]
    fn policy_serializes_with_wire_values() {
        let serialized = serde_json::to_value(RoleAssignmentPolicy::DynamicSingleSubject);
        assert!(serialized.is_ok());
        assert_eq!(
            serialized.unwrap_or_default(),
            serde_json::json!("dynamic_single_subject")
        );
    }

    #[test]
    fn role_type_mapping_defaults_optional_fields() {
        let parsed: Result<RoleTypeAssignmentMapping, _> = serde_json::from_value(
            serde_json::json!({"role_type": "T1", "role_assignment_type": "fixed"}),
        );
        assert!(parsed.is_ok());

        let mapping = parsed.unwrap_or_else(|_| unreachable!());
        assert!(!mapping.position_filled);
        assert!(mapping.role_post_removal_dsl_workflow_id.is_empty());
        assert!(mapping.role_auction_creation_dsl_workflow_id.is_empty());
    }

    #[test]
    fn add_role_is_idempotent() {
        let mut mapping = SubjectRolesMapping {
            subject_id: "s1".to_owned(),
            role_ids: vec!["r1".to_owned()],
            subject_type: String::new(),
            job_space_id: String::new(),
        };

        mapping.add_role("r1");
        mapping.add_role("r2");
        assert_eq!(mapping.role_ids, vec!["r1".to_owned(), "r2".to_owned()]);
    }

    #[test]
    fn remove_role_reports_membership() {
        let mut mapping = SubjectRolesMapping {
            subject_id: "s1".to_owned(),
            role_ids: vec!["r1".to_owned()],
            subject_type: String::new(),
            job_space_id: String::new(),
        };

        assert!(mapping.remove_role("r1"));
        assert!(!mapping.remove_role("r1"));
        assert!(mapping.holds_no_roles());
    }
}
