use async_trait::async_trait;
use rolegrid_core::AppResult;
use serde_json::Value;

/// Raw output of one DSL workflow run.
///
/// The evaluator is an opaque oracle; the run output is the full response
/// document and `final_output` is the decision value inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DslRunOutput(Value);

impl DslRunOutput {
    /// Wraps a raw workflow run output document.
    #[must_use]
    pub fn new(output: Value) -> Self {
        Self(output)
    }

    /// Returns the run's final output value, when present.
    #[must_use]
    pub fn final_output(&self) -> Option<&Value> {
        match self.0.get("final_output") {
            Some(Value::Null) | None => None,
            Some(value) => Some(value),
        }
    }

    /// Returns the final output only when it is truthy.
    #[must_use]
    pub fn approved_output(&self) -> Option<&Value> {
        self.final_output().filter(|value| value_is_truthy(value))
    }

    /// Applies gate semantics to the final output.
    ///
    /// Absent, null, false, zero, empty string and empty containers all deny.
    #[must_use]
    pub fn is_approved(&self) -> bool {
        self.approved_output().is_some()
    }
}

fn value_is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|parsed| parsed != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(entries) => !entries.is_empty(),
    }
}

/// Executes named DSL workflows against the workflow service.
#[async_trait]
pub trait DslEvaluator: Send + Sync {
    /// Runs one workflow with a structured input.
    async fn execute(&self, workflow_id: &str, input: Value) -> AppResult<DslRunOutput>;
}

/// Binds a subject to a role in the external association system.
#[async_trait]
pub trait AssociationClient: Send + Sync {
    /// Creates one subject/role association; returns the system's response
    /// payload.
    async fn create_association(
        &self,
        subject_id: &str,
        subject_data: &Value,
        role_data: &Value,
    ) -> AppResult<Value>;
}

/// Resolves candidate subject ids for a criteria-based assignment.
#[async_trait]
pub trait SubjectSearchClient: Send + Sync {
    /// Issues one search round trip; the wait is bounded by the adapter's
    /// configured timeout.
    async fn search(
        &self,
        search_filter: &Value,
        selection_dsl_workflow_id: &str,
    ) -> AppResult<Vec<String>>;
}

/// Terminal result of one auction submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BidOutcome {
    /// A correlated result arrived on the bid event channel.
    Resolved {
        /// Decoded result body; carries the winner subject id.
        result: Value,
    },
    /// The submission was refused or the bridge failed.
    Rejected {
        /// Refusal or failure reason.
        message: String,
    },
    /// No result arrived within the configured wait.
    TimedOut,
}

/// Submits auction bids and waits for their asynchronous results.
///
/// Implementations always return a structured outcome; pub/sub failures are
/// folded into `Rejected` rather than surfaced as errors.
#[async_trait]
pub trait AuctionGateway: Send + Sync {
    /// Submits one bid payload and blocks until its result, a refusal or the
    /// configured timeout.
    async fn submit_bid_and_wait(&self, bid_payload: Value) -> AppResult<BidOutcome>;
}

#[cfg(test)]
mod tests {
    use super::DslRunOutput;
    use serde_json::json;

    #[test]
    fn approval_requires_truthy_final_output() {
        assert!(DslRunOutput::new(json!({"final_output": true})).is_approved());
        assert!(DslRunOutput::new(json!({"final_output": {"score": 1}})).is_approved());
        assert!(DslRunOutput::new(json!({"final_output": "ok"})).is_approved());
    }

    #[test]
    fn falsy_or_absent_final_output_denies() {
        assert!(!DslRunOutput::new(json!({})).is_approved());
        assert!(!DslRunOutput::new(json!({"final_output": null})).is_approved());
        assert!(!DslRunOutput::new(json!({"final_output": false})).is_approved());
        assert!(!DslRunOutput::new(json!({"final_output": 0})).is_approved());
        assert!(!DslRunOutput::new(json!({"final_output": ""})).is_approved());
        assert!(!DslRunOutput::new(json!({"final_output": {}})).is_approved());
    }

    #[test]
    fn final_output_exposes_structured_payloads() {
        let output = DslRunOutput::new(json!({"final_output": {"bid": {"amount": 3}}}));
        assert_eq!(output.final_output(), Some(&json!({"bid": {"amount": 3}})));
    }
}
