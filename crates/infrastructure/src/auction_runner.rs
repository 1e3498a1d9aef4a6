use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rolegrid_application::{AuctionGateway, BidOutcome};
use rolegrid_core::AppResult;
use serde_json::Value;
use tokio::sync::{Mutex, mpsc, oneshot};
use tracing::{debug, warn};
use uuid::Uuid;

/// Submits one bid payload to the auction system.
#[async_trait]
pub trait BidSubmitter: Send + Sync {
    /// Submits the payload; an error means the submission was not accepted.
    async fn submit(&self, bid_payload: &Value) -> AppResult<()>;
}

/// Waits for the next result on the organization's bid event channel.
#[async_trait]
pub trait BidEventListener: Send + Sync {
    /// Blocks until one decodable bid event arrives.
    async fn next_event(&self) -> AppResult<Value>;
}

/// Wait states of one auction bridge pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BidWaitState {
    Idle,
    Submitted,
    Listening,
    Resolved,
    TimedOut,
    Error,
}

impl BidWaitState {
    fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Submitted => "submitted",
            Self::Listening => "listening",
            Self::Resolved => "resolved",
            Self::TimedOut => "timed_out",
            Self::Error => "error",
        }
    }
}

fn advance(task_id: Uuid, from: BidWaitState, to: BidWaitState) {
    debug!(%task_id, from = from.as_str(), to = to.as_str(), "auction wait transition");
}

struct AuctionTask {
    task_id: Uuid,
    bid_payload: Value,
}

/// Bridges the asynchronous bid event channel into blocking calls.
///
/// One background worker processes auctions strictly one at a time; every
/// caller registers a one-shot result slot under its own correlation id and
/// blocks on it, so concurrent callers each receive exactly their result.
/// Every path delivers a structured outcome and every wait is bounded.
pub struct AuctionRunner {
    queue: mpsc::UnboundedSender<AuctionTask>,
    waiters: Arc<Mutex<HashMap<Uuid, oneshot::Sender<BidOutcome>>>>,
}

impl AuctionRunner {
    /// Starts the background worker over the given submitter and listener.
    #[must_use]
    pub fn spawn(
        submitter: Arc<dyn BidSubmitter>,
        listener: Arc<dyn BidEventListener>,
        result_timeout: Duration,
    ) -> Self {
        let waiters: Arc<Mutex<HashMap<Uuid, oneshot::Sender<BidOutcome>>>> =
            Arc::new(Mutex::new(HashMap::new()));
        let (queue, receiver) = mpsc::unbounded_channel();
        tokio::spawn(worker_loop(
            submitter,
            listener,
            result_timeout,
            waiters.clone(),
            receiver,
        ));

        Self { queue, waiters }
    }
}

async fn worker_loop(
    submitter: Arc<dyn BidSubmitter>,
    listener: Arc<dyn BidEventListener>,
    result_timeout: Duration,
    waiters: Arc<Mutex<HashMap<Uuid, oneshot::Sender<BidOutcome>>>>,
    mut receiver: mpsc::UnboundedReceiver<AuctionTask>,
) {
    while let Some(task) = receiver.recv().await {
        let outcome = run_auction(
            submitter.as_ref(),
            listener.as_ref(),
            result_timeout,
            task.task_id,
            task.bid_payload,
        )
        .await;

        let waiter = waiters.lock().await.remove(&task.task_id);
        match waiter {
            Some(slot) => {
                if slot.send(outcome).is_err() {
                    warn!(
                        task_id = %task.task_id,
                        "auction caller stopped waiting before the result arrived"
                    );
                }
            }
            None => {
                warn!(task_id = %task.task_id, "no waiter registered for completed auction task");
            }
        }
    }
}

async fn run_auction(
    submitter: &dyn BidSubmitter,
    listener: &dyn BidEventListener,
    result_timeout: Duration,
    task_id: Uuid,
    bid_payload: Value,
) -> BidOutcome {
    if let Err(error) = submitter.submit(&bid_payload).await {
        advance(task_id, BidWaitState::Idle, BidWaitState::Error);
        warn!(%task_id, %error, "bid submission rejected");
        return BidOutcome::Rejected {
            message: format!("Bid task submission failed: {error}"),
        };
    }
    advance(task_id, BidWaitState::Idle, BidWaitState::Submitted);

    advance(task_id, BidWaitState::Submitted, BidWaitState::Listening);
    match tokio::time::timeout(result_timeout, listener.next_event()).await {
        Ok(Ok(result)) => {
            advance(task_id, BidWaitState::Listening, BidWaitState::Resolved);
            BidOutcome::Resolved { result }
        }
        Ok(Err(error)) => {
            advance(task_id, BidWaitState::Listening, BidWaitState::Error);
            warn!(%task_id, %error, "bid event wait failed");
            BidOutcome::Rejected {
                message: format!("Bid event wait failed: {error}"),
            }
        }
        Err(_elapsed) => {
            advance(task_id, BidWaitState::Listening, BidWaitState::TimedOut);
            warn!(
                %task_id,
                timeout_seconds = result_timeout.as_secs(),
                "timed out waiting for bid result"
            );
            BidOutcome::TimedOut
        }
    }
}

#[async_trait]
impl AuctionGateway for AuctionRunner {
    async fn submit_bid_and_wait(&self, bid_payload: Value) -> AppResult<BidOutcome> {
        let task_id = Uuid::new_v4();
        let (sender, receiver) = oneshot::channel();
        self.waiters.lock().await.insert(task_id, sender);

        if self
            .queue
            .send(AuctionTask {
                task_id,
                bid_payload,
            })
            .is_err()
        {
            self.waiters.lock().await.remove(&task_id);
            return Ok(BidOutcome::Rejected {
                message: "auction worker is not running".to_owned(),
            });
        }

        // The worker bounds every task, so the slot always resolves; a
        // dropped sender means the worker died and must not hang the caller.
        match receiver.await {
            Ok(outcome) => Ok(outcome),
            Err(_closed) => Ok(BidOutcome::Rejected {
                message: "auction worker dropped the task".to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    use async_trait::async_trait;
    use rolegrid_application::{AuctionGateway, BidOutcome};
    use rolegrid_core::{AppError, AppResult};
    use serde_json::{Value, json};
    use tokio::sync::Mutex;

    use super::{AuctionRunner, BidEventListener, BidSubmitter};

    struct FakeSubmitter {
        fail: bool,
        calls: AtomicUsize,
    }

    impl FakeSubmitter {
        fn accepting() -> Self {
            Self {
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn refusing() -> Self {
            Self {
                fail: true,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl BidSubmitter for FakeSubmitter {
        async fn submit(&self, _bid_payload: &Value) -> AppResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AppError::External(
                    "bid task submission was not accepted".to_owned(),
                ));
            }
            Ok(())
        }
    }

    /// Pops queued events in order; blocks forever once drained.
    struct FakeListener {
        events: Mutex<VecDeque<Value>>,
        waits: AtomicUsize,
    }

    impl FakeListener {
        fn with_events(events: Vec<Value>) -> Self {
            Self {
                events: Mutex::new(events.into()),
                waits: AtomicUsize::new(0),
            }
        }

        fn silent() -> Self {
            Self::with_events(Vec::new())
        }
    }

    #[async_trait]
    impl BidEventListener for FakeListener {
        async fn next_event(&self) -> AppResult<Value> {
            self.waits.fetch_add(1, Ordering::SeqCst);
            let next = self.events.lock().await.pop_front();
            match next {
                Some(event) => Ok(event),
                None => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Err(AppError::External("unreachable".to_owned()))
                }
            }
        }
    }

    #[tokio::test]
    async fn resolves_with_the_delivered_bid_event() {
        let runner = AuctionRunner::spawn(
            Arc::new(FakeSubmitter::accepting()),
            Arc::new(FakeListener::with_events(vec![
                json!({"winner_subject_id": "s2"}),
            ])),
            Duration::from_secs(1),
        );

        let outcome = runner.submit_bid_and_wait(json!({"bid": 1})).await;
        assert!(outcome.is_ok());
        assert_eq!(
            outcome.unwrap_or(BidOutcome::TimedOut),
            BidOutcome::Resolved {
                result: json!({"winner_subject_id": "s2"}),
            }
        );
    }

    #[tokio::test]
    async fn wait_is_bounded_by_the_configured_timeout() {
        let runner = AuctionRunner::spawn(
            Arc::new(FakeSubmitter::accepting()),
            Arc::new(FakeListener::silent()),
            Duration::from_millis(100),
        );

        let started = Instant::now();
        let outcome = runner.submit_bid_and_wait(json!({"bid": 1})).await;
        let elapsed = started.elapsed();

        assert!(outcome.is_ok_and(|outcome| outcome == BidOutcome::TimedOut));
        assert!(elapsed < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn refused_submission_never_opens_a_subscription() {
        let listener = Arc::new(FakeListener::silent());
        let runner = AuctionRunner::spawn(
            Arc::new(FakeSubmitter::refusing()),
            listener.clone(),
            Duration::from_secs(1),
        );

        let outcome = runner.submit_bid_and_wait(json!({"bid": 1})).await;
        assert!(outcome.is_ok());

        let rejected = matches!(
            outcome.unwrap_or(BidOutcome::TimedOut),
            BidOutcome::Rejected { message } if message.contains("Bid task submission failed")
        );
        assert!(rejected);
        assert_eq!(listener.waits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn concurrent_callers_each_receive_their_own_result() {
        let runner = Arc::new(AuctionRunner::spawn(
            Arc::new(FakeSubmitter::accepting()),
            Arc::new(FakeListener::with_events(vec![
                json!({"winner_subject_id": "first"}),
                json!({"winner_subject_id": "second"}),
            ])),
            Duration::from_secs(1),
        ));

        let first_runner = runner.clone();
        let first = tokio::spawn(async move {
            first_runner.submit_bid_and_wait(json!({"bid": 1})).await
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        let second_runner = runner.clone();
        let second = tokio::spawn(async move {
            second_runner.submit_bid_and_wait(json!({"bid": 2})).await
        });

        let first = first.await;
        let second = second.await;
        assert!(first.is_ok_and(|outcome| {
            outcome.is_ok_and(|outcome| {
                outcome
                    == BidOutcome::Resolved {
                        result: json!({"winner_subject_id": "first"}),
                    }
            })
        }));
        assert!(second.is_ok_and(|outcome| {
            outcome.is_ok_and(|outcome| {
                outcome
                    == BidOutcome::Resolved {
                        result: json!({"winner_subject_id": "second"}),
                    }
            })
        }));
    }
}
