use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use stenbot_core::dialogue::{Choice, DialogueEngine, Event, MessageIntent, StepOutcome};
use stenbot_core::errors::ApplicationError;
use stenbot_core::session::{ConversationId, Session};

use crate::events::InboundEvent;
use crate::outbound::OutboundSender;

/// Seam between the bridge and the dialogue engine. Workers call this
/// synchronously; implementations must not block.
pub trait DialogueStep: Send + Sync + 'static {
    fn step(&self, session: &mut Session, event: &Event) -> StepOutcome;
}

impl DialogueStep for DialogueEngine {
    fn step(&self, session: &mut Session, event: &Event) -> StepOutcome {
        DialogueEngine::step(self, session, event)
    }
}

const BUSY_NOTICE: &str =
    "I'm still working through your previous messages. Please wait a moment and send that again.";

#[derive(Clone, Debug)]
pub struct DispatchTuning {
    pub queue_capacity: usize,
    pub idle_timeout: Duration,
    pub admin_conversation_id: Option<i64>,
}

impl Default for DispatchTuning {
    fn default() -> Self {
        Self {
            queue_capacity: 16,
            idle_timeout: Duration::from_secs(30 * 60),
            admin_conversation_id: None,
        }
    }
}

struct WorkerHandle {
    worker_id: u64,
    tx: mpsc::Sender<Event>,
}

struct BridgeInner {
    engine: Box<dyn DialogueStep>,
    sender: Arc<dyn OutboundSender>,
    tuning: DispatchTuning,
    workers: Mutex<HashMap<ConversationId, WorkerHandle>>,
    next_worker_id: AtomicU64,
}

/// Routes inbound events to one worker task per conversation. Events for
/// the same conversation are processed strictly in arrival order; distinct
/// conversations never block each other.
#[derive(Clone)]
pub struct DispatchBridge {
    inner: Arc<BridgeInner>,
}

impl DispatchBridge {
    pub fn new(
        engine: impl DialogueStep,
        sender: Arc<dyn OutboundSender>,
        tuning: DispatchTuning,
    ) -> Self {
        Self {
            inner: Arc::new(BridgeInner {
                engine: Box::new(engine),
                sender,
                tuning,
                workers: Mutex::new(HashMap::new()),
                next_worker_id: AtomicU64::new(0),
            }),
        }
    }

    /// Hand one decoded event to its conversation worker. Never fails:
    /// a full queue drops the event with a notice, a retired worker is
    /// respawned, and delivery failures are absorbed by the worker.
    pub async fn dispatch(&self, inbound: InboundEvent) {
        if let Some(callback_query_id) = &inbound.callback_query_id {
            if let Err(error) = self.inner.sender.acknowledge_callback(callback_query_id).await {
                warn!(
                    event_name = "ingress.telegram.callback_ack_failed",
                    conversation_id = %inbound.conversation_id,
                    error = %error,
                    "failed to acknowledge callback query"
                );
            }
        }

        let conversation_id = inbound.conversation_id;
        let mut event = inbound.event;
        loop {
            let tx = self.worker_sender(conversation_id).await;
            match tx.try_send(event) {
                Ok(()) => return,
                Err(mpsc::error::TrySendError::Full(dropped)) => {
                    warn!(
                        event_name = "dispatch.queue_full",
                        conversation_id = %conversation_id,
                        capacity = self.inner.tuning.queue_capacity,
                        dropped_event = ?dropped,
                        "conversation queue is full; dropping event"
                    );
                    if let Err(error) = self
                        .inner
                        .sender
                        .send_message(conversation_id, &MessageIntent::text(BUSY_NOTICE))
                        .await
                    {
                        warn!(
                            event_name = "dispatch.busy_notice_failed",
                            conversation_id = %conversation_id,
                            error = %error,
                            "failed to deliver busy notice"
                        );
                    }
                    return;
                }
                Err(mpsc::error::TrySendError::Closed(returned)) => {
                    // The worker retired between lookup and send. Drop the
                    // stale handle and spawn a fresh one on the next pass.
                    let mut workers = self.inner.workers.lock().await;
                    if workers
                        .get(&conversation_id)
                        .is_some_and(|handle| handle.tx.is_closed())
                    {
                        workers.remove(&conversation_id);
                    }
                    event = returned;
                }
            }
        }
    }

    /// Number of live conversation workers, reported by the health endpoint.
    pub async fn active_workers(&self) -> usize {
        self.inner.workers.lock().await.len()
    }

    async fn worker_sender(&self, conversation_id: ConversationId) -> mpsc::Sender<Event> {
        let mut workers = self.inner.workers.lock().await;
        if let Some(handle) = workers.get(&conversation_id) {
            if !handle.tx.is_closed() {
                return handle.tx.clone();
            }
            workers.remove(&conversation_id);
        }

        let (tx, rx) = mpsc::channel(self.inner.tuning.queue_capacity);
        let worker_id = self.inner.next_worker_id.fetch_add(1, Ordering::Relaxed);
        workers.insert(conversation_id, WorkerHandle { worker_id, tx: tx.clone() });
        info!(
            event_name = "dispatch.worker_spawned",
            conversation_id = %conversation_id,
            worker_id,
            "spawned conversation worker"
        );
        tokio::spawn(run_worker(Arc::clone(&self.inner), conversation_id, worker_id, rx));
        tx
    }
}

async fn run_worker(
    inner: Arc<BridgeInner>,
    conversation_id: ConversationId,
    worker_id: u64,
    mut rx: mpsc::Receiver<Event>,
) {
    let mut session = Session::new(conversation_id);

    loop {
        let event = match timeout(inner.tuning.idle_timeout, rx.recv()).await {
            Ok(Some(event)) => event,
            // Bridge dropped; nothing left to serve.
            Ok(None) => break,
            Err(_elapsed) => {
                info!(
                    event_name = "dispatch.worker_idle_retired",
                    conversation_id = %conversation_id,
                    worker_id,
                    "retiring idle conversation worker"
                );
                // An event may have been buffered between the timeout firing
                // and this point. Close the channel so late senders respawn,
                // then keep serving until the buffer is empty.
                rx.close();
                continue;
            }
        };

        // A restart invalidates everything the user queued behind it.
        if event == Event::Choice(Choice::StartOver) {
            let mut drained = 0_usize;
            while rx.try_recv().is_ok() {
                drained += 1;
            }
            if drained > 0 {
                debug!(
                    event_name = "dispatch.queue_drained",
                    conversation_id = %conversation_id,
                    drained,
                    "discarded queued events on restart"
                );
            }
        }

        let step = catch_unwind(AssertUnwindSafe(|| inner.engine.step(&mut session, &event)));
        let outcome = match step {
            Ok(outcome) => outcome,
            Err(panic) => {
                let fault = ApplicationError::WorkerFault(panic_message(panic.as_ref()));
                warn!(
                    event_name = "dispatch.worker_panic",
                    conversation_id = %conversation_id,
                    worker_id,
                    error = %fault,
                    "dialogue step panicked; resetting session"
                );
                session = Session::new(conversation_id);
                if let Err(error) = inner
                    .sender
                    .send_message(conversation_id, &MessageIntent::text(fault.user_message()))
                    .await
                {
                    warn!(
                        event_name = "dispatch.panic_notice_failed",
                        conversation_id = %conversation_id,
                        error = %error,
                        "failed to deliver recovery notice"
                    );
                }
                continue;
            }
        };

        for intent in &outcome.replies {
            if let Err(error) = inner.sender.send_message(conversation_id, intent).await {
                warn!(
                    event_name = "dispatch.reply_failed",
                    conversation_id = %conversation_id,
                    error = %ApplicationError::Transport(error.to_string()),
                    "failed to deliver reply"
                );
                session.last_send_failure = Some(error.to_string());
            }
        }

        if let Some(forward) = &outcome.admin_forward {
            forward_to_admin(&inner, conversation_id, forward).await;
        }
    }

    let mut workers = inner.workers.lock().await;
    // Only remove our own registration; a replacement may already be live.
    if workers.get(&conversation_id).is_some_and(|handle| handle.worker_id == worker_id) {
        workers.remove(&conversation_id);
    }
}

async fn forward_to_admin(
    inner: &BridgeInner,
    conversation_id: ConversationId,
    forward: &MessageIntent,
) {
    let Some(admin_id) = inner.tuning.admin_conversation_id else {
        warn!(
            event_name = "dispatch.admin_forward_dropped",
            conversation_id = %conversation_id,
            "no admin conversation configured; quote forward dropped"
        );
        return;
    };
    if let Err(error) = inner.sender.send_message(ConversationId(admin_id), forward).await {
        warn!(
            event_name = "dispatch.admin_forward_failed",
            conversation_id = %conversation_id,
            admin_conversation_id = admin_id,
            error = %error,
            "failed to forward quote to admin"
        );
    } else {
        info!(
            event_name = "dispatch.admin_forward_sent",
            conversation_id = %conversation_id,
            admin_conversation_id = admin_id,
            "forwarded quote to admin"
        );
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
