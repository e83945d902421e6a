// Simulated delivery receipts
//
// Every locally sent message gets two timers started at send time: one that
// marks it delivered and one that marks it read. Timers never touch the store
// themselves; they post a DeliveryUpdate to the event loop, which applies it.

use log::{debug, warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};

use crate::models::{ConversationId, DeliveryState, MessageId};

/// Capacity of the channel between timer tasks and the event loop
const UPDATE_CHANNEL_CAPACITY: usize = 100;

/// A delivery state change that is due to be applied to the store
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryUpdate {
    pub conversation_id: ConversationId,
    pub message_id: MessageId,
    pub state: DeliveryState,
}

/// Delays for the simulated receipts, both measured from message creation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeliveryTimings {
    pub delivered_after: Duration,
    pub read_after: Duration,
}

impl Default for DeliveryTimings {
    fn default() -> Self {
        Self {
            delivered_after: Duration::from_millis(1000),
            read_after: Duration::from_millis(2000),
        }
    }
}

impl DeliveryTimings {
    pub fn from_millis(delivered_after: u64, read_after: u64) -> Self {
        Self {
            delivered_after: Duration::from_millis(delivered_after),
            read_after: Duration::from_millis(read_after),
        }
    }
}

pub struct DeliverySimulator {
    timings: DeliveryTimings,
    update_tx: mpsc::Sender<DeliveryUpdate>,
    tasks: Vec<JoinHandle<()>>,
}

impl DeliverySimulator {
    /// Creates a simulator and the receiver the event loop should drain.
    pub fn new(timings: DeliveryTimings) -> (Self, mpsc::Receiver<DeliveryUpdate>) {
        if timings.read_after < timings.delivered_after {
            warn!(
                "Read receipt delay ({:?}) is shorter than delivery delay ({:?}); \
                 messages will skip straight to read",
                timings.read_after,
                timings.delivered_after
            );
        }

        let (update_tx, update_rx) = mpsc::channel(UPDATE_CHANNEL_CAPACITY);
        let simulator = DeliverySimulator {
            timings,
            update_tx,
            tasks: Vec::new(),
        };
        (simulator, update_rx)
    }

    /// Schedules the delivered and read transitions for a freshly sent message.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&mut self, conversation_id: &str, message_id: &str) {
        self.tasks.retain(|task| !task.is_finished());

        let steps = [
            (self.timings.delivered_after, DeliveryState::Delivered),
            (self.timings.read_after, DeliveryState::Read),
        ];

        for (delay, state) in steps {
            let update = DeliveryUpdate {
                conversation_id: conversation_id.to_string(),
                message_id: message_id.to_string(),
                state,
            };
            let update_tx = self.update_tx.clone();

            self.tasks.push(tokio::spawn(async move {
                sleep(delay).await;
                debug!("Receipt timer fired: {} -> {:?}", update.message_id, update.state);
                if let Err(e) = update_tx.send(update).await {
                    // Event loop is gone, nothing left to update
                    debug!("Dropping receipt for {}: {}", e.0.message_id, e);
                }
            }));
        }
    }

    /// Number of timer tasks that have not fired yet.
    pub fn pending(&self) -> usize {
        self.tasks.iter().filter(|task| !task.is_finished()).count()
    }

    /// Aborts every outstanding timer.
    pub fn cancel_all(&mut self) {
        let outstanding = self.pending();
        for task in self.tasks.drain(..) {
            task.abort();
        }
        if outstanding > 0 {
            debug!("Cancelled {} pending receipt timers", outstanding);
        }
    }
}

impl Drop for DeliverySimulator {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timings() {
        let timings = DeliveryTimings::default();
        assert_eq!(timings.delivered_after, Duration::from_millis(1000));
        assert_eq!(timings.read_after, Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_updates_arrive_in_delay_order() {
        let (mut simulator, mut rx) = DeliverySimulator::new(DeliveryTimings::default());
        simulator.schedule("1", "msg");
        assert_eq!(simulator.pending(), 2);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.state, DeliveryState::Delivered);
        assert_eq!(first.conversation_id, "1");
        assert_eq!(first.message_id, "msg");

        let second = rx.recv().await.unwrap();
        assert_eq!(second.state, DeliveryState::Read);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all_stops_timers() {
        let (mut simulator, mut rx) = DeliverySimulator::new(DeliveryTimings::default());
        simulator.schedule("1", "msg");
        simulator.cancel_all();
        assert_eq!(simulator.pending(), 0);

        // Every sender clone lived in an aborted task, only the simulator's own remains
        drop(simulator);
        assert!(rx.recv().await.is_none());
    }
}
