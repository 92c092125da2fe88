use super::error::{QueueError, QueueResult};
use super::event::QueueEvent;
use super::model::QueueState;

/// Lifecycle of the pending slot. Only a confirmed write empties it.
#[derive(Debug, Default)]
pub struct QueueMachine {
    state: QueueState,
}

impl QueueMachine {
    pub fn new(state: QueueState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> QueueState {
        self.state
    }

    pub fn next_state(&self, event: QueueEvent) -> Option<QueueState> {
        use QueueEvent::*;
        match (self.state, event) {
            (_, Enqueue) => Some(QueueState::Pending),
            (QueueState::Pending, DrainSucceeded) => Some(QueueState::Empty),
            (QueueState::Pending, DrainDeferred | DrainFailed) => Some(QueueState::Pending),
            _ => None,
        }
    }

    pub fn transition(&mut self, event: QueueEvent) -> QueueResult<QueueState> {
        let next = self.next_state(event).ok_or_else(|| {
            tracing::warn!(from = ?self.state, ?event, "invalid queue transition requested");
            QueueError::InvalidTransition {
                from: self.state,
                event,
            }
        })?;
        tracing::debug!(from = ?self.state, ?event, to = ?next, "queue transition");
        self.state = next;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_a_successful_drain_empties_the_slot() {
        let mut machine = QueueMachine::default();
        assert_eq!(machine.transition(QueueEvent::Enqueue).unwrap(), QueueState::Pending);
        assert_eq!(machine.transition(QueueEvent::DrainDeferred).unwrap(), QueueState::Pending);
        assert_eq!(machine.transition(QueueEvent::DrainFailed).unwrap(), QueueState::Pending);
        assert_eq!(machine.transition(QueueEvent::Enqueue).unwrap(), QueueState::Pending);
        assert_eq!(machine.transition(QueueEvent::DrainSucceeded).unwrap(), QueueState::Empty);
    }

    #[test]
    fn drain_events_are_rejected_on_an_empty_slot() {
        let mut machine = QueueMachine::default();
        for event in [
            QueueEvent::DrainSucceeded,
            QueueEvent::DrainDeferred,
            QueueEvent::DrainFailed,
        ] {
            assert_eq!(machine.next_state(event), None);
            let err = machine.transition(event).expect_err("empty slot cannot drain");
            assert!(matches!(
                err,
                QueueError::InvalidTransition {
                    from: QueueState::Empty,
                    ..
                }
            ));
        }
        assert_eq!(machine.state(), QueueState::Empty);
    }
}
