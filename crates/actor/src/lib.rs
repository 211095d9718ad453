//! A lightweight actor framework.
//!
//! An actor owns a piece of state and a mailbox. Messages sent through an
//! [`Actor`] handle are processed one at a time on a dedicated tokio task,
//! so message handlers get exclusive `&mut` access to the state without
//! any locking.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod error;
mod handle;
mod mailbox;
mod scheduler;

pub use error::ActorDeadError;
pub use handle::Actor;
pub use mailbox::Message;

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::oneshot;
    use tokio::time::timeout;

    use super::*;

    #[derive(Default)]
    struct CounterState {
        value: u32,
        on_drop: Option<oneshot::Sender<u32>>,
    }

    impl Drop for CounterState {
        fn drop(&mut self) {
            if let Some(tx) = self.on_drop.take() {
                tx.send(self.value).ok();
            }
        }
    }

    #[derive(Debug)]
    struct AddMessage(u32);

    impl Message<CounterState> for AddMessage {
        fn handle(
            self,
            state: &mut CounterState,
            _handle: &Actor<CounterState>,
        ) {
            state.value += self.0;
        }
    }

    #[derive(Debug)]
    struct AddTwiceMessage(u32);

    impl Message<CounterState> for AddTwiceMessage {
        fn handle(
            self,
            state: &mut CounterState,
            handle: &Actor<CounterState>,
        ) {
            state.value += self.0;
            // Messages sent from a handler are queued behind the current one.
            handle.send(AddMessage(self.0)).unwrap();
        }
    }

    #[tokio::test]
    async fn test_send_and_ask() {
        let actor = Actor::spawn(CounterState::default(), None);
        actor.send(AddMessage(40)).unwrap();
        actor.send(AddTwiceMessage(1)).unwrap();

        let value = actor.ask(|state, _| state.value).await.unwrap();
        assert_eq!(value, 41);
        let value = actor.ask(|state, _| state.value).await.unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_kill() {
        let (drop_tx, drop_rx) = oneshot::channel();
        let state = CounterState {
            value: 7,
            on_drop: Some(drop_tx),
        };
        let actor = Actor::spawn(state, Some("counter"));
        assert!(actor.is_alive());

        actor.try_kill();
        assert!(!actor.is_alive());
        assert_eq!(actor.send(AddMessage(1)), Err(ActorDeadError));
        assert!(actor.ask(|state, _| state.value).await.is_err());

        // The state is dropped once the actor task winds down.
        let value = timeout(Duration::from_millis(500), drop_rx)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(value, 7);
    }
}
