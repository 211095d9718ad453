use std::fmt::{self, Debug};
use std::time::Instant;

use storybeat_actor::{Actor, Message};
use storybeat_model::{ImageResult, ModelRequest};

use super::{EngineEvent, EngineState, Snapshot, Stage};
use crate::conversation::{MessageId, Sender};
use crate::error::{EngineError, ProviderError};
use crate::model_client::ModelClientResponse;
use crate::prompt;

/// The narrative request currently in flight.
pub struct InFlightNarrative {
    id: u64,
    // The user text of this turn, or `None` for the opening beat.
    user_text: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IllustrationStage {
    #[default]
    Idle,
    Keywords {
        turn: u64,
    },
    Image {
        turn: u64,
    },
}

impl EngineState {
    pub(super) fn start(&mut self, handle: &Actor<Self>) {
        if !self.transcript.is_empty() || self.narrative.is_some() {
            debug!("the story has already started, ignoring start");
            return;
        }
        self.started_at.get_or_insert_with(Instant::now);

        let request = ModelRequest::with_prompt(prompt::opening(&self.theme));
        self.begin_narrative(None, request, handle);
    }

    pub(super) fn submit(
        &mut self,
        text: String,
        handle: &Actor<Self>,
    ) -> Result<MessageId, EngineError> {
        if text.trim().is_empty() {
            return Err(EngineError::EmptyInput);
        }
        if self.narrative.is_some() {
            return Err(EngineError::Busy);
        }
        if self.transcript.is_empty() {
            return Err(EngineError::NotStarted);
        }

        let id = self.transcript.push(Sender::User, text.clone());
        let request = ModelRequest::with_prompt(prompt::continuation(
            self.transcript.messages(),
        ));
        self.begin_narrative(Some(text), request, handle);
        Ok(id)
    }

    fn begin_narrative(
        &mut self,
        user_text: Option<String>,
        request: ModelRequest,
        handle: &Actor<Self>,
    ) {
        let request_id = self.next_request_id;
        self.next_request_id += 1;
        debug!("requesting narrative #{request_id}");

        self.narrative = Some(InFlightNarrative {
            id: request_id,
            user_text,
        });
        self.streaming = Some(String::new());
        self.publish();

        let model_client = self.model_client.clone();
        let handle_clone = handle.clone();
        self.spawn_task(
            |_| async move {
                let delta_handle = handle_clone.clone();
                let result = model_client
                    .send_request(request, move |delta| {
                        delta_handle
                            .send(NarrativeDeltaMessage { request_id, delta })
                            .ok();
                    })
                    .await;
                handle_clone
                    .send(NarrativeFinishedMessage { request_id, result })
                    .ok();
            },
            handle,
        );
    }

    fn begin_illustration(
        &mut self,
        user_text: &str,
        assistant_text: &str,
        handle: &Actor<Self>,
    ) {
        let turn = self.turn;
        self.illustration = IllustrationStage::Keywords { turn };

        let request = ModelRequest::with_prompt(prompt::keywords(
            user_text,
            assistant_text,
        ));
        let model_client = self.model_client.clone();
        let handle_clone = handle.clone();
        self.spawn_task(
            |_| async move {
                let result = model_client.send_request(request, |_| {}).await;
                handle_clone.send(KeywordsFinishedMessage { turn, result }).ok();
            },
            handle,
        );
    }

    fn search_illustration(
        &mut self,
        turn: u64,
        query: String,
        handle: &Actor<Self>,
    ) {
        self.illustration = IllustrationStage::Image { turn };

        let image_client = self.image_client.clone();
        let handle_clone = handle.clone();
        self.spawn_task(
            |_| async move {
                let result = image_client.search(&query).await;
                handle_clone
                    .send(IllustrationFinishedMessage { turn, result })
                    .ok();
            },
            handle,
        );
    }

    fn stage(&self) -> Stage {
        if self.narrative.is_some() {
            return Stage::AwaitingNarrative;
        }
        match self.illustration {
            IllustrationStage::Idle => Stage::Idle,
            IllustrationStage::Keywords { .. } => {
                Stage::AwaitingIllustrationKeywords
            }
            IllustrationStage::Image { .. } => Stage::AwaitingIllustration,
        }
    }

    fn publish(&self) {
        let snapshot = Snapshot {
            transcript: self.transcript.messages().to_vec(),
            pending: self.narrative.is_some(),
            illustration_url: self.illustration_url.clone(),
            stage: self.stage(),
            streaming: self.streaming.clone(),
            theme: self.theme.clone(),
            started_at: self.started_at,
        };
        self.snapshot_tx.send_replace(snapshot);
    }

    fn emit(&self, event: EngineEvent) {
        if let Some(on_event) = &self.on_event {
            on_event(event);
        }
    }

    fn spawn_task<F, Fut>(&mut self, f: F, handle: &Actor<Self>)
    where
        F: FnOnce(u64) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let task_id = self.next_task_id;
        self.next_task_id += 1;

        let handle = handle.clone();
        let fut = f(task_id);
        let task = tokio::spawn(async move {
            fut.await;
            handle.send(TaskEndedMessage(task_id)).ok();
        });
        self.running_tasks.insert(task_id, task);
    }
}

impl Drop for EngineState {
    fn drop(&mut self) {
        for (_, task) in self.running_tasks.drain() {
            task.abort();
        }
    }
}

struct NarrativeDeltaMessage {
    request_id: u64,
    delta: String,
}

impl Debug for NarrativeDeltaMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NarrativeDeltaMessage")
            .field("request_id", &self.request_id)
            .field("len", &self.delta.len())
            .finish()
    }
}

impl Message<EngineState> for NarrativeDeltaMessage {
    fn handle(self, state: &mut EngineState, _handle: &Actor<EngineState>) {
        let is_current = state
            .narrative
            .as_ref()
            .is_some_and(|n| n.id == self.request_id);
        if !is_current {
            return;
        }
        if let Some(on_delta) = &state.on_delta {
            on_delta(&self.delta);
        }
        state
            .streaming
            .get_or_insert_default()
            .push_str(&self.delta);
        state.publish();
    }
}

#[derive(Debug)]
struct NarrativeFinishedMessage {
    request_id: u64,
    result: Result<ModelClientResponse, ProviderError>,
}

impl Message<EngineState> for NarrativeFinishedMessage {
    fn handle(self, state: &mut EngineState, handle: &Actor<EngineState>) {
        let Some(narrative) =
            state.narrative.take_if(|n| n.id == self.request_id)
        else {
            warn!("discarding narrative #{} of no request", self.request_id);
            return;
        };
        state.streaming = None;

        let text = self
            .result
            .map(|resp| resp.text.trim().to_owned())
            .and_then(|text| {
                if text.is_empty() {
                    Err(ProviderError::new("the narrative reply is empty"))
                } else {
                    Ok(text)
                }
            });
        let text = match text {
            Ok(text) => text,
            Err(err) => {
                warn!("narrative #{} failed: {err}", self.request_id);
                state.publish();
                state.emit(EngineEvent::NarrativeFailed(err));
                return;
            }
        };

        let id = state.transcript.push(Sender::Assistant, text.clone());
        state.turn += 1;
        debug!("turn {} completed as {id}", state.turn);

        let user_text = narrative.user_text.as_deref();
        let user_text = user_text.unwrap_or(prompt::OPENING_CONTEXT);
        state.begin_illustration(user_text, &text, handle);
        state.publish();
        state.emit(EngineEvent::TurnCompleted(id));
    }
}

#[derive(Debug)]
struct KeywordsFinishedMessage {
    turn: u64,
    result: Result<ModelClientResponse, ProviderError>,
}

impl Message<EngineState> for KeywordsFinishedMessage {
    fn handle(self, state: &mut EngineState, handle: &Actor<EngineState>) {
        if self.turn != state.turn {
            debug!("dropping keywords of superseded turn {}", self.turn);
            return;
        }

        let query = match self.result {
            Ok(resp) => resp.text.trim().to_owned(),
            Err(err) => {
                debug!("keyword extraction failed: {err}");
                String::new()
            }
        };
        if query.is_empty() {
            state.illustration = Default::default();
        } else {
            trace!("searching illustration for {query:?}");
            state.search_illustration(self.turn, query, handle);
        }
        state.publish();
    }
}

#[derive(Debug)]
struct IllustrationFinishedMessage {
    turn: u64,
    result: Result<Vec<ImageResult>, ProviderError>,
}

impl Message<EngineState> for IllustrationFinishedMessage {
    fn handle(self, state: &mut EngineState, _handle: &Actor<EngineState>) {
        if self.turn != state.turn {
            debug!("dropping illustration of superseded turn {}", self.turn);
            return;
        }
        state.illustration = Default::default();

        let first = match self.result {
            Ok(results) => results.into_iter().next(),
            Err(err) => {
                warn!("illustration search failed: {err}");
                None
            }
        };
        let Some(first) = first else {
            // Keep showing the previous illustration.
            state.publish();
            return;
        };

        state.illustration_url = Some(first.regular_url.clone());
        state.publish();
        state.emit(EngineEvent::IllustrationUpdated(first.regular_url));
    }
}

#[derive(Debug)]
struct TaskEndedMessage(u64);

impl Message<EngineState> for TaskEndedMessage {
    #[inline]
    fn handle(self, state: &mut EngineState, _handle: &Actor<EngineState>) {
        state
            .running_tasks
            .remove(&self.0)
            .expect("internal state is inconsistent");
    }
}
