//! Turn processor.
//!
//! Runs one user turn through the strictly ordered write sequence: save the
//! user message, stream the reply, save the assistant message, extract,
//! decide the transition, commit the stage, re-evaluate milestones. Only
//! message persistence and reply delivery are hard-failure paths; the later
//! steps degrade independently and never take down a delivered reply.
//!
//! Turns for the same conversation are serialized through a per-conversation
//! lock so a second turn cannot read a half-committed stage. Turns for
//! different conversations run in parallel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use futures::StreamExt;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tracing::Instrument;

use crate::domain::conversation::{Conversation, Message};
use crate::domain::foundation::{ConversationId, MessageId, UserId, ValidationError};
use crate::domain::journey::{
    directives_for, replies_for, ConversationContext, Stage, SuggestedReply,
};
use crate::ports::{
    AiError, AiProvider, ChatMessage, CheckInStore, ConversationStore, JournalStore,
    MilestoneStore, ReplyRequest, StoreError,
};

use super::{
    AchievementEngine, CheckInExtractor, ContextBuilder, JournalExtractor, TransitionDetector,
};

/// One incoming user turn.
#[derive(Debug, Clone)]
pub struct TurnRequest {
    pub user_id: UserId,
    /// Omitted on the first turn; the conversation is created lazily.
    pub conversation_id: Option<ConversationId>,
    pub content: String,
}

/// Events emitted while a turn is processed.
#[derive(Debug, Clone)]
pub enum TurnEvent {
    /// Incremental reply content.
    ReplyDelta { delta: String },
    /// The full reply was generated and persisted.
    ReplyComplete { message_id: MessageId },
    /// Out-of-band turn metadata, emitted once the late steps settle.
    Metadata {
        conversation_id: ConversationId,
        stage: Stage,
        suggestions: Vec<SuggestedReply>,
    },
    /// The turn aborted on a hard-failure path.
    Failed { message: String },
}

/// Errors that abort a turn before any streaming begins.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("invalid message: {0}")]
    Validation(#[from] ValidationError),

    #[error("conversation not found: {0}")]
    ConversationNotFound(ConversationId),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("provider error: {0}")]
    Provider(#[from] AiError),
}

/// Snapshot served by the phase-query endpoint.
#[derive(Debug, Clone)]
pub struct CompanionState {
    pub conversation_id: Option<ConversationId>,
    pub stage: Stage,
    pub suggestions: Vec<SuggestedReply>,
}

/// Serializes turns per conversation.
///
/// A second turn for the same conversation must not begin its write sequence
/// until the first one's stage commit has landed.
#[derive(Clone, Default)]
struct TurnLocks {
    inner: Arc<StdMutex<HashMap<ConversationId, Arc<Mutex<()>>>>>,
}

impl TurnLocks {
    fn lock_for(&self, id: ConversationId) -> Arc<Mutex<()>> {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        map.entry(id).or_default().clone()
    }
}

/// Orchestrates one turn end to end.
#[derive(Clone)]
pub struct TurnProcessor {
    conversations: Arc<dyn ConversationStore>,
    check_ins: Arc<dyn CheckInStore>,
    journals: Arc<dyn JournalStore>,
    provider: Arc<dyn AiProvider>,
    context_builder: ContextBuilder,
    detector: TransitionDetector,
    check_in_extractor: CheckInExtractor,
    journal_extractor: JournalExtractor,
    achievements: AchievementEngine,
    locks: TurnLocks,
}

impl TurnProcessor {
    /// Wires the processor over the given stores and provider.
    pub fn new(
        conversations: Arc<dyn ConversationStore>,
        check_ins: Arc<dyn CheckInStore>,
        journals: Arc<dyn JournalStore>,
        milestones: Arc<dyn MilestoneStore>,
        provider: Arc<dyn AiProvider>,
    ) -> Self {
        let context_builder = ContextBuilder::new(
            conversations.clone(),
            check_ins.clone(),
            journals.clone(),
            milestones.clone(),
        );
        Self {
            detector: TransitionDetector::new(provider.clone()),
            check_in_extractor: CheckInExtractor::new(provider.clone()),
            journal_extractor: JournalExtractor::new(provider.clone()),
            achievements: AchievementEngine::new(
                check_ins.clone(),
                journals.clone(),
                milestones.clone(),
            ),
            context_builder,
            conversations,
            check_ins,
            journals,
            provider,
            locks: TurnLocks::default(),
        }
    }

    /// Processes one turn, returning a stream of [`TurnEvent`]s.
    ///
    /// Validation and conversation resolution happen up front so the caller
    /// gets an immediate error instead of a doomed stream. The remaining
    /// sequence runs in a background task feeding the channel.
    pub async fn process_turn(
        &self,
        request: TurnRequest,
    ) -> Result<mpsc::Receiver<TurnEvent>, TurnError> {
        let message = Message::user(request.content.clone())?;

        let conversation = match request.conversation_id {
            Some(id) => self
                .conversations
                .find_by_id(&request.user_id, id)
                .await?
                .ok_or(TurnError::ConversationNotFound(id))?,
            None => match self.conversations.find_latest_for_user(&request.user_id).await? {
                Some(conversation) => conversation,
                None => {
                    let conversation = Conversation::start(request.user_id.clone());
                    self.conversations.create(&conversation).await?;
                    tracing::info!(
                        user = %request.user_id,
                        conversation = %conversation.id(),
                        "conversation created"
                    );
                    conversation
                }
            },
        };

        let (tx, rx) = mpsc::channel(32);
        let span = tracing::info_span!(
            "turn",
            conversation = %conversation.id(),
            stage = conversation.stage().as_str()
        );
        let processor = self.clone();
        tokio::spawn(
            async move {
                processor.run_turn(conversation, message, tx).await;
            }
            .instrument(span),
        );
        Ok(rx)
    }

    async fn run_turn(
        &self,
        mut conversation: Conversation,
        message: Message,
        tx: mpsc::Sender<TurnEvent>,
    ) {
        let lock = self.locks.lock_for(conversation.id());
        let _guard = lock.lock().await;

        // Hard-failure path: the user message must land before anything else.
        if let Err(e) = self
            .conversations
            .append_message(conversation.id(), &message)
            .await
        {
            tracing::error!(error = %e, "failed to persist user message");
            let _ = tx
                .send(TurnEvent::Failed {
                    message: "could not save your message".to_string(),
                })
                .await;
            return;
        }
        let user_message_id = message.id;

        if conversation.has_default_title() {
            conversation.title_from_message(&message.content);
            if let Err(e) = self
                .conversations
                .update_title(conversation.user_id(), conversation.id(), conversation.title())
                .await
            {
                tracing::warn!(error = %e, "title update degraded");
            }
        }

        // Context snapshot for prompt shaping; degraded sub-queries are fine.
        let context = self.context_builder.build(&conversation).await;

        let assistant_content = match self.stream_reply(&context, &tx).await {
            Ok(content) => content,
            Err(e) => {
                tracing::error!(error = %e, "reply generation failed");
                let _ = tx
                    .send(TurnEvent::Failed {
                        message: "the companion could not reply".to_string(),
                    })
                    .await;
                return;
            }
        };

        let assistant_message = match Message::assistant(assistant_content) {
            Ok(message) => message,
            Err(e) => {
                tracing::error!(error = %e, "assistant reply failed validation");
                let _ = tx
                    .send(TurnEvent::Failed {
                        message: "the companion could not reply".to_string(),
                    })
                    .await;
                return;
            }
        };
        if let Err(e) = self
            .conversations
            .append_message(conversation.id(), &assistant_message)
            .await
        {
            tracing::error!(error = %e, "failed to persist assistant message");
            let _ = tx
                .send(TurnEvent::Failed {
                    message: "could not save the reply".to_string(),
                })
                .await;
            return;
        }
        let _ = tx
            .send(TurnEvent::ReplyComplete {
                message_id: assistant_message.id,
            })
            .await;

        // Late steps on the now-extended history. Each degrades on its own;
        // the reply is already with the user.
        let context = self.context_builder.build(&conversation).await;

        self.extract_for_stage(&conversation, &context, user_message_id)
            .await;

        let decision = self
            .detector
            .should_transition(
                conversation.stage(),
                &context.recent_messages,
                context.user_turns_in_stage,
            )
            .await;
        tracing::info!(
            advance = decision.advance,
            reason = %decision.reason,
            "transition decision"
        );
        if decision.advance {
            let new_stage = conversation.advance_stage();
            if let Err(e) = self
                .conversations
                .commit_stage(
                    conversation.user_id(),
                    conversation.id(),
                    new_stage,
                    conversation.stage_entered_at(),
                )
                .await
            {
                tracing::warn!(error = %e, "stage commit degraded");
            }
        }

        let mut recent_milestones = context.recent_milestones.clone();
        match self.achievements.check_and_create(conversation.user_id()).await {
            Ok(created) => {
                for milestone in created.into_iter().rev() {
                    recent_milestones.insert(0, milestone);
                }
            }
            Err(e) => tracing::warn!(error = %e, "milestone re-evaluation degraded"),
        }

        let final_context = ConversationContext {
            stage: conversation.stage(),
            recent_milestones,
            ..context
        };
        let suggestions = replies_for(conversation.stage(), &final_context);
        let _ = tx
            .send(TurnEvent::Metadata {
                conversation_id: conversation.id(),
                stage: conversation.stage(),
                suggestions,
            })
            .await;
    }

    async fn stream_reply(
        &self,
        context: &ConversationContext,
        tx: &mpsc::Sender<TurnEvent>,
    ) -> Result<String, AiError> {
        let directives = directives_for(context.stage, context);
        let history: Vec<ChatMessage> = context
            .recent_messages
            .iter()
            .map(|m| match m.role {
                crate::domain::conversation::Role::User => ChatMessage::user(&m.content),
                crate::domain::conversation::Role::Assistant => {
                    ChatMessage::assistant(&m.content)
                }
            })
            .collect();

        let request = ReplyRequest::new(directives.system_prompt(), history);
        let mut stream = self.provider.stream_reply(request).await?;

        let mut full = String::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if !chunk.delta.is_empty() {
                full.push_str(&chunk.delta);
                let _ = tx
                    .send(TurnEvent::ReplyDelta {
                        delta: chunk.delta,
                    })
                    .await;
            }
            if chunk.is_final {
                break;
            }
        }
        Ok(full)
    }

    /// Runs the stage's extractor, if the stage has one. Invoked exactly
    /// once per turn; the source-message key makes retried turns harmless.
    async fn extract_for_stage(
        &self,
        conversation: &Conversation,
        context: &ConversationContext,
        source_message_id: MessageId,
    ) {
        match conversation.stage() {
            Stage::CheckIn => {
                match self
                    .check_in_extractor
                    .try_extract(
                        conversation.user_id(),
                        &context.recent_messages,
                        source_message_id,
                    )
                    .await
                {
                    Ok(Some(check_in)) => match self.check_ins.create(&check_in).await {
                        Ok(true) => tracing::info!("check-in recorded"),
                        Ok(false) => tracing::debug!("check-in already recorded for this turn"),
                        Err(e) => tracing::warn!(error = %e, "check-in persistence degraded"),
                    },
                    Ok(None) => {}
                    Err(e) => tracing::warn!(error = %e, "check-in extraction degraded"),
                }
            }
            Stage::JournalPrompt => {
                match self
                    .journal_extractor
                    .try_extract(
                        conversation.user_id(),
                        &context.recent_messages,
                        source_message_id,
                    )
                    .await
                {
                    Ok(Some(entry)) => match self.journals.create(&entry).await {
                        Ok(true) => tracing::info!("journal entry recorded"),
                        Ok(false) => tracing::debug!("journal already recorded for this turn"),
                        Err(e) => tracing::warn!(error = %e, "journal persistence degraded"),
                    },
                    Ok(None) => {}
                    Err(e) => tracing::warn!(error = %e, "journal extraction degraded"),
                }
            }
            _ => {}
        }
    }

    /// Serves the phase-query endpoint: stage, conversation, and suggested
    /// replies for a user with no turn in flight. Read-only; never creates
    /// a conversation.
    pub async fn current_state(&self, user_id: &UserId) -> Result<CompanionState, StoreError> {
        match self.conversations.find_latest_for_user(user_id).await? {
            Some(conversation) => {
                let context = self.context_builder.build(&conversation).await;
                let suggestions = replies_for(conversation.stage(), &context);
                Ok(CompanionState {
                    conversation_id: Some(conversation.id()),
                    stage: conversation.stage(),
                    suggestions,
                })
            }
            None => {
                let context = ConversationContext::empty(Stage::Greeting);
                Ok(CompanionState {
                    conversation_id: None,
                    stage: Stage::Greeting,
                    suggestions: replies_for(Stage::Greeting, &context),
                })
            }
        }
    }
}
