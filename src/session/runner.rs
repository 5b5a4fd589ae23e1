//! Session worker: runs the LLM contracts off the UI thread.
//!
//! [`SessionWorker`] receives [`SessionCommand`]s over a `tokio::sync::mpsc`
//! channel, runs each one on its own task, and answers with a
//! [`SessionUpdate`] carrying the same ticket.
//!
//! ```text
//! SessionCommand::Generate ─▶ SentenceGenerator::generate  ─▶ SessionUpdate::Generated
//! SessionCommand::Score    ─▶ PronunciationScorer::score   ─▶ SessionUpdate::Scored
//! ```
//!
//! A slow scoring call never holds up a generation request and vice versa.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::error::PracticeError;
use crate::llm::{GenerationRequest, PronunciationScorer, SentenceGenerator};
use crate::scoring::{ScoringRequest, ScoringResult};
use crate::session::controller::Ticket;

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Work requested by the UI thread.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    Generate {
        ticket: Ticket,
        request: GenerationRequest,
    },
    Score {
        ticket: Ticket,
        request: ScoringRequest,
    },
}

/// Outcomes delivered back to the UI thread.
#[derive(Debug, Clone)]
pub enum SessionUpdate {
    Generated {
        ticket: Ticket,
        outcome: Result<Vec<String>, PracticeError>,
    },
    Scored {
        ticket: Ticket,
        outcome: Result<ScoringResult, PracticeError>,
    },
}

// ---------------------------------------------------------------------------
// SessionWorker
// ---------------------------------------------------------------------------

/// Executes [`SessionCommand`]s against the configured collaborators.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use speakeasy::config::AppConfig;
/// use speakeasy::llm::{ApiGenerator, ApiScorer};
/// use speakeasy::session::SessionWorker;
///
/// # async fn example() {
/// let config = AppConfig::default();
/// let worker = SessionWorker::new(
///     Arc::new(ApiScorer::from_config(&config.llm)),
///     Arc::new(ApiGenerator::from_config(&config.llm)),
/// );
/// let (command_tx, command_rx) = tokio::sync::mpsc::channel(8);
/// let (update_tx, mut update_rx) = tokio::sync::mpsc::channel(8);
/// tokio::spawn(worker.run(command_rx, update_tx));
/// # drop((command_tx, update_rx.try_recv()));
/// # }
/// ```
#[derive(Clone)]
pub struct SessionWorker {
    scorer: Arc<dyn PronunciationScorer>,
    generator: Arc<dyn SentenceGenerator>,
}

impl SessionWorker {
    pub fn new(
        scorer: Arc<dyn PronunciationScorer>,
        generator: Arc<dyn SentenceGenerator>,
    ) -> Self {
        Self { scorer, generator }
    }

    /// Run until `commands` is closed and every started command has
    /// answered.
    pub async fn run(
        self,
        mut commands: mpsc::Receiver<SessionCommand>,
        updates: mpsc::Sender<SessionUpdate>,
    ) {
        let mut tasks = JoinSet::new();

        while let Some(command) = commands.recv().await {
            while tasks.try_join_next().is_some() {}

            let worker = self.clone();
            let updates = updates.clone();
            tasks.spawn(async move {
                let update = worker.execute(command).await;
                if updates.send(update).await.is_err() {
                    log::debug!("session: update receiver dropped");
                }
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                log::error!("session: worker task failed: {e}");
            }
        }
        log::info!("session: command channel closed, worker shutting down");
    }

    /// Run one command to completion.
    pub async fn execute(&self, command: SessionCommand) -> SessionUpdate {
        match command {
            SessionCommand::Generate { ticket, request } => {
                log::debug!(
                    "session: generating {} sentence(s) about {:?}",
                    request.sentence_count,
                    request.topic
                );
                let outcome = self.generator.generate(&request).await;
                SessionUpdate::Generated { ticket, outcome }
            }
            SessionCommand::Score { ticket, request } => {
                log::debug!("session: scoring {:?}", request.sentence);
                let outcome = self.scorer.score(&request).await;
                SessionUpdate::Scored { ticket, outcome }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Marks every word correct.
    struct AllCorrect;

    #[async_trait]
    impl PronunciationScorer for AllCorrect {
        async fn score(&self, request: &ScoringRequest) -> Result<ScoringResult, PracticeError> {
            let words = crate::text::tokenize(&request.sentence)
                .into_iter()
                .map(str::to_string)
                .collect();
            ScoringResult::new(&request.sentence, "Perfect.", words, Vec::new())
        }
    }

    struct Unreachable;

    #[async_trait]
    impl PronunciationScorer for Unreachable {
        async fn score(&self, _request: &ScoringRequest) -> Result<ScoringResult, PracticeError> {
            Err(PracticeError::ScoringUnavailable("connection refused".into()))
        }
    }

    #[async_trait]
    impl SentenceGenerator for Unreachable {
        async fn generate(&self, _request: &GenerationRequest) -> Result<Vec<String>, PracticeError> {
            Err(PracticeError::GenerationUnavailable("connection refused".into()))
        }
    }

    /// Returns `sentence_count` numbered sentences.
    struct Counting;

    #[async_trait]
    impl SentenceGenerator for Counting {
        async fn generate(&self, request: &GenerationRequest) -> Result<Vec<String>, PracticeError> {
            Ok((1..=request.sentence_count)
                .map(|i| format!("Sentence {i} about {}.", request.topic))
                .collect())
        }
    }

    fn score_command(ticket: Ticket) -> SessionCommand {
        SessionCommand::Score {
            ticket,
            request: ScoringRequest {
                sentence: "Good morning.".into(),
                user_recording: "data:audio/wav;base64,AAAA".into(),
            },
        }
    }

    async fn run_all(worker: SessionWorker, commands: Vec<SessionCommand>) -> Vec<SessionUpdate> {
        let (command_tx, command_rx) = mpsc::channel(8);
        let (update_tx, mut update_rx) = mpsc::channel(8);
        for command in commands {
            command_tx.send(command).await.unwrap();
        }
        drop(command_tx);

        worker.run(command_rx, update_tx).await;

        let mut updates = Vec::new();
        while let Ok(update) = update_rx.try_recv() {
            updates.push(update);
        }
        updates
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn score_command_answers_with_same_ticket() {
        let worker = SessionWorker::new(Arc::new(AllCorrect), Arc::new(Counting));
        let updates = run_all(worker, vec![score_command(7)]).await;

        assert_eq!(updates.len(), 1);
        match &updates[0] {
            SessionUpdate::Scored { ticket, outcome } => {
                assert_eq!(*ticket, 7);
                assert_eq!(outcome.as_ref().unwrap().accuracy_percentage, 100);
            }
            other => panic!("unexpected update {other:?}"),
        }
    }

    #[tokio::test]
    async fn generate_command_honours_count() {
        let worker = SessionWorker::new(Arc::new(AllCorrect), Arc::new(Counting));
        let update = worker
            .execute(SessionCommand::Generate {
                ticket: 1,
                request: GenerationRequest::new("tea", 3),
            })
            .await;

        match update {
            SessionUpdate::Generated { outcome, .. } => {
                let sentences = outcome.unwrap();
                assert_eq!(sentences.len(), 3);
                assert_eq!(sentences[0], "Sentence 1 about tea.");
            }
            other => panic!("unexpected update {other:?}"),
        }
    }

    #[tokio::test]
    async fn failures_are_delivered_not_swallowed() {
        let worker = SessionWorker::new(Arc::new(Unreachable), Arc::new(Unreachable));
        let updates = run_all(
            worker,
            vec![
                score_command(1),
                SessionCommand::Generate {
                    ticket: 2,
                    request: GenerationRequest::default(),
                },
            ],
        )
        .await;

        assert_eq!(updates.len(), 2);
        for update in updates {
            match update {
                SessionUpdate::Scored { outcome, .. } => {
                    assert!(matches!(outcome, Err(PracticeError::ScoringUnavailable(_))));
                }
                SessionUpdate::Generated { outcome, .. } => {
                    assert!(matches!(outcome, Err(PracticeError::GenerationUnavailable(_))));
                }
            }
        }
    }

    #[tokio::test]
    async fn closed_channel_stops_the_worker() {
        let worker = SessionWorker::new(Arc::new(AllCorrect), Arc::new(Counting));
        assert!(run_all(worker, Vec::new()).await.is_empty());
    }
}
