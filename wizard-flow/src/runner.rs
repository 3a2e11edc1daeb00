//! WizardRunner – convenience wrapper that loads a session, applies exactly
//! one wizard operation, and persists the updated session back to storage.
//!
//! Interactive frontends (HTTP, CLI, TUI) usually want one operation per
//! request with the session automatically saved for the next roundtrip;
//! `WizardRunner` makes that a one-liner. Callers that need custom
//! persistence or want to batch several operations before saving can work
//! with [`Session`] and a [`SessionStorage`] directly; the two APIs are
//! fully compatible.

use std::sync::Arc;

use crate::collaborator::Collaborator;
use crate::error::{Result, WizardError};
use crate::model::{AiResult, ParagraphFeedback, ParagraphSlot};
use crate::session::{Session, SessionConfig};
use crate::storage::SessionStorage;

/// High-level helper orchestrating the common _load → apply → save_ pattern.
#[derive(Clone)]
pub struct WizardRunner {
    storage: Arc<dyn SessionStorage>,
    collaborator: Arc<dyn Collaborator>,
}

impl WizardRunner {
    pub fn new(storage: Arc<dyn SessionStorage>, collaborator: Arc<dyn Collaborator>) -> Self {
        Self {
            storage,
            collaborator,
        }
    }

    pub async fn create_session(&self) -> Result<Session> {
        self.create_session_with_config(SessionConfig::default())
            .await
    }

    pub async fn create_session_with_config(&self, config: SessionConfig) -> Result<Session> {
        let session = Session::with_config(config);
        self.storage.save(session.clone()).await?;
        Ok(session)
    }

    pub async fn get(&self, session_id: &str) -> Result<Session> {
        self.storage
            .get(session_id)
            .await?
            .ok_or_else(|| WizardError::SessionNotFound(session_id.to_string()))
    }

    pub async fn set_articles(
        &self,
        session_id: &str,
        first: &str,
        second: &str,
    ) -> Result<Session> {
        let mut session = self.get(session_id).await?;
        session.set_articles(first, second)?;
        self.save(session).await
    }

    pub async fn set_reflection(&self, session_id: &str, text: &str) -> Result<Session> {
        let mut session = self.get(session_id).await?;
        session.set_reflection(text)?;
        self.save(session).await
    }

    /// Run the current stage's completeness gate and, on success, its
    /// one-time side effects. A refusal leaves the stored session untouched.
    pub async fn advance(&self, session_id: &str) -> Result<Session> {
        let mut session = self.get(session_id).await?;
        session.advance(self.collaborator.as_ref()).await?;
        self.save(session).await
    }

    pub async fn back(&self, session_id: &str) -> Result<Session> {
        let mut session = self.get(session_id).await?;
        session.back()?;
        self.save(session).await
    }

    pub async fn restart(&self, session_id: &str) -> Result<Session> {
        let mut session = self.get(session_id).await?;
        session.restart();
        self.save(session).await
    }

    pub async fn update_paragraph(
        &self,
        session_id: &str,
        slot: ParagraphSlot,
        text: &str,
    ) -> Result<Session> {
        let mut session = self.get(session_id).await?;
        session.update_paragraph(slot, text)?;
        self.save(session).await
    }

    pub async fn paragraph_feedback(
        &self,
        session_id: &str,
        slot: ParagraphSlot,
    ) -> Result<(Session, AiResult<ParagraphFeedback>)> {
        let mut session = self.get(session_id).await?;
        let result = session
            .request_paragraph_feedback(slot, self.collaborator.as_ref())
            .await?;
        let session = self.save(session).await?;
        Ok((session, result))
    }

    pub async fn set_final_text(&self, session_id: &str, text: &str) -> Result<Session> {
        let mut session = self.get(session_id).await?;
        session.set_final_text(text)?;
        self.save(session).await
    }

    async fn save(&self, session: Session) -> Result<Session> {
        self.storage.save(session.clone()).await?;
        Ok(session)
    }
}
