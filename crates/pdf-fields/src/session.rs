//! Signing session: one signer working through an ordered set of templates
//!
//! The session owns the templates and the sequencer, and carries the
//! explicit [`SessionContext`] (expected signer and verified identity) that
//! the consistency validator is built from. Every mutation emits a
//! [`SessionEvent`]; the sequencer consumes them to keep completion current,
//! and embedders can drain them to refresh their views.
//!
//! A verified identity whose name differs from the expected signer ends the
//! session for good. Finalization seals it; afterwards nothing may change.

use crate::consistency::{ConsistencyReport, ConsistencyValidator, FormatClass};
use crate::options::EngineOptions;
use crate::sequencer::{TemplateProgress, TemplateSequencer};
use crate::store::FieldStore;
use crate::template::Template;
use crate::types::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identity confirmed by the external authentication service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedIdentity {
    pub name: String,
    pub birth_date_digits: String,
}

impl VerifiedIdentity {
    pub fn new(name: impl Into<String>, birth_date_digits: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            birth_date_digits: birth_date_digits.into(),
        }
    }

    /// Birth date as `YYMMDD`, the prefix of a national ID number
    pub fn birth_date_yymmdd(&self) -> String {
        let digits: String = self
            .birth_date_digits
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        if digits.len() == 8 {
            digits[2..].to_string()
        } else {
            digits
        }
    }
}

/// Failure reported by the authentication service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    #[error("authentication was cancelled")]
    Cancelled,
    #[error("authentication was rejected: {0}")]
    Rejected(String),
    #[error("authentication service unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IdentityState {
    #[default]
    Unverified,
    Verified(VerifiedIdentity),
    /// Terminal: the verified person is not the expected signer
    Mismatch { expected: String, verified: String },
}

/// Per-signer context passed explicitly to session components
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionContext {
    expected_signer: String,
    identity: IdentityState,
}

impl SessionContext {
    pub fn new(expected_signer: impl Into<String>) -> Self {
        Self {
            expected_signer: expected_signer.into(),
            identity: IdentityState::Unverified,
        }
    }

    /// Context with an identity that was verified before the session started
    pub fn verified(expected_signer: impl Into<String>, identity: VerifiedIdentity) -> Self {
        Self {
            expected_signer: expected_signer.into(),
            identity: IdentityState::Verified(identity),
        }
    }

    pub fn expected_signer(&self) -> &str {
        &self.expected_signer
    }

    pub fn identity_state(&self) -> &IdentityState {
        &self.identity
    }

    pub fn verified_identity(&self) -> Option<&VerifiedIdentity> {
        match &self.identity {
            IdentityState::Verified(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self.identity, IdentityState::Mismatch { .. })
    }

    /// Record the outcome of an authentication attempt.
    ///
    /// Failures leave the context unverified so the signer can retry. A
    /// verified name that differs from the expected signer is terminal.
    pub fn apply_authentication(
        &mut self,
        outcome: std::result::Result<VerifiedIdentity, AuthFailure>,
    ) -> Result<()> {
        if let IdentityState::Mismatch { expected, verified } = &self.identity {
            return Err(SignError::IdentityMismatch {
                expected: expected.clone(),
                verified: verified.clone(),
            });
        }

        let identity = outcome?;
        let expected = FormatClass::Name.normalize(&self.expected_signer);
        if !expected.is_empty() && FormatClass::Name.normalize(&identity.name) != expected {
            log::warn!("Verified identity does not match the expected signer");
            self.identity = IdentityState::Mismatch {
                expected: self.expected_signer.clone(),
                verified: identity.name.clone(),
            };
            return Err(SignError::IdentityMismatch {
                expected: self.expected_signer.clone(),
                verified: identity.name,
            });
        }

        self.identity = IdentityState::Verified(identity);
        Ok(())
    }
}

/// Notification emitted by the session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    FieldValueChanged { template: usize, field: FieldId },
    /// A template's fields were replaced, e.g. after loading from storage
    FieldsReloaded { template: usize },
    TemplateCompleted { template: usize },
    TemplateReopened { template: usize },
    Navigated { template: usize },
    IdentityVerified,
    IdentityRejected,
    Sealed,
}

pub struct SigningSession {
    context: SessionContext,
    options: EngineOptions,
    templates: Vec<Template>,
    sequencer: TemplateSequencer,
    sealed: bool,
    events: Vec<SessionEvent>,
}

impl SigningSession {
    /// Start a session. Templates are ordered by their position.
    pub fn new(context: SessionContext, options: EngineOptions, mut templates: Vec<Template>) -> Self {
        templates.sort_by_key(|t| t.position);
        let sequencer = TemplateSequencer::new(&templates);
        Self {
            context,
            options,
            templates,
            sequencer,
            sealed: false,
            events: Vec::new(),
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn template(&self, index: usize) -> Option<&Template> {
        self.templates.get(index)
    }

    pub fn current_index(&self) -> usize {
        self.sequencer.current()
    }

    pub fn current_template(&self) -> Option<&Template> {
        self.templates.get(self.sequencer.current())
    }

    pub fn sequencer(&self) -> &TemplateSequencer {
        &self.sequencer
    }

    pub fn progress(&self) -> Vec<TemplateProgress> {
        self.sequencer.progress(&self.templates)
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Drain events emitted since the last call
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    fn ensure_active(&self) -> Result<()> {
        if let IdentityState::Mismatch { expected, verified } = self.context.identity_state() {
            return Err(SignError::IdentityMismatch {
                expected: expected.clone(),
                verified: verified.clone(),
            });
        }
        if self.sealed {
            return Err(SignError::Sealed);
        }
        Ok(())
    }

    fn emit(&mut self, event: SessionEvent) {
        if let Some(follow_up) = self.sequencer.on_event(&event, &self.templates) {
            self.events.push(event);
            self.events.push(follow_up);
        } else {
            self.events.push(event);
        }
    }

    pub fn set_value(
        &mut self,
        template: usize,
        field: FieldId,
        value: impl Into<String>,
    ) -> Result<()> {
        self.ensure_active()?;
        let len = self.templates.len();
        self.templates
            .get_mut(template)
            .ok_or(SignError::TemplateOutOfRange {
                index: template,
                len,
            })?
            .fields
            .set_value(field, value)?;
        self.emit(SessionEvent::FieldValueChanged { template, field });
        Ok(())
    }

    /// Replace a template's fields, e.g. with a freshly loaded copy
    pub fn reload_fields(&mut self, template: usize, fields: FieldStore) -> Result<()> {
        self.ensure_active()?;
        let len = self.templates.len();
        self.templates
            .get_mut(template)
            .ok_or(SignError::TemplateOutOfRange {
                index: template,
                len,
            })?
            .fields = fields;
        self.emit(SessionEvent::FieldsReloaded { template });
        Ok(())
    }

    pub fn advance(&mut self) -> Result<usize> {
        self.ensure_active()?;
        let index = self.sequencer.advance(&self.templates)?;
        self.emit(SessionEvent::Navigated { template: index });
        Ok(index)
    }

    pub fn retreat(&mut self) -> Result<usize> {
        self.ensure_active()?;
        let index = self.sequencer.retreat()?;
        self.emit(SessionEvent::Navigated { template: index });
        Ok(index)
    }

    pub fn jump_to(&mut self, index: usize) -> Result<usize> {
        self.ensure_active()?;
        let index = self.sequencer.jump_to(&self.templates, index)?;
        self.emit(SessionEvent::Navigated { template: index });
        Ok(index)
    }

    pub fn apply_authentication(
        &mut self,
        outcome: std::result::Result<VerifiedIdentity, AuthFailure>,
    ) -> Result<()> {
        self.ensure_active()?;
        let result = self.context.apply_authentication(outcome);
        match &result {
            Ok(()) => self.emit(SessionEvent::IdentityVerified),
            Err(SignError::IdentityMismatch { .. }) => self.emit(SessionEvent::IdentityRejected),
            Err(_) => {}
        }
        result
    }

    /// Run the consistency validator over every template.
    ///
    /// Only available once all templates are complete.
    pub fn validate(&self) -> Result<ConsistencyReport> {
        let incomplete: Vec<usize> = self
            .templates
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.is_complete())
            .map(|(i, _)| i)
            .collect();
        if !incomplete.is_empty() {
            return Err(SignError::NotReadyToFinalize { incomplete });
        }

        Ok(ConsistencyValidator::new(&self.context, &self.options).validate(&self.templates))
    }

    /// Approve the session and seal it.
    ///
    /// Conflicts and identity mismatches block unless `allow_override` is set.
    pub fn finalize(
        &mut self,
        attachments_satisfied: bool,
        allow_override: bool,
    ) -> Result<ConsistencyReport> {
        self.ensure_active()?;
        if !attachments_satisfied {
            return Err(SignError::AttachmentsMissing);
        }

        let report = self.validate()?;
        report.ensure_approvable(allow_override)?;
        if !report.is_clean() {
            log::warn!("Finalizing with overridden consistency conflicts");
        }

        self.sealed = true;
        self.emit(SessionEvent::Sealed);
        log::info!("Signing session sealed ({} templates)", self.templates.len());
        Ok(report)
    }
}
