//! Ordered traversal of a signer's templates
//!
//! Forward progress is strictly sequential: a signer may only move past a
//! template once every field on it is filled, but may always go back to an
//! earlier one. Completion is read from the in-memory field stores, never
//! from persisted state.

use crate::session::SessionEvent;
use crate::template::Template;
use crate::types::*;
use std::collections::BTreeSet;

/// Completion summary of one template
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateProgress {
    pub index: usize,
    pub name: String,
    pub filled: usize,
    pub total: usize,
    pub ratio: f64,
    pub complete: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TemplateSequencer {
    current: usize,
    len: usize,
    completed: BTreeSet<usize>,
}

impl TemplateSequencer {
    pub fn new(templates: &[Template]) -> Self {
        let mut sequencer = Self {
            current: 0,
            len: templates.len(),
            completed: BTreeSet::new(),
        };
        sequencer.refresh(templates);
        sequencer
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Indices of templates whose fields are all filled
    pub fn completed(&self) -> &BTreeSet<usize> {
        &self.completed
    }

    pub fn is_completed(&self, index: usize) -> bool {
        self.completed.contains(&index)
    }

    pub fn all_complete(&self) -> bool {
        self.completed.len() == self.len
    }

    /// Recompute completion for every template
    pub fn refresh(&mut self, templates: &[Template]) {
        self.len = templates.len();
        self.completed = templates
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_complete())
            .map(|(i, _)| i)
            .collect();
        if self.current >= self.len {
            self.current = self.len.saturating_sub(1);
        }
    }

    /// Recompute completion of one template. Returns true if it changed.
    pub fn refresh_template(&mut self, templates: &[Template], index: usize) -> bool {
        let Some(template) = templates.get(index) else {
            return false;
        };
        if template.is_complete() {
            self.completed.insert(index)
        } else {
            self.completed.remove(&index)
        }
    }

    /// React to a session event, reporting any completion change it causes
    pub fn on_event(&mut self, event: &SessionEvent, templates: &[Template]) -> Option<SessionEvent> {
        match event {
            SessionEvent::FieldValueChanged { template, .. }
            | SessionEvent::FieldsReloaded { template } => {
                if self.refresh_template(templates, *template) {
                    Some(if self.is_completed(*template) {
                        SessionEvent::TemplateCompleted {
                            template: *template,
                        }
                    } else {
                        SessionEvent::TemplateReopened {
                            template: *template,
                        }
                    })
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Move to the next template if the current one is complete
    pub fn advance(&mut self, templates: &[Template]) -> Result<usize> {
        self.refresh(templates);
        let current = templates
            .get(self.current)
            .ok_or(SignError::TemplateOutOfRange {
                index: self.current,
                len: templates.len(),
            })?;

        if !current.is_complete() {
            return Err(SignError::TemplateIncomplete {
                index: self.current,
                name: current.name.clone(),
                remaining: current.remaining(),
            });
        }
        if self.current + 1 >= templates.len() {
            return Err(SignError::AtLastTemplate);
        }

        self.current += 1;
        log::debug!("Advanced to template {}", self.current);
        Ok(self.current)
    }

    pub fn retreat(&mut self) -> Result<usize> {
        if self.current == 0 {
            return Err(SignError::AtFirstTemplate);
        }
        self.current -= 1;
        Ok(self.current)
    }

    /// Jump to any template.
    ///
    /// Going back is always allowed. Going forward requires every template
    /// from the current one up to `index - 1` to be complete; the first
    /// incomplete one is named in the error.
    pub fn jump_to(&mut self, templates: &[Template], index: usize) -> Result<usize> {
        if index >= templates.len() {
            return Err(SignError::TemplateOutOfRange {
                index,
                len: templates.len(),
            });
        }

        if index <= self.current {
            self.current = index;
            return Ok(index);
        }
        if index == self.current + 1 {
            return self.advance(templates);
        }

        self.refresh(templates);
        if let Some((skipped, template)) = templates
            .iter()
            .enumerate()
            .take(index)
            .skip(self.current)
            .find(|(_, t)| !t.is_complete())
        {
            return Err(SignError::SkippedIncomplete {
                index: skipped,
                name: template.name.clone(),
                remaining: template.remaining(),
            });
        }

        self.current = index;
        log::debug!("Jumped to template {}", index);
        Ok(index)
    }

    pub fn progress(&self, templates: &[Template]) -> Vec<TemplateProgress> {
        templates
            .iter()
            .enumerate()
            .map(|(index, t)| TemplateProgress {
                index,
                name: t.name.clone(),
                filled: t.fields.filled_count(),
                total: t.fields.len(),
                ratio: t.completion_ratio(),
                complete: t.is_complete(),
            })
            .collect()
    }
}
