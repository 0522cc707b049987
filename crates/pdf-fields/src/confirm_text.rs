//! Confirm-text templates
//!
//! An author writes a sentence the signer must retype, optionally with option
//! groups such as `I am {the buyer/the seller}`. The signer picks one choice
//! per group and types the rendered sentence; input is checked character by
//! character while typing and as a whole before it can be submitted.

use crate::types::*;
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static OPTION_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}]+)\}").expect("option group pattern is valid"));

/// One `{a/b/c}` token of a template
#[derive(Debug, Clone, PartialEq)]
pub struct OptionGroup {
    pub choices: Vec<String>,
    pub selected: usize,
    /// Byte range of the token (braces included) in the template source
    pub span: Range<usize>,
}

impl OptionGroup {
    pub fn selected_choice(&self) -> &str {
        &self.choices[self.selected]
    }
}

/// A parsed confirm-text template
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmTemplate {
    source: String,
    groups: Vec<OptionGroup>,
}

impl ConfirmTemplate {
    /// Parse every non-overlapping option group, left to right.
    ///
    /// Empty braces (`{}`) and nested braces are not groups and stay literal.
    pub fn parse(source: &str) -> Self {
        let groups = OPTION_GROUP
            .captures_iter(source)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let inner = caps.get(1)?;
                let choices: Vec<String> = inner.as_str().split('/').map(str::to_string).collect();
                Some(OptionGroup {
                    choices,
                    selected: 0,
                    span: whole.range(),
                })
            })
            .collect();

        Self {
            source: source.to_string(),
            groups,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn groups(&self) -> &[OptionGroup] {
        &self.groups
    }

    /// Select a choice in one option group
    pub fn select(&mut self, group: usize, choice: usize) -> Result<()> {
        let g = self
            .groups
            .get_mut(group)
            .filter(|g| choice < g.choices.len())
            .ok_or(SignError::OptionOutOfRange { group, choice })?;
        g.selected = choice;
        Ok(())
    }

    /// Template text with each group replaced by its selected choice
    pub fn render(&self) -> String {
        let mut rendered = String::with_capacity(self.source.len());
        let mut cursor = 0;
        for group in &self.groups {
            rendered.push_str(&self.source[cursor..group.span.start]);
            rendered.push_str(group.selected_choice());
            cursor = group.span.end;
        }
        rendered.push_str(&self.source[cursor..]);
        rendered
    }

    /// Compare typed input against the rendered text
    pub fn verify(&self, input: &str) -> Verification {
        Verification::compare(&self.render(), input)
    }
}

/// Check a template in authoring mode. Any non-empty text is accepted.
pub fn validate_authoring(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(SignError::EmptyTemplate);
    }
    Ok(())
}

/// Overall state of typed input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    /// Nothing typed yet
    Empty,
    /// Every typed character matches; more is expected
    CorrectSoFar,
    /// Input equals the rendered text (ignoring surrounding whitespace)
    Complete,
    /// The character at `position` differs from the rendered text
    Mismatch { position: usize },
}

/// Per-character comparison, one entry per rendered or typed position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharCheck {
    pub expected: Option<char>,
    pub typed: Option<char>,
}

impl CharCheck {
    pub fn is_correct(&self) -> bool {
        self.typed.is_some() && self.typed == self.expected
    }

    pub fn is_error(&self) -> bool {
        self.typed.is_some() && self.typed != self.expected
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Verification {
    pub rendered: String,
    pub status: MatchStatus,
    pub chars: Vec<CharCheck>,
}

impl Verification {
    fn compare(rendered: &str, input: &str) -> Self {
        let expected: Vec<char> = rendered.chars().collect();
        let typed: Vec<char> = input.chars().collect();

        let chars = (0..expected.len().max(typed.len()))
            .map(|i| CharCheck {
                expected: expected.get(i).copied(),
                typed: typed.get(i).copied(),
            })
            .collect::<Vec<_>>();

        let status = if input.is_empty() {
            MatchStatus::Empty
        } else if input.trim() == rendered.trim() {
            MatchStatus::Complete
        } else if let Some(position) = chars.iter().position(CharCheck::is_error) {
            MatchStatus::Mismatch { position }
        } else {
            MatchStatus::CorrectSoFar
        };

        Self {
            rendered: rendered.to_string(),
            status,
            chars,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status == MatchStatus::Complete
    }

    pub fn error_position(&self) -> Option<usize> {
        match self.status {
            MatchStatus::Mismatch { position } => Some(position),
            _ => None,
        }
    }
}

/// Signer-side state of one confirm-text field: selections plus typed input
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmTextEntry {
    template: ConfirmTemplate,
    input: String,
}

impl ConfirmTextEntry {
    pub fn new(template: ConfirmTemplate) -> Self {
        Self {
            template,
            input: String::new(),
        }
    }

    /// Entry for a placed confirm-text field
    pub fn for_field(field: &Field) -> Result<Self> {
        let source = field
            .confirm_template()
            .ok_or(SignError::NotConfirmText(field.id))?;
        validate_authoring(source)?;
        Ok(Self::new(ConfirmTemplate::parse(source)))
    }

    pub fn template(&self) -> &ConfirmTemplate {
        &self.template
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: impl Into<String>) -> Verification {
        self.input = input.into();
        self.verification()
    }

    /// Change a selection; the typed input is kept and re-checked
    pub fn select(&mut self, group: usize, choice: usize) -> Result<Verification> {
        self.template.select(group, choice)?;
        Ok(self.verification())
    }

    pub fn verification(&self) -> Verification {
        self.template.verify(&self.input)
    }

    /// Value to store in the field, available only once the input is complete
    pub fn submit(&self) -> Result<String> {
        let verification = self.verification();
        match verification.status {
            MatchStatus::Complete => Ok(self.input.trim().to_string()),
            MatchStatus::Mismatch { position } => Err(SignError::ConfirmTextMismatch { position }),
            MatchStatus::Empty | MatchStatus::CorrectSoFar => {
                Err(SignError::ConfirmTextIncomplete {
                    typed: self.input.chars().count(),
                    expected: verification.rendered.chars().count(),
                })
            }
        }
    }
}
