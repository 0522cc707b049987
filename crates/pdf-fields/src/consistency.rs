//! Cross-document consistency checks
//!
//! Once every template is filled, values that describe the same fact (the
//! signer's name, phone number, ID number) must agree across all documents.
//! Values are compared after classifier-specific normalization, and every
//! disagreeing occurrence is reported with enough context to jump to it.

use crate::options::EngineOptions;
use crate::session::{SessionContext, VerifiedIdentity};
use crate::template::Template;
use crate::types::*;
use serde::{Deserialize, Serialize};

/// Semantic classifier of a text field's value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormatClass {
    Name,
    NationalId,
    Phone,
}

impl FormatClass {
    pub const ALL: [FormatClass; 3] = [FormatClass::Name, FormatClass::NationalId, FormatClass::Phone];

    pub fn label(self) -> &'static str {
        match self {
            FormatClass::Name => "name",
            FormatClass::NationalId => "national ID",
            FormatClass::Phone => "phone number",
        }
    }

    /// Canonical form used for comparison
    pub fn normalize(self, value: &str) -> String {
        match self {
            FormatClass::Phone | FormatClass::NationalId => {
                value.chars().filter(char::is_ascii_digit).collect()
            }
            FormatClass::Name => value
                .chars()
                .filter(|c| !c.is_whitespace())
                .flat_map(char::to_lowercase)
                .collect(),
        }
    }
}

/// One filled field contributing to a classifier
#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence {
    pub template: usize,
    pub template_name: String,
    pub page: u32,
    pub field: FieldId,
    /// Value as the signer entered it
    pub value: String,
    pub normalized: String,
}

/// Occurrences sharing one normalized value
#[derive(Debug, Clone, PartialEq)]
pub struct ValueGroup {
    pub normalized: String,
    pub occurrences: Vec<Occurrence>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// All occurrences agree
    Consistent {
        value: String,
        occurrences: Vec<Occurrence>,
    },
    /// More than one distinct value; groups are in order of first appearance
    Inconsistent { groups: Vec<ValueGroup> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassReport {
    pub class: FormatClass,
    pub verdict: Verdict,
}

impl ClassReport {
    pub fn is_consistent(&self) -> bool {
        matches!(self.verdict, Verdict::Consistent { .. })
    }

    /// Every occurrence of an inconsistent classifier
    pub fn conflicting_occurrences(&self) -> Vec<&Occurrence> {
        match &self.verdict {
            Verdict::Consistent { .. } => Vec::new(),
            Verdict::Inconsistent { groups } => {
                groups.iter().flat_map(|g| g.occurrences.iter()).collect()
            }
        }
    }
}

/// A field that disagrees with the externally verified identity
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityMismatch {
    pub class: FormatClass,
    pub occurrence: Occurrence,
    /// Normalized value derived from the verified identity
    pub expected: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConsistencyReport {
    /// One entry per classifier with at least one filled field
    pub classes: Vec<ClassReport>,
    pub identity_mismatches: Vec<IdentityMismatch>,
}

impl ConsistencyReport {
    pub fn for_class(&self, class: FormatClass) -> Option<&ClassReport> {
        self.classes.iter().find(|c| c.class == class)
    }

    pub fn conflict_count(&self) -> usize {
        self.classes.iter().filter(|c| !c.is_consistent()).count()
    }

    /// No cross-document conflicts and no identity mismatches
    pub fn is_clean(&self) -> bool {
        self.conflict_count() == 0 && self.identity_mismatches.is_empty()
    }

    /// Fail unless clean, or unless the caller explicitly overrides
    pub fn ensure_approvable(&self, allow_override: bool) -> Result<()> {
        if self.is_clean() || allow_override {
            return Ok(());
        }
        Err(SignError::ConsistencyBlocked {
            conflicts: self.conflict_count(),
            identity_mismatches: self.identity_mismatches.len(),
        })
    }
}

pub struct ConsistencyValidator {
    identity: Option<VerifiedIdentity>,
    options: EngineOptions,
}

impl ConsistencyValidator {
    pub fn new(context: &SessionContext, options: &EngineOptions) -> Self {
        Self {
            identity: context.verified_identity().cloned(),
            options: options.clone(),
        }
    }

    pub fn validate(&self, templates: &[Template]) -> ConsistencyReport {
        let mut report = ConsistencyReport::default();

        for class in FormatClass::ALL {
            let occurrences = self.collect(templates, class);
            if occurrences.is_empty() {
                continue;
            }

            if let Some(identity) = &self.identity {
                report
                    .identity_mismatches
                    .extend(identity_mismatches(identity, class, &occurrences));
            }

            let verdict = verdict(occurrences);
            if let Verdict::Inconsistent { groups } = &verdict {
                log::info!(
                    "{} values disagree across documents ({} distinct)",
                    class.label(),
                    groups.len()
                );
            }
            report.classes.push(ClassReport { class, verdict });
        }

        report
    }

    fn collect(&self, templates: &[Template], class: FormatClass) -> Vec<Occurrence> {
        templates
            .iter()
            .enumerate()
            .flat_map(|(index, template)| {
                template
                    .fields
                    .all_fields()
                    .filter(move |f| {
                        f.is_filled()
                            && f.format_code().and_then(|code| self.options.classify(code))
                                == Some(class)
                    })
                    .map(move |f| Occurrence {
                        template: index,
                        template_name: template.name.clone(),
                        page: f.page,
                        field: f.id,
                        value: f.value.clone(),
                        normalized: class.normalize(&f.value),
                    })
            })
            .collect()
    }
}

fn verdict(occurrences: Vec<Occurrence>) -> Verdict {
    let mut groups: Vec<ValueGroup> = Vec::new();
    for occurrence in occurrences {
        match groups
            .iter_mut()
            .find(|g| g.normalized == occurrence.normalized)
        {
            Some(group) => group.occurrences.push(occurrence),
            None => groups.push(ValueGroup {
                normalized: occurrence.normalized.clone(),
                occurrences: vec![occurrence],
            }),
        }
    }

    if groups.len() == 1 {
        let group = groups.remove(0);
        Verdict::Consistent {
            value: group.occurrences[0].value.clone(),
            occurrences: group.occurrences,
        }
    } else {
        Verdict::Inconsistent { groups }
    }
}

fn identity_mismatches(
    identity: &VerifiedIdentity,
    class: FormatClass,
    occurrences: &[Occurrence],
) -> Vec<IdentityMismatch> {
    let expected = match class {
        FormatClass::Name => FormatClass::Name.normalize(&identity.name),
        FormatClass::NationalId => identity.birth_date_yymmdd(),
        FormatClass::Phone => return Vec::new(),
    };
    if expected.is_empty() {
        return Vec::new();
    }

    occurrences
        .iter()
        .filter(|o| match class {
            FormatClass::NationalId => !o.normalized.starts_with(&expected),
            _ => o.normalized != expected,
        })
        .map(|o| IdentityMismatch {
            class,
            occurrence: o.clone(),
            expected: expected.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_rules() {
        assert_eq!(FormatClass::Phone.normalize("010-1234 5678"), "01012345678");
        assert_eq!(FormatClass::NationalId.normalize("900101-1234567"), "9001011234567");
        assert_eq!(FormatClass::Name.normalize(" Hong  Gil Dong "), "honggildong");
    }
}
