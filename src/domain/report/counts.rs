//! Compliance counts derived from a response ledger.

use serde::{Deserialize, Serialize};

use crate::domain::questionnaire::{AnswerType, ResponseLedger};

/// Number of answers per [`AnswerType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceCounts {
    pub compliant_count: usize,
    pub non_compliant_count: usize,
    pub not_applicable_count: usize,
}

impl ComplianceCounts {
    pub fn tally(ledger: &ResponseLedger) -> Self {
        ledger
            .iter()
            .fold(Self::default(), |mut counts, (_, answer)| {
                match answer {
                    AnswerType::Compliant => counts.compliant_count += 1,
                    AnswerType::NonCompliant => counts.non_compliant_count += 1,
                    AnswerType::NotApplicable => counts.not_applicable_count += 1,
                }
                counts
            })
    }

    pub fn total(&self) -> usize {
        self.compliant_count + self.non_compliant_count + self.not_applicable_count
    }

    /// Share of applicable answers that are compliant, as a percentage.
    ///
    /// Returns 0.0 when every answer is not applicable.
    pub fn compliance_percentage(&self) -> f64 {
        let applicable = self.compliant_count + self.non_compliant_count;
        if applicable == 0 {
            return 0.0;
        }
        self.compliant_count as f64 / applicable as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::QuestionId;
    use proptest::prelude::*;

    fn ledger(answers: &[AnswerType]) -> ResponseLedger {
        answers
            .iter()
            .enumerate()
            .map(|(i, a)| (QuestionId::new(format!("q{}", i)).unwrap(), *a))
            .collect()
    }

    #[test]
    fn percentage_ignores_not_applicable() {
        let counts = ComplianceCounts::tally(&ledger(&[
            AnswerType::Compliant,
            AnswerType::Compliant,
            AnswerType::Compliant,
            AnswerType::NonCompliant,
            AnswerType::NotApplicable,
        ]));
        assert_eq!(counts.compliance_percentage(), 75.0);
    }

    #[test]
    fn percentage_is_zero_without_applicable_answers() {
        let counts = ComplianceCounts::tally(&ledger(&[AnswerType::NotApplicable]));
        assert_eq!(counts.compliance_percentage(), 0.0);
    }

    proptest! {
        #[test]
        fn counts_sum_to_number_of_responses(
            answers in prop::collection::vec(
                prop_oneof![
                    Just(AnswerType::Compliant),
                    Just(AnswerType::NonCompliant),
                    Just(AnswerType::NotApplicable),
                ],
                0..50,
            )
        ) {
            let ledger = ledger(&answers);
            let counts = ComplianceCounts::tally(&ledger);
            prop_assert_eq!(counts.total(), ledger.len());
        }
    }
}
