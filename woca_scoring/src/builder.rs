pub use crate::config::*;
use log::warn;

/// A builder for adding participants.
///
/// This is the place where the responses get validated before scoring.
///
/// ```
/// pub use woca_scoring::builder::Builder;
/// pub use woca_scoring::ScoringRules;
/// # use woca_scoring::ScoringErrors;
///
/// let mut builder = Builder::new(&ScoringRules::DEFAULT_RULES)?;
///
/// builder.add_participant_simple("p1", &[5; 36])?;
/// builder.add_participant_simple("p2", &[3; 36])?;
/// builder.add_participant_simple("p3", &[1; 36])?;
///
/// let group = builder.run()?;
/// assert_eq!(group.participants.len(), 3);
///
/// # Ok::<(), ScoringErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: ScoringRules,
    pub(crate) _participants: Vec<Participant>,
}

impl Builder {
    pub fn new(rules: &ScoringRules) -> Result<Builder, ScoringErrors> {
        rules.question_map.validate()?;
        Ok(Builder {
            _rules: rules.clone(),
            _participants: Vec::new(),
        })
    }

    /// Adds a participant who answered the questions in order, starting with
    /// question 1. The display name is the id.
    ///
    /// It is the simplest use case for most cases.
    pub fn add_participant_simple(
        &mut self,
        id: &str,
        responses: &[i64],
    ) -> Result<(), ScoringErrors> {
        let answers: Vec<(u8, Option<i64>)> = responses
            .iter()
            .enumerate()
            .map(|(idx, r)| ((idx + 1) as u8, Some(*r)))
            .collect();
        self.add_participant(id, id, &answers)
    }

    /// Adds a participant.
    ///
    /// responses: pairs of (question index starting at 1, response). Questions that
    /// are not listed, or listed with None, are not answered. A question may only be
    /// listed once.
    pub fn add_participant(
        &mut self,
        id: &str,
        name: &str,
        responses: &[(u8, Option<i64>)],
    ) -> Result<(), ScoringErrors> {
        let mut p = Participant::new(id, name);
        let mut seen = [false; NUM_QUESTIONS];
        for (question, response) in responses.iter() {
            if *question == 0 || *question as usize > NUM_QUESTIONS {
                return Err(ScoringErrors::UnknownQuestion {
                    question: *question,
                });
            }
            let idx = (*question - 1) as usize;
            if seen[idx] {
                return Err(ScoringErrors::DuplicateQuestion {
                    participant: id.to_string(),
                    question: *question,
                });
            }
            seen[idx] = true;
            p.responses[idx] = *response;
        }
        self.add_participant_2(&p)
    }

    /// Adds an already assembled participant, applying the rule for invalid responses.
    pub fn add_participant_2(&mut self, participant: &Participant) -> Result<(), ScoringErrors> {
        let mut p = participant.clone();
        for (idx, slot) in p.responses.iter_mut().enumerate() {
            let value = match slot {
                Some(v) if !(MIN_RESPONSE..=MAX_RESPONSE).contains(&*v) => *v,
                _ => continue,
            };
            let question = (idx + 1) as u8;
            match self._rules.invalid_response_rule {
                InvalidResponseRule::Reject => {
                    return Err(ScoringErrors::InvalidResponseValue {
                        participant: p.id.clone(),
                        question,
                        value,
                    });
                }
                InvalidResponseRule::Skip => {
                    warn!(
                        "add_participant: participant {}: skipping response {} to question {}",
                        p.id, value, question
                    );
                    *slot = None;
                }
                InvalidResponseRule::Accept => {}
            }
        }
        self._participants.push(p);
        Ok(())
    }

    pub fn participants(&self) -> &[Participant] {
        &self._participants
    }

    pub fn rules(&self) -> &ScoringRules {
        &self._rules
    }

    /// The individual results, available even when the group is too small.
    pub fn evaluate(&self) -> Vec<ParticipantResult> {
        self._participants
            .iter()
            .map(|p| crate::evaluate_participant(p, &self._rules))
            .collect()
    }

    pub fn run(&self) -> Result<GroupResult, ScoringErrors> {
        crate::run_group_analysis(&self._participants, &self._rules)
    }
}
