// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The number of questions in a WOCA survey.
pub const NUM_QUESTIONS: usize = 36;

/// The number of questions attached to each category.
pub const QUESTIONS_PER_CATEGORY: usize = 9;

/// The four WOCA categories ("zones").
///
/// The declaration order is also the priority order used to break ties:
/// war > opportunity > comfort > apathy.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum Category {
    War,
    Opportunity,
    Comfort,
    Apathy,
}

impl Category {
    /// All the categories, in priority order.
    pub const ALL: [Category; 4] = [
        Category::War,
        Category::Opportunity,
        Category::Comfort,
        Category::Apathy,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::War => "war",
            Category::Opportunity => "opportunity",
            Category::Comfort => "comfort",
            Category::Apathy => "apathy",
        }
    }

    pub fn from_name(name: &str) -> Option<Category> {
        Category::ALL.iter().find(|c| c.name() == name).cloned()
    }

    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The answers of one participant.
///
/// Responses are indexed by question, starting at 1. A missing response
/// means that the question was not answered.
///
/// In most cases, it is easier to use the builder API, which validates the
/// values before they reach the scoring functions.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Participant {
    pub id: String,
    pub name: String,
    pub responses: [Option<i64>; NUM_QUESTIONS],
}

impl Participant {
    pub fn new(id: &str, name: &str) -> Participant {
        Participant {
            id: id.to_string(),
            name: name.to_string(),
            responses: [None; NUM_QUESTIONS],
        }
    }

    /// The response for a question (1-based). None if the question was not answered
    /// or does not exist.
    pub fn response(&self, question: u8) -> Option<i64> {
        if question == 0 {
            return None;
        }
        self.responses
            .get((question - 1) as usize)
            .cloned()
            .flatten()
    }

    pub fn answered_count(&self) -> u32 {
        self.responses.iter().filter(|r| r.is_some()).count() as u32
    }
}

/// The assignment of the 36 questions to the four categories.
///
/// `questions[c]` lists the 1-based question indices of the category `c`,
/// following the order of `Category::ALL`.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct QuestionMap {
    pub questions: [[u8; QUESTIONS_PER_CATEGORY]; 4],
}

impl QuestionMap {
    /// The questions cycle through the categories in priority order:
    /// 1 is war, 2 is opportunity, 3 is comfort, 4 is apathy, 5 is war again, etc.
    pub const DEFAULT: QuestionMap = QuestionMap {
        questions: [
            [1, 5, 9, 13, 17, 21, 25, 29, 33],
            [2, 6, 10, 14, 18, 22, 26, 30, 34],
            [3, 7, 11, 15, 19, 23, 27, 31, 35],
            [4, 8, 12, 16, 20, 24, 28, 32, 36],
        ],
    };

    pub fn questions_for(&self, category: Category) -> &[u8; QUESTIONS_PER_CATEGORY] {
        &self.questions[category.index()]
    }

    /// The category a question belongs to.
    pub fn category_of(&self, question: u8) -> Option<Category> {
        Category::ALL
            .iter()
            .find(|c| self.questions_for(**c).contains(&question))
            .cloned()
    }

    /// Checks that the map is a partition of the questions 1..=36.
    pub fn validate(&self) -> Result<(), ScoringErrors> {
        let mut seen = [false; NUM_QUESTIONS];
        for qs in self.questions.iter() {
            for q in qs.iter() {
                if *q == 0 || *q as usize > NUM_QUESTIONS {
                    return Err(ScoringErrors::InvalidQuestionMap {
                        question: *q,
                        reason: "out of range",
                    });
                }
                let slot = &mut seen[(*q - 1) as usize];
                if *slot {
                    return Err(ScoringErrors::InvalidQuestionMap {
                        question: *q,
                        reason: "assigned more than once",
                    });
                }
                *slot = true;
            }
        }
        // 4 x 9 distinct values in 1..=36: every question is covered.
        Ok(())
    }
}

// ******** Output data structures *********

/// Normalized scores for each category, in [0, 1] for responses in [1, 5].
#[derive(PartialEq, Debug, Clone, Copy, Default)]
pub struct CategoryScores {
    pub war: f64,
    pub opportunity: f64,
    pub comfort: f64,
    pub apathy: f64,
}

impl CategoryScores {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::War => self.war,
            Category::Opportunity => self.opportunity,
            Category::Comfort => self.comfort,
            Category::Apathy => self.apathy,
        }
    }

    pub fn set(&mut self, category: Category, value: f64) {
        match category {
            Category::War => self.war = value,
            Category::Opportunity => self.opportunity = value,
            Category::Comfort => self.comfort = value,
            Category::Apathy => self.apathy = value,
        }
    }

    /// The scores in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        Category::ALL.iter().map(move |c| (*c, self.get(*c)))
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ZoneResult {
    /// None when no response carries any signal, or when a tie is not resolved.
    pub dominant_zone: Option<Category>,
    pub is_tie: bool,
    /// The categories sharing the maximum score, in priority order.
    /// Empty when there is no tie.
    pub tied_categories: Vec<Category>,
}

/// The result for one participant.
#[derive(PartialEq, Debug, Clone)]
pub struct ParticipantResult {
    pub id: String,
    pub name: String,
    pub answered: u32,
    pub scores: CategoryScores,
    pub zone: ZoneResult,
    /// The categories for which no question was answered. Their score is 0.
    pub missing: Vec<Category>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct GroupResult {
    pub scores: CategoryScores,
    pub zone: ZoneResult,
    pub participants: Vec<ParticipantResult>,
    /// How many participants have each category as dominant zone, in priority order.
    pub zone_distribution: Vec<(Category, u64)>,
}

/// Errors that prevent the scoring from completing successfully.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ScoringErrors {
    /// Not enough participants to compute group results.
    InsufficientData { required: u32, found: u32 },
    InvalidResponseValue {
        participant: String,
        question: u8,
        value: i64,
    },
    InvalidQuestionMap { question: u8, reason: &'static str },
    UnknownQuestion { question: u8 },
    /// The same question is answered twice by a participant.
    DuplicateQuestion { participant: String, question: u8 },
}

impl Error for ScoringErrors {}

impl Display for ScoringErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoringErrors::InsufficientData { required, found } => write!(
                f,
                "not enough responses: {} participants required, found {}",
                required, found
            ),
            ScoringErrors::InvalidResponseValue {
                participant,
                question,
                value,
            } => write!(
                f,
                "participant {}: invalid response {} to question {}",
                participant, value, question
            ),
            ScoringErrors::InvalidQuestionMap { question, reason } => {
                write!(f, "invalid question map: question {} {}", question, reason)
            }
            ScoringErrors::UnknownQuestion { question } => {
                write!(f, "unknown question {}", question)
            }
            ScoringErrors::DuplicateQuestion {
                participant,
                question,
            } => write!(
                f,
                "participant {}: question {} is answered more than once",
                participant, question
            ),
        }
    }
}

// ********* Configuration **********

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum TieBreakMode {
    /// war > opportunity > comfort > apathy
    PriorityOrder,
    /// A tie has no dominant zone.
    NoDominant,
    // The choice uses a cryptographic hash on the category names, so that it is
    // hard to guess in advance but reproducible for a given seed.
    Random(u32),
}

/// What to do with responses outside of the [1, 5] scale.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum InvalidResponseRule {
    Reject,
    /// The response is treated as not answered.
    Skip,
    /// The response is kept as is and takes part in the averages.
    Accept,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ScoringRules {
    pub tiebreak_mode: TieBreakMode,
    /// Below this number of participants, no group result is computed.
    /// A value of 0 behaves like 1.
    pub minimum_participants: u32,
    pub invalid_response_rule: InvalidResponseRule,
    pub question_map: QuestionMap,
}

impl ScoringRules {
    pub const DEFAULT_RULES: ScoringRules = ScoringRules {
        tiebreak_mode: TieBreakMode::PriorityOrder,
        minimum_participants: 3,
        invalid_response_rule: InvalidResponseRule::Reject,
        question_map: QuestionMap::DEFAULT,
    };
}

/// The lowest valid response.
pub const MIN_RESPONSE: i64 = 1;
/// The highest valid response, also used to normalize the scores.
pub const MAX_RESPONSE: i64 = 5;
