mod config;
use log::{debug, info, warn};

pub mod builder;
pub mod manual;

pub use crate::config::*;

// **** Thresholds for the overall score ****

const OPPORTUNITY_THRESHOLD: f64 = 4.2;
const COMFORT_THRESHOLD: f64 = 3.4;
const APATHY_THRESHOLD: f64 = 2.6;

/// Computes the normalized category scores of a participant.
///
/// Each category is the mean of the answered questions of this category
/// (unanswered questions do not count in the denominator), divided by 5.
/// A category without any answered question scores 0 and is returned in the
/// list of missing categories.
///
/// The values are not validated: the builder is in charge of that.
pub fn score_participant(
    participant: &Participant,
    question_map: &QuestionMap,
) -> (CategoryScores, Vec<Category>) {
    let mut scores = CategoryScores::default();
    let mut missing: Vec<Category> = Vec::new();
    for category in Category::ALL.iter() {
        match category_mean(participant, question_map.questions_for(*category)) {
            Some(mean) => {
                scores.set(*category, mean / (MAX_RESPONSE as f64));
            }
            None => {
                warn!(
                    "score_participant: participant {}: no answer for category {}",
                    participant.id, category
                );
                missing.push(*category);
            }
        }
    }
    debug!(
        "score_participant: participant {}: scores: {:?}",
        participant.id, scores
    );
    (scores, missing)
}

// The mean on the 1-5 scale of the answered questions, if any.
fn category_mean(participant: &Participant, questions: &[u8]) -> Option<f64> {
    let answers: Vec<i64> = questions
        .iter()
        .filter_map(|q| participant.response(*q))
        .collect();
    if answers.is_empty() {
        None
    } else {
        let total: i64 = answers.iter().sum();
        Some(total as f64 / answers.len() as f64)
    }
}

/// Finds the dominant zone for a set of scores.
///
/// The comparison is exact: two categories are tied only if their scores are
/// exactly equal.
pub fn classify_zone(scores: &CategoryScores, tiebreak_mode: TieBreakMode) -> ZoneResult {
    let max_score = scores
        .iter()
        .map(|(_, s)| s)
        .fold(f64::NEG_INFINITY, f64::max);
    let leaders: Vec<Category> = scores
        .iter()
        .filter_map(|(c, s)| if s == max_score { Some(c) } else { None })
        .collect();
    debug!(
        "classify_zone: max score: {:?} leaders: {:?}",
        max_score, leaders
    );

    match leaders.as_slice() {
        [single] => ZoneResult {
            dominant_zone: Some(*single),
            is_tie: false,
            tied_categories: Vec::new(),
        },
        _ => ZoneResult {
            dominant_zone: break_tie(&leaders, tiebreak_mode),
            is_tie: true,
            tied_categories: leaders,
        },
    }
}

// Nothing was answered: all the categories are tied and there is no dominant zone.
fn unanswered_zone() -> ZoneResult {
    ZoneResult {
        dominant_zone: None,
        is_tie: true,
        tied_categories: Category::ALL.to_vec(),
    }
}

fn has_answers(missing: &[Category]) -> bool {
    missing.len() < Category::ALL.len()
}

fn break_tie(tied: &[Category], tiebreak_mode: TieBreakMode) -> Option<Category> {
    match tiebreak_mode {
        // The categories are already in priority order.
        TieBreakMode::PriorityOrder => tied.first().cloned(),
        TieBreakMode::NoDominant => None,
        TieBreakMode::Random(seed) => category_permutation_crypto(tied, seed).first().cloned(),
    }
}

/// Generates a "random" permutation of the categories. Random in this context means hard to guess in advance.
fn category_permutation_crypto(categories: &[Category], seed: u32) -> Vec<Category> {
    let mut data: Vec<(Category, String)> = categories
        .iter()
        .map(|c| {
            let key = format!("{:08}{}", seed, c.name());
            (*c, sha256::digest(key.as_str()))
        })
        .collect();
    data.sort_by_key(|p| p.1.clone());
    debug!("category_permutation_crypto: seed {}: {:?}", seed, data);
    data.iter().map(|p| p.0).collect()
}

/// Classifies a single overall score on the 1-5 scale.
///
/// This is used when only one aggregated score is available instead of the
/// four category scores.
pub fn classify_overall_score(score: f64) -> Category {
    if score >= OPPORTUNITY_THRESHOLD {
        Category::Opportunity
    } else if score >= COMFORT_THRESHOLD {
        Category::Comfort
    } else if score >= APATHY_THRESHOLD {
        Category::Apathy
    } else {
        Category::War
    }
}

/// Scores and classifies one participant.
pub fn evaluate_participant(participant: &Participant, rules: &ScoringRules) -> ParticipantResult {
    let (scores, missing) = score_participant(participant, &rules.question_map);
    let zone = if has_answers(&missing) {
        classify_zone(&scores, rules.tiebreak_mode)
    } else {
        unanswered_zone()
    };
    ParticipantResult {
        id: participant.id.clone(),
        name: participant.name.clone(),
        answered: participant.answered_count(),
        scores,
        zone,
        missing,
    }
}

/// The unweighted mean of the scores of each category.
///
/// Fails if there are fewer scores than `minimum_participants` (at least 1).
pub fn aggregate_scores(
    scores: &[CategoryScores],
    minimum_participants: u32,
) -> Result<CategoryScores, ScoringErrors> {
    let required = minimum_participants.max(1);
    let found = scores.len() as u32;
    if found < required {
        return Err(ScoringErrors::InsufficientData { required, found });
    }
    let mut res = CategoryScores::default();
    for category in Category::ALL.iter() {
        let total: f64 = scores.iter().map(|s| s.get(*category)).sum();
        res.set(*category, total / scores.len() as f64);
    }
    Ok(res)
}

/// Runs the full analysis for a group of participants.
///
/// Arguments:
/// * `participants` the participants of the group
/// * `rules` the rules that govern the scoring
///
/// Returns `ScoringErrors::InsufficientData` if the group is smaller than
/// `rules.minimum_participants`. The individual results are still available
/// through `evaluate_participant` in that case.
pub fn run_group_analysis(
    participants: &[Participant],
    rules: &ScoringRules,
) -> Result<GroupResult, ScoringErrors> {
    info!(
        "Processing {:?} participants, rules: {:?}",
        participants.len(),
        rules
    );
    rules.question_map.validate()?;

    let results: Vec<ParticipantResult> = participants
        .iter()
        .map(|p| evaluate_participant(p, rules))
        .collect();
    for r in results.iter() {
        info!(
            "Participant: {}: {:?} tie: {}",
            r.id, r.zone.dominant_zone, r.zone.is_tie
        );
    }

    let individual_scores: Vec<CategoryScores> = results.iter().map(|r| r.scores).collect();
    let scores = aggregate_scores(&individual_scores, rules.minimum_participants)?;
    let zone = if results.iter().any(|r| has_answers(&r.missing)) {
        classify_zone(&scores, rules.tiebreak_mode)
    } else {
        unanswered_zone()
    };
    info!("Group scores: {:?} zone: {:?}", scores, zone);

    let zone_distribution = zone_distribution(&results);
    Ok(GroupResult {
        scores,
        zone,
        participants: results,
        zone_distribution,
    })
}

fn zone_distribution(results: &[ParticipantResult]) -> Vec<(Category, u64)> {
    Category::ALL
        .iter()
        .map(|c| {
            let count = results
                .iter()
                .filter(|r| r.zone.dominant_zone == Some(*c))
                .count() as u64;
            (*c, count)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    // A participant answering `value` to all the questions of each category.
    fn uniform(id: &str, war: i64, opportunity: i64, comfort: i64, apathy: i64) -> Participant {
        let mut p = Participant::new(id, id);
        let map = QuestionMap::DEFAULT;
        for (c, v) in [
            (Category::War, war),
            (Category::Opportunity, opportunity),
            (Category::Comfort, comfort),
            (Category::Apathy, apathy),
        ] {
            for q in map.questions_for(c) {
                p.responses[(*q - 1) as usize] = Some(v);
            }
        }
        p
    }

    fn scores(war: f64, opportunity: f64, comfort: f64, apathy: f64) -> CategoryScores {
        CategoryScores {
            war,
            opportunity,
            comfort,
            apathy,
        }
    }

    #[test]
    fn default_question_map_is_a_partition() {
        assert_eq!(QuestionMap::DEFAULT.validate(), Ok(()));
        assert_eq!(QuestionMap::DEFAULT.category_of(1), Some(Category::War));
        assert_eq!(QuestionMap::DEFAULT.category_of(36), Some(Category::Apathy));
        assert_eq!(QuestionMap::DEFAULT.category_of(37), None);
    }

    #[test]
    fn question_map_rejects_duplicates() {
        let mut map = QuestionMap::DEFAULT;
        map.questions[1][0] = 1;
        assert_eq!(
            map.validate(),
            Err(ScoringErrors::InvalidQuestionMap {
                question: 1,
                reason: "assigned more than once"
            })
        );
        map.questions[1][0] = 37;
        assert!(matches!(
            map.validate(),
            Err(ScoringErrors::InvalidQuestionMap { question: 37, .. })
        ));
    }

    #[test]
    fn war_dominant_participant() {
        init();
        let p = uniform("p1", 5, 1, 1, 1);
        let res = evaluate_participant(&p, &ScoringRules::DEFAULT_RULES);
        assert_eq!(res.scores, scores(1.0, 0.2, 0.2, 0.2));
        assert_eq!(res.zone.dominant_zone, Some(Category::War));
        assert!(!res.zone.is_tie);
        assert!(res.zone.tied_categories.is_empty());
        assert!(res.missing.is_empty());
        assert_eq!(res.answered, 36);
    }

    #[test]
    fn mean_only_counts_answered_questions() {
        let mut p = Participant::new("p1", "Dana");
        // Two war questions answered, the others left blank.
        p.responses[0] = Some(4);
        p.responses[4] = Some(2);
        let (s, missing) = score_participant(&p, &QuestionMap::DEFAULT);
        assert_eq!(s.war, 3.0 / 5.0);
        assert_eq!(s.opportunity, 0.0);
        assert_eq!(
            missing,
            vec![Category::Opportunity, Category::Comfort, Category::Apathy]
        );
    }

    #[test]
    fn scoring_is_deterministic() {
        let mut p = uniform("p1", 3, 4, 2, 5);
        p.responses[10] = None;
        let first = score_participant(&p, &QuestionMap::DEFAULT);
        let second = score_participant(&p, &QuestionMap::DEFAULT);
        assert_eq!(first, second);
    }

    #[test]
    fn engine_does_not_validate_values() {
        let p = uniform("p1", 7, 1, 1, 1);
        let (s, _) = score_participant(&p, &QuestionMap::DEFAULT);
        assert_eq!(s.war, 7.0 / 5.0);
    }

    #[test]
    fn empty_participant_is_a_full_tie_without_zone() {
        init();
        let p = Participant::new("p0", "Nobody");
        let res = evaluate_participant(&p, &ScoringRules::DEFAULT_RULES);
        assert_eq!(res.scores, scores(0.0, 0.0, 0.0, 0.0));
        assert!(res.zone.is_tie);
        assert_eq!(res.zone.tied_categories, Category::ALL.to_vec());
        assert_eq!(res.zone.dominant_zone, None);
        assert_eq!(res.missing, Category::ALL.to_vec());
        assert_eq!(res.answered, 0);
    }

    #[test]
    fn tie_uses_priority_order() {
        let z = classify_zone(&scores(0.4, 0.8, 0.8, 0.2), TieBreakMode::PriorityOrder);
        assert!(z.is_tie);
        assert_eq!(
            z.tied_categories,
            vec![Category::Opportunity, Category::Comfort]
        );
        assert_eq!(z.dominant_zone, Some(Category::Opportunity));
    }

    #[test]
    fn tie_without_dominant() {
        let z = classify_zone(&scores(0.6, 0.6, 0.2, 0.6), TieBreakMode::NoDominant);
        assert!(z.is_tie);
        assert_eq!(
            z.tied_categories,
            vec![Category::War, Category::Opportunity, Category::Apathy]
        );
        assert_eq!(z.dominant_zone, None);
    }

    #[test]
    fn random_tiebreak_is_reproducible() {
        let s = scores(0.6, 0.6, 0.6, 0.6);
        let z1 = classify_zone(&s, TieBreakMode::Random(42));
        let z2 = classify_zone(&s, TieBreakMode::Random(42));
        assert_eq!(z1, z2);
        let d = z1.dominant_zone.unwrap();
        assert!(z1.tied_categories.contains(&d));
    }

    #[test]
    fn random_tiebreak_stays_within_the_tie() {
        let s = scores(0.2, 0.8, 0.4, 0.8);
        for seed in 0..20 {
            let z = classify_zone(&s, TieBreakMode::Random(seed));
            let d = z.dominant_zone.unwrap();
            assert!(d == Category::Opportunity || d == Category::Apathy);
        }
    }

    #[test]
    fn no_tie_has_a_unique_maximum() {
        let all = [0.0, 0.2, 0.4, 0.6, 0.8, 1.0];
        for w in all {
            for o in all {
                for c in all {
                    for a in all {
                        let s = scores(w, o, c, a);
                        let z = classify_zone(&s, TieBreakMode::PriorityOrder);
                        let max = s.iter().map(|(_, v)| v).fold(0.0, f64::max);
                        if !z.is_tie {
                            let at_max = s.iter().filter(|(_, v)| *v == max).count();
                            assert_eq!(at_max, 1);
                            assert_eq!(s.get(z.dominant_zone.unwrap()), max);
                        } else {
                            assert!(z.tied_categories.len() > 1);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn zero_scores_are_classified_when_answered() {
        let z = classify_zone(&scores(0.0, 0.0, 0.0, 0.0), TieBreakMode::PriorityOrder);
        assert!(z.is_tie);
        assert_eq!(z.dominant_zone, Some(Category::War));

        let mut p = uniform("p0", 0, 0, 0, 0);
        p.responses[0] = None;
        let res = evaluate_participant(&p, &ScoringRules::DEFAULT_RULES);
        assert_eq!(res.zone.dominant_zone, Some(Category::War));
    }

    #[test]
    fn unanswered_group_has_no_zone() {
        let group = vec![
            Participant::new("a", "a"),
            Participant::new("b", "b"),
            Participant::new("c", "c"),
        ];
        let res = run_group_analysis(&group, &ScoringRules::DEFAULT_RULES).unwrap();
        assert_eq!(res.zone.dominant_zone, None);
        assert_eq!(res.zone.tied_categories, Category::ALL.to_vec());
    }

    #[test]
    fn overall_score_thresholds() {
        assert_eq!(classify_overall_score(4.5), Category::Opportunity);
        assert_eq!(classify_overall_score(4.2), Category::Opportunity);
        assert_eq!(classify_overall_score(3.4), Category::Comfort);
        assert_eq!(classify_overall_score(3.0), Category::Apathy);
        assert_eq!(classify_overall_score(2.6), Category::Apathy);
        assert_eq!(classify_overall_score(2.0), Category::War);
    }

    #[test]
    fn identical_participants_keep_their_scores() {
        init();
        let group: Vec<Participant> = (0..4)
            .map(|i| uniform(&format!("p{}", i), 2, 5, 3, 4))
            .collect();
        let res = run_group_analysis(&group, &ScoringRules::DEFAULT_RULES).unwrap();
        assert_eq!(res.scores, res.participants[0].scores);
        assert_eq!(res.zone.dominant_zone, Some(Category::Opportunity));
        assert_eq!(
            res.zone_distribution,
            vec![
                (Category::War, 0),
                (Category::Opportunity, 4),
                (Category::Comfort, 0),
                (Category::Apathy, 0)
            ]
        );
    }

    #[test]
    fn opposite_participants_tie() {
        let group = vec![uniform("high", 5, 5, 5, 5), uniform("low", 1, 1, 1, 1)];
        let rules = ScoringRules {
            minimum_participants: 2,
            ..ScoringRules::DEFAULT_RULES
        };
        let res = run_group_analysis(&group, &rules).unwrap();
        assert_eq!(res.scores, scores(0.6, 0.6, 0.6, 0.6));
        assert!(res.zone.is_tie);
        assert_eq!(res.zone.tied_categories, Category::ALL.to_vec());
    }

    #[test]
    fn small_group_is_insufficient() {
        let group = vec![uniform("a", 5, 5, 5, 5), uniform("b", 1, 1, 1, 1)];
        let res = run_group_analysis(&group, &ScoringRules::DEFAULT_RULES);
        assert_eq!(
            res,
            Err(ScoringErrors::InsufficientData {
                required: 3,
                found: 2
            })
        );
    }

    #[test]
    fn empty_group_never_divides_by_zero() {
        assert_eq!(
            aggregate_scores(&[], 0),
            Err(ScoringErrors::InsufficientData {
                required: 1,
                found: 0
            })
        );
    }

    #[test]
    fn distribution_skips_participants_without_zone() {
        let group = vec![
            uniform("a", 5, 1, 1, 1),
            uniform("b", 1, 1, 5, 1),
            Participant::new("c", "c"),
        ];
        let res = run_group_analysis(&group, &ScoringRules::DEFAULT_RULES).unwrap();
        let counted: u64 = res.zone_distribution.iter().map(|(_, n)| n).sum();
        assert_eq!(counted, 2);
        assert_eq!(res.participants.len(), 3);
    }

    #[test]
    fn custom_question_map() {
        let mut map = QuestionMap::DEFAULT;
        // Swap question 1 (war) and question 2 (opportunity).
        map.questions[0][0] = 2;
        map.questions[1][0] = 1;
        assert_eq!(map.validate(), Ok(()));
        let mut p = Participant::new("p", "p");
        p.responses[0] = Some(5);
        let (s, _) = score_participant(&p, &map);
        assert_eq!(s.opportunity, 1.0);
        assert_eq!(s.war, 0.0);
    }
}
