use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use woca_scoring::builder::Builder;
use woca_scoring::*;

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::survey::config_reader::*;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_excel;
mod io_json;

#[derive(Debug, Snafu)]
pub enum SurveyError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Missing worksheet {name} in {path}"))]
    MissingWorksheet { name: String, path: String },
    #[snafu(display("The spreadsheet has no data"))]
    EmptyExcel {},
    #[snafu(display("Row {lineno}: unexpected cell {content}"))]
    ExcelWrongCellType { lineno: u64, content: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON: {source}"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Could not read a row or column index in the configuration"))]
    ParsingJsonNumber {},
    #[snafu(display("The JSON rows must be an array of objects"))]
    JsonRowsNotObjects {},
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading a CSV line: {source}"))]
    CsvLineParse { source: csv::Error },
    #[snafu(display("Line {lineno} is too short"))]
    CsvLineTooShort { lineno: usize },
    #[snafu(display("Missing column {column} in the header"))]
    MissingColumn { column: String },
    #[snafu(display(
        "Participant {}: could not read the response {:?} to question {}",
        participant,
        content,
        question
    ))]
    InvalidResponse {
        participant: String,
        question: usize,
        content: String,
    },
    #[snafu(display("{source}"))]
    Scoring { source: ScoringErrors },
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("Error writing the summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type SurveyResult<T> = Result<T, SurveyError>;

/// A row of responses, as parsed by the readers.
/// This is before validating the values and applying the rules for invalid responses.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedResponse {
    pub id: Option<String>,
    pub name: Option<String>,
    /// The raw answers, starting with question 1. Empty strings are unanswered questions.
    pub answers: Vec<String>,
}

fn scores_to_json(scores: &CategoryScores) -> JSValue {
    let mut js: JSMap<String, JSValue> = JSMap::new();
    for (category, score) in scores.iter() {
        js.insert(category.name().to_string(), json!(score));
    }
    JSValue::Object(js)
}

fn zone_to_json(zone: &ZoneResult) -> JSValue {
    let tied: Vec<&str> = zone.tied_categories.iter().map(|c| c.name()).collect();
    json!({
        "dominantZone": zone.dominant_zone.map(|c| c.name()),
        "isTie": zone.is_tie,
        "tiedCategories": tied
    })
}

fn participant_to_json(pr: &ParticipantResult) -> JSValue {
    let missing: Vec<&str> = pr.missing.iter().map(|c| c.name()).collect();
    json!({
        "id": pr.id,
        "name": pr.name,
        "answered": pr.answered,
        "scores": scores_to_json(&pr.scores),
        "zone": zone_to_json(&pr.zone),
        "missingCategories": missing
    })
}

fn group_to_json(group: &GroupResult) -> JSValue {
    let mut distribution: JSMap<String, JSValue> = JSMap::new();
    for (category, count) in group.zone_distribution.iter() {
        distribution.insert(category.name().to_string(), json!(count));
    }
    json!({
        "scores": scores_to_json(&group.scores),
        "zone": zone_to_json(&group.zone),
        "zoneDistribution": distribution
    })
}

fn tiebreak_mode_name(mode: TieBreakMode) -> String {
    match mode {
        TieBreakMode::PriorityOrder => "priorityOrder".to_string(),
        TieBreakMode::NoDominant => "noDominant".to_string(),
        TieBreakMode::Random(seed) => format!("random({})", seed),
    }
}

fn build_summary_js(
    settings: &OutputSettings,
    rules: &ScoringRules,
    participants: &[ParticipantResult],
    group: &Result<GroupResult, ScoringErrors>,
) -> JSValue {
    let c = OutputConfig {
        survey: settings.survey_name.clone(),
        date: settings.survey_date.clone(),
        organization: settings.organization.clone(),
        minimum_participants: rules.minimum_participants,
        tiebreak_mode: tiebreak_mode_name(rules.tiebreak_mode),
    };
    let participants_js: Vec<JSValue> = participants.iter().map(participant_to_json).collect();
    let (group_js, warning_js) = match group {
        Result::Ok(g) => (group_to_json(g), JSValue::Null),
        Result::Err(ScoringErrors::InsufficientData { required, found }) => (
            JSValue::Null,
            json!({
                "type": "insufficientData",
                "required": required,
                "found": found
            }),
        ),
        Result::Err(e) => (
            JSValue::Null,
            json!({ "type": "error", "message": e.to_string() }),
        ),
    };
    json!({
        "config": c,
        "results": {
            "participantCount": participants.len(),
            "participants": participants_js,
            "group": group_js,
            "warning": warning_js
        }
    })
}

fn validate_rules(survey_rules: &SurveyRules) -> SurveyResult<ScoringRules> {
    let question_map = match &survey_rules.question_map {
        Some(qm) => qm.to_question_map()?,
        None => QuestionMap::DEFAULT,
    };
    Ok(ScoringRules {
        tiebreak_mode: survey_rules.tiebreak_mode()?,
        minimum_participants: survey_rules.minimum_participants()?,
        invalid_response_rule: survey_rules.invalid_response_rule()?,
        question_map,
    })
}

// Reads one answer. Blank cells are not answered.
fn parse_response(participant: &str, question: usize, s: &str) -> SurveyResult<Option<i64>> {
    let t = s.trim();
    if t.is_empty() {
        return Ok(None);
    }
    if let Result::Ok(x) = t.parse::<i64>() {
        return Ok(Some(x));
    }
    match t.parse::<f64>() {
        // Spreadsheets tend to store integers as floats.
        Result::Ok(f) if f.fract() == 0.0 && f.is_finite() => Ok(Some(f as i64)),
        _ => InvalidResponseSnafu {
            participant,
            question,
            content: s,
        }
        .fail(),
    }
}

fn validate_responses(
    parsed_responses: &[ParsedResponse],
    source: &FileSource,
    builder: &mut Builder,
) -> SurveyResult<()> {
    let default_id = io_common::make_default_id(&source.file_path);
    for (idx, pr) in parsed_responses.iter().enumerate() {
        let id = match pr.id.as_deref() {
            Some(s) if !s.trim().is_empty() => s.trim().to_string(),
            _ => default_id(idx + 1),
        };
        let name = match pr.name.as_deref() {
            Some(s) if !s.trim().is_empty() => s.trim().to_string(),
            _ => id.clone(),
        };
        if pr.answers.len() > NUM_QUESTIONS {
            whatever!(
                "Participant {}: {} answers found, at most {} expected",
                id,
                pr.answers.len(),
                NUM_QUESTIONS
            )
        }
        let mut answers: Vec<(u8, Option<i64>)> = Vec::new();
        for (qidx, s) in pr.answers.iter().enumerate() {
            let question = qidx + 1;
            answers.push((question as u8, parse_response(&id, question, s)?));
        }
        debug!("Answers for participant {:?}: {:?}", id, answers);
        builder
            .add_participant(&id, &name, &answers)
            .context(ScoringSnafu {})?;
    }
    Ok(())
}

fn read_response_data(
    root_path: &Path,
    cfs: &FileSource,
) -> SurveyResult<Vec<ParsedResponse>> {
    let p: PathBuf = root_path.join(&cfs.file_path);
    let p2 = p.as_path().display().to_string();
    info!("Attempting to read response file {:?}", p2);
    match cfs.provider.as_str() {
        "csv" => io_csv::read_csv_responses(p2, cfs),
        "excel" => io_excel::read_excel_responses(p2, cfs),
        "json" => io_json::read_json_responses(p2, cfs),
        x => whatever!("Provider not implemented {:?}", x),
    }
}

fn write_summary(pretty_js: &str, out: &str) -> SurveyResult<()> {
    if out == "stdout" {
        println!("{}", pretty_js);
    } else {
        info!("Writing summary to {:?}", out);
        fs::write(out, pretty_js).context(WritingSummarySnafu { path: out })?;
    }
    Ok(())
}

/// Runs the analysis described by a configuration.
///
/// Arguments:
/// * `root_path` the directory against which the file paths of the configuration are resolved
/// * `check_summary_path` a reference summary that the computed summary must match
/// * `out` where to write the summary ('stdout' or a file path). If not provided,
///   the output directory of the configuration is used, if any.
pub fn run_config(
    config: &SurveyConfig,
    root_path: &Path,
    check_summary_path: Option<String>,
    out: Option<String>,
) -> SurveyResult<JSValue> {
    info!("config: {:?}", config);

    // Validate the rules:
    let rules = validate_rules(&config.rules)?;

    if config.response_sources.is_empty() {
        whatever!("No response sources in the configuration")
    }

    let mut builder = Builder::new(&rules).context(ScoringSnafu {})?;
    for cfs in config.response_sources.iter() {
        let parsed = read_response_data(root_path, cfs)?;
        info!("Read {} rows from {:?}", parsed.len(), cfs.file_path);
        validate_responses(&parsed, cfs, &mut builder)?;
    }

    let group = builder.run();
    let participants = match &group {
        Result::Ok(g) => g.participants.clone(),
        Result::Err(ScoringErrors::InsufficientData { required, found }) => {
            warn!(
                "Not enough responses for group results: {} participants required, found {}",
                required, found
            );
            builder.evaluate()
        }
        Result::Err(e) => {
            return Err(SurveyError::Scoring { source: e.clone() });
        }
    };

    let result_js = build_summary_js(&config.output_settings, &rules, &participants, &group);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;
    debug!("summary: {}", pretty_js_stats);

    let out_path: Option<String> = out.or_else(|| {
        config.output_settings.output_directory.as_ref().map(|d| {
            let p: PathBuf = root_path.join(d).join("summary.json");
            p.as_path().display().to_string()
        })
    });
    if let Some(out_path) = out_path {
        write_summary(&pretty_js_stats, &out_path)?;
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = check_summary_path {
        let summary_ref = read_summary(&summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            whatever!("Difference detected between calculated summary and reference summary")
        }
    }

    Ok(result_js)
}

fn load_config(config_path: &str) -> SurveyResult<(SurveyConfig, PathBuf)> {
    let config = read_config(config_path)?;
    let root_p = Path::new(config_path)
        .parent()
        .context(MissingParentDirSnafu {})?
        .to_path_buf();
    Ok((config, root_p))
}

pub fn run_analysis_from_args(args: &Args) -> SurveyResult<()> {
    if let Some(score) = args.overall_score {
        let zone = classify_overall_score(score);
        info!("Overall score {} -> {}", score, zone);
        println!("{}", zone);
        return Ok(());
    }

    let (config, root_p, out) = config_from_args(args)?;
    run_config(&config, &root_p, args.reference.clone(), out)?;
    Ok(())
}

// The configuration, its root directory and the output, once the command line is applied.
fn config_from_args(args: &Args) -> SurveyResult<(SurveyConfig, PathBuf, Option<String>)> {
    let (mut config, root_p): (SurveyConfig, PathBuf) = match (&args.config, &args.input) {
        (Some(config_path), _) => load_config(config_path)?,
        (None, Some(_)) => {
            let config = SurveyConfig {
                output_settings: OutputSettings {
                    survey_name: "survey".to_string(),
                    output_directory: None,
                    survey_date: None,
                    organization: None,
                },
                response_sources: vec![],
                rules: SurveyRules::default(),
            };
            (config, PathBuf::new())
        }
        (None, None) => {
            whatever!(
                "Either a configuration file (--config) or an input file (--input) is required"
            )
        }
    };

    // The command line takes precedence over the configuration.
    if let Some(input) = &args.input {
        let provider = args
            .input_type
            .clone()
            .or_else(|| config.response_sources.first().map(|s| s.provider.clone()))
            .unwrap_or_else(|| "csv".to_string());
        // The input is relative to the working directory, not to the configuration.
        let input_p = std::env::current_dir()
            .map(|d| d.join(input))
            .unwrap_or_else(|_| PathBuf::from(input));
        config.response_sources = vec![FileSource::new(
            &provider,
            input_p.as_path().display().to_string().as_str(),
        )];
    }
    if let Some(name) = &args.excel_worksheet_name {
        for s in config.response_sources.iter_mut() {
            s.excel_worksheet_name = Some(name.clone());
        }
    }
    if let Some(n) = args.min_participants {
        config.rules.minimum_participants = Some(json!(n));
    }
    if let Some(t) = &args.tiebreak {
        config.rules.tiebreak_mode = Some(t.clone());
    }
    if let Some(seed) = args.random_seed {
        config.rules.random_seed = Some(seed.to_string());
    }

    let out = match (&args.out, &config.output_settings.output_directory) {
        (Some(o), _) => Some(o.clone()),
        (None, Some(_)) => None,
        (None, None) => Some("stdout".to_string()),
    };
    Ok((config, root_p, out))
}
