use crate::survey::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "surveyName")]
    pub survey_name: String,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "surveyDate")]
    pub survey_date: Option<String>,
    #[serde(rename = "organization")]
    pub organization: Option<String>,
}

/// The configuration section of the summary.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub survey: String,
    pub date: Option<String>,
    pub organization: Option<String>,
    #[serde(rename = "minimumParticipants")]
    pub minimum_participants: u32,
    #[serde(rename = "tiebreakMode")]
    pub tiebreak_mode: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "firstQuestionColumnIndex")]
    _first_question_column_index: Option<JSValue>,
    #[serde(rename = "firstResponseRowIndex")]
    _first_response_row_index: Option<JSValue>,
    #[serde(rename = "idColumnIndex")]
    pub id_column_index: Option<JSValue>,
    #[serde(rename = "nameColumnIndex")]
    pub name_column_index: Option<JSValue>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    /// The headers of the columns of questions 1 to 36, when they are not in order.
    #[serde(rename = "questionColumns")]
    pub question_columns: Option<Vec<String>>,
    #[serde(rename = "questionKeyPrefix")]
    pub question_key_prefix: Option<String>,
}

impl FileSource {
    pub fn new(provider: &str, file_path: &str) -> FileSource {
        FileSource {
            provider: provider.to_string(),
            file_path: file_path.to_string(),
            _first_question_column_index: None,
            _first_response_row_index: None,
            id_column_index: None,
            name_column_index: None,
            excel_worksheet_name: None,
            question_columns: None,
            question_key_prefix: None,
        }
    }

    /// The first column with answers (0-based). The third column by default.
    pub fn first_question_column_index(&self) -> SurveyResult<usize> {
        let x = read_js_int(&self._first_question_column_index)?.unwrap_or(3);
        Ok(x - 1)
    }

    /// The first row with answers (1-based). The header takes the first row by default.
    pub fn first_response_row_index(&self) -> SurveyResult<usize> {
        let x = read_js_int(&self._first_response_row_index)?.unwrap_or(2);
        Ok(x)
    }

    /// The column of the participant id (0-based). The first column by default.
    pub fn id_column_index_int(&self) -> SurveyResult<usize> {
        let x = read_js_int(&self.id_column_index)?.unwrap_or(1);
        Ok(x - 1)
    }

    /// The column of the participant name (0-based). The second column by default.
    pub fn name_column_index_int(&self) -> SurveyResult<usize> {
        let x = read_js_int(&self.name_column_index)?.unwrap_or(2);
        Ok(x - 1)
    }

    pub fn question_key_prefix(&self) -> String {
        self.question_key_prefix
            .clone()
            .unwrap_or_else(|| "q".to_string())
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ConfigQuestionMap {
    pub war: Vec<u8>,
    pub opportunity: Vec<u8>,
    pub comfort: Vec<u8>,
    pub apathy: Vec<u8>,
}

impl ConfigQuestionMap {
    pub fn to_question_map(&self) -> SurveyResult<QuestionMap> {
        let mut res = QuestionMap::DEFAULT;
        for (category, questions) in [
            (Category::War, &self.war),
            (Category::Opportunity, &self.opportunity),
            (Category::Comfort, &self.comfort),
            (Category::Apathy, &self.apathy),
        ] {
            if questions.len() != QUESTIONS_PER_CATEGORY {
                whatever!(
                    "questionMap: category {} has {} questions, expected {}",
                    category,
                    questions.len(),
                    QUESTIONS_PER_CATEGORY
                )
            }
            res.questions[category as usize].copy_from_slice(questions);
        }
        res.validate().context(ScoringSnafu {})?;
        Ok(res)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct SurveyRules {
    #[serde(rename = "tiebreakMode")]
    pub tiebreak_mode: Option<String>,
    #[serde(rename = "randomSeed")]
    pub random_seed: Option<String>,
    #[serde(rename = "minimumParticipants")]
    pub minimum_participants: Option<JSValue>,
    #[serde(rename = "invalidResponseRule")]
    pub invalid_response_rule: Option<String>,
    #[serde(rename = "questionMap")]
    pub question_map: Option<ConfigQuestionMap>,
}

impl SurveyRules {
    pub fn tiebreak_mode(&self) -> SurveyResult<TieBreakMode> {
        match self.tiebreak_mode.as_deref() {
            None | Some("priorityOrder") => Ok(TieBreakMode::PriorityOrder),
            Some("noDominant") => Ok(TieBreakMode::NoDominant),
            Some("random") => match self.random_seed.clone().map(|s| s.parse::<u32>()) {
                Some(Result::Ok(seed)) => Ok(TieBreakMode::Random(seed)),
                x => whatever!("tiebreak mode random requires a numeric randomSeed, got {:?}", x),
            },
            Some(x) => whatever!("unknown tiebreak mode: {}", x),
        }
    }

    pub fn invalid_response_rule(&self) -> SurveyResult<InvalidResponseRule> {
        match self.invalid_response_rule.as_deref() {
            None | Some("reject") => Ok(InvalidResponseRule::Reject),
            Some("skip") => Ok(InvalidResponseRule::Skip),
            Some("accept") => Ok(InvalidResponseRule::Accept),
            Some(x) => whatever!("unknown invalid response rule: {}", x),
        }
    }

    pub fn minimum_participants(&self) -> SurveyResult<u32> {
        match read_js_int(&self.minimum_participants)? {
            Some(x) => u32::try_from(x)
                .ok()
                .context(ParsingJsonNumberSnafu {}),
            None => Ok(ScoringRules::DEFAULT_RULES.minimum_participants),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SurveyConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(rename = "responseSources")]
    pub response_sources: Vec<FileSource>,
    #[serde(default)]
    pub rules: SurveyRules,
}

pub fn read_config(path: &str) -> SurveyResult<SurveyConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})
}

pub fn read_summary(path: &str) -> SurveyResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

// Reads a 1-based index, given either as a number, a string or spreadsheet column letters.
fn read_js_int(x: &Option<JSValue>) -> SurveyResult<Option<usize>> {
    let res = match x {
        None | Some(JSValue::Null) => return Ok(None),
        Some(JSValue::Number(n)) => n.as_u64().and_then(|x| usize::try_from(x).ok()),
        // Parsing the Excel-style columns
        Some(JSValue::String(s)) if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic()) => {
            s.to_ascii_lowercase().chars().try_fold(0usize, |acc, c| {
                acc.checked_mul(26)?
                    .checked_add(c as usize - 'a' as usize + 1)
            })
        }
        Some(JSValue::String(s)) => s.trim().parse::<usize>().ok(),
        _ => None,
    };
    match res {
        Some(x) if x >= 1 => Ok(Some(x)),
        _ => ParsingJsonNumberSnafu {}.fail(),
    }
}
