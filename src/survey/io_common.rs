use std::path::Path;

use crate::survey::*;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Ids for the rows that do not carry one: the file name and the row number.
pub fn make_default_id(path: &str) -> impl Fn(usize) -> String {
    let simplified_file_name = simplify_file_name(path);
    move |lineno| format!("{}-{:08}", simplified_file_name, lineno)
}

/// Finds the column of each question from its header.
pub fn get_col_index(question_columns: &[String], header: &[String]) -> SurveyResult<Vec<usize>> {
    if question_columns.len() > NUM_QUESTIONS {
        whatever!(
            "{} question columns given, at most {} expected",
            question_columns.len(),
            NUM_QUESTIONS
        )
    }
    let mut res: Vec<usize> = Vec::new();
    for qc in question_columns.iter() {
        let idx = header
            .iter()
            .position(|h| h.trim() == qc.trim())
            .context(MissingColumnSnafu {
                column: qc.clone(),
            })?;
        res.push(idx);
    }
    Ok(res)
}

/// The columns of the answers, in question order.
pub fn answer_columns(header: &[String], cfs: &FileSource) -> SurveyResult<Vec<usize>> {
    match &cfs.question_columns {
        Some(cols) => get_col_index(cols, header),
        None => {
            let start = cfs.first_question_column_index()?;
            Ok((start..start + NUM_QUESTIONS).collect())
        }
    }
}

/// Assembles a row of cells into a response. Missing trailing cells are unanswered.
pub fn assemble_response(
    row: &[String],
    answer_cols: &[usize],
    cfs: &FileSource,
) -> SurveyResult<ParsedResponse> {
    let id = row.get(cfs.id_column_index_int()?).cloned();
    let name = row.get(cfs.name_column_index_int()?).cloned();
    let answers: Vec<String> = answer_cols
        .iter()
        .map(|idx| row.get(*idx).cloned().unwrap_or_default())
        .collect();
    Ok(ParsedResponse { id, name, answers })
}
