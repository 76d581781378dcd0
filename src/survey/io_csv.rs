// Primitives for reading CSV files.

use crate::survey::{
    io_common::{answer_columns, assemble_response},
    *,
};

pub fn read_csv_responses(path: String, cfs: &FileSource) -> SurveyResult<Vec<ParsedResponse>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(&path)
        .context(CsvOpenSnafu { path: path.clone() })?;
    let mut records = rdr.records();

    let header: Vec<String> = match records.next() {
        Some(line_r) => line_r
            .context(CsvLineParseSnafu {})?
            .iter()
            .map(|s| s.to_string())
            .collect(),
        None => return Ok(Vec::new()),
    };
    debug!("read_csv_responses: header: {:?}", header);
    let answer_cols = answer_columns(&header, cfs)?;

    // The index starts at 1 to respect most conventions in the excel world
    let first_row = cfs.first_response_row_index()?;
    let mut res: Vec<ParsedResponse> = Vec::new();
    for (idx, line_r) in records.enumerate() {
        // The header is the first line.
        let lineno = idx + 2;
        if lineno < first_row {
            continue;
        }
        let line = line_r.context(CsvLineParseSnafu {})?;
        let row: Vec<String> = line.iter().map(|s| s.to_string()).collect();
        if row.iter().all(|s| s.trim().is_empty()) {
            debug!("read_csv_responses: skipping empty line {}", lineno);
            continue;
        }
        if row.len() <= cfs.id_column_index_int()? {
            return CsvLineTooShortSnafu { lineno }.fail();
        }
        let pr = assemble_response(&row, &answer_cols, cfs)?;
        debug!("read_csv_responses: lineno: {:?} response: {:?}", lineno, &pr);
        res.push(pr);
    }
    Ok(res)
}
