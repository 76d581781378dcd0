use calamine::{open_workbook, DataType, Range, Reader, Xlsx};

use crate::survey::{
    io_common::{answer_columns, assemble_response},
    *,
};

pub fn read_excel_responses(path: String, cfs: &FileSource) -> SurveyResult<Vec<ParsedResponse>> {
    let wrange = get_range(&path, cfs)?;

    let mut iter = wrange.rows();
    let header_cells = iter.next().context(EmptyExcelSnafu {})?;
    let header: Vec<String> = header_cells
        .iter()
        .map(|c| read_cell(c, 1))
        .collect::<SurveyResult<Vec<String>>>()?;
    debug!("read_excel_responses: header: {:?}", header);
    let answer_cols = answer_columns(&header, cfs)?;
    debug!("read_excel_responses: answer columns: {:?}", answer_cols);

    let first_row = cfs.first_response_row_index()?;
    let mut res: Vec<ParsedResponse> = Vec::new();
    for (idx, cells) in iter.enumerate() {
        // The header is the first row.
        let lineno = idx + 2;
        if lineno < first_row {
            continue;
        }
        let row: Vec<String> = cells
            .iter()
            .map(|c| read_cell(c, lineno as u64))
            .collect::<SurveyResult<Vec<String>>>()?;
        if row.iter().all(|s| s.trim().is_empty()) {
            debug!("read_excel_responses: skipping empty row {}", lineno);
            continue;
        }
        let pr = assemble_response(&row, &answer_cols, cfs)?;
        debug!("read_excel_responses: row: {:?} response: {:?}", lineno, &pr);
        res.push(pr);
    }
    Ok(res)
}

fn get_range(path: &str, cfs: &FileSource) -> SurveyResult<Range<DataType>> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange = match &cfs.excel_worksheet_name {
        Some(name) => workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { name, path })?,
        None => workbook.worksheet_range_at(0).context(EmptyExcelSnafu {})?,
    }
    .context(OpeningExcelSnafu { path })?;
    Ok(wrange)
}

fn read_cell(cell: &DataType, lineno: u64) -> SurveyResult<String> {
    match cell {
        DataType::String(s) => Ok(s.clone()),
        DataType::Empty => Ok("".to_string()),
        DataType::Int(i) => Ok(i.to_string()),
        DataType::Float(f) if f.fract() == 0.0 => Ok(format!("{}", *f as i64)),
        DataType::Float(f) => Ok(f.to_string()),
        _ => ExcelWrongCellTypeSnafu {
            lineno,
            content: format!("{:?}", cell),
        }
        .fail(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells() {
        assert_eq!(read_cell(&DataType::Float(4.0), 2).unwrap(), "4");
        assert_eq!(read_cell(&DataType::Float(2.5), 2).unwrap(), "2.5");
        assert_eq!(read_cell(&DataType::Int(3), 2).unwrap(), "3");
        assert_eq!(read_cell(&DataType::Empty, 2).unwrap(), "");
        assert_eq!(
            read_cell(&DataType::String("Maya".to_string()), 2).unwrap(),
            "Maya"
        );
        assert!(matches!(
            read_cell(&DataType::Bool(true), 5),
            Err(SurveyError::ExcelWrongCellType { lineno: 5, .. })
        ));
    }
}
