// Rows exported from the data store: one object per participant.

use crate::survey::*;

pub fn read_json_responses(path: String, cfs: &FileSource) -> SurveyResult<Vec<ParsedResponse>> {
    let contents = fs::read_to_string(&path).context(OpeningJsonSnafu { path: path.clone() })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    let rows = js.as_array().context(JsonRowsNotObjectsSnafu {})?;

    let keys: Vec<String> = match &cfs.question_columns {
        Some(cols) => cols.clone(),
        None => {
            let prefix = cfs.question_key_prefix();
            (1..=NUM_QUESTIONS)
                .map(|q| format!("{}{}", prefix, q))
                .collect()
        }
    };

    let mut res: Vec<ParsedResponse> = Vec::new();
    for row in rows.iter() {
        let obj = row.as_object().context(JsonRowsNotObjectsSnafu {})?;
        let answers: Vec<String> = keys
            .iter()
            .map(|k| obj.get(k).map(read_value).unwrap_or_default())
            .collect();
        let pr = ParsedResponse {
            id: obj.get("id").map(read_value),
            name: obj.get("name").map(read_value),
            answers,
        };
        debug!("read_json_responses: {:?}", pr);
        res.push(pr);
    }
    Ok(res)
}

fn read_value(v: &JSValue) -> String {
    match v {
        JSValue::Null => "".to_string(),
        JSValue::String(s) => s.clone(),
        x => x.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values() {
        assert_eq!(read_value(&json!(null)), "");
        assert_eq!(read_value(&json!("4")), "4");
        assert_eq!(read_value(&json!(4)), "4");
        assert_eq!(read_value(&json!(4.0)), "4.0");
        assert_eq!(read_value(&json!(true)), "true");
    }
}
