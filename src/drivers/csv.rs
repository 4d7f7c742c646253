use crate::drivers::error::ImportError;

/// Pulls the numeric column named `column` out of comma-separated text.
/// The first non-blank line is the header; blank lines are skipped.
pub fn parse_column(text: &str, column: &str) -> Result<Vec<f64>, ImportError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| !line.trim().is_empty());

    let (_, header) = lines.next().ok_or(ImportError::Empty)?;
    let index = split_record(header)
        .iter()
        .position(|name| name.trim() == column)
        .ok_or_else(|| ImportError::MissingColumn(column.to_owned()))?;

    let mut samples = Vec::new();
    for (line_no, line) in lines {
        let fields = split_record(line);
        let raw = fields.get(index).map(|f| f.trim()).unwrap_or("");
        let value = raw.parse::<f64>().map_err(|_| ImportError::Malformed {
            line: line_no,
            value: raw.to_owned(),
        })?;
        samples.push(value);
    }
    Ok(samples)
}

/// Splits one record, honouring double-quoted fields and `""` escapes.
fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, quoted) {
            ('"', true) if chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            ('"', _) => quoted = !quoted,
            (',', false) => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_the_named_column() {
        let text = "\u{feff}time,values,other\r\n0,0.25,x\r\n\r\n1,-1e-3,y\r\n2,  7 ,z\r\n";
        assert_eq!(parse_column(text, "values").unwrap(), vec![0.25, -0.001, 7.0]);
    }

    #[test]
    fn quoted_header_and_fields() {
        let text = "\"label, long\",\"values\"\n\"a, b\",\"3.5\"\n";
        assert_eq!(parse_column(text, "values").unwrap(), vec![3.5]);
        assert_eq!(split_record(r#"a,"say ""hi""",c"#), vec!["a", "say \"hi\"", "c"]);
    }

    #[test]
    fn reports_bad_rows_and_missing_column() {
        let err = parse_column("values\n1\nabc\n", "values").unwrap_err();
        assert!(matches!(err, ImportError::Malformed { line: 3, ref value } if value == "abc"));

        let err = parse_column("a,values\n1\n", "values").unwrap_err();
        assert!(matches!(err, ImportError::Malformed { line: 2, .. }));

        assert!(matches!(
            parse_column("time,signal\n1,2\n", "values"),
            Err(ImportError::MissingColumn(c)) if c == "values"
        ));
        assert!(matches!(parse_column("\n\n", "values"), Err(ImportError::Empty)));
    }

    #[test]
    fn header_only_yields_no_samples() {
        assert!(parse_column("values\n", "values").unwrap().is_empty());
    }
}
