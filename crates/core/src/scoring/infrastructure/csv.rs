//! Minimal CSV support for the two fixed schemas this crate touches.
//! Handles quoted fields (embedded commas, doubled quotes, newlines);
//! nothing more.

/// Split CSV text into records of fields. Empty lines are skipped.
pub(crate) fn parse_records(input: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                if !(record.len() == 1 && record[0].is_empty()) {
                    records.push(std::mem::take(&mut record));
                }
                record.clear();
            }
            _ => field.push(c),
        }
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    records
}

/// Quote a field when it contains separators, quotes, or newlines.
pub(crate) fn escape_field(field: &str) -> String {
    if field.contains(['"', ',', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_records() {
        let records = parse_records("a,b,c\n1,2,3\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1], vec!["1", "2", "3"]);
    }

    #[test]
    fn test_parse_quoted_field_with_comma_and_quote() {
        let records = parse_records("id,text\n1,\"hello, \"\"world\"\"\"\n");
        assert_eq!(records[1][1], "hello, \"world\"");
    }

    #[test]
    fn test_parse_newline_inside_quotes() {
        let records = parse_records("1,\"two\nlines\"\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0][1], "two\nlines");
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let records = parse_records("a,b\n\n1,2\n");
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_parse_final_record_without_newline() {
        let records = parse_records("a,b");
        assert_eq!(records, vec![vec!["a", "b"]]);
    }

    #[test]
    fn test_escape_round_trip() {
        for original in ["plain", "with, comma", "with \"quotes\"", "multi\nline"] {
            let line = format!("{},end\n", escape_field(original));
            let parsed = parse_records(&line);
            assert_eq!(parsed[0][0], original);
        }
    }
}
