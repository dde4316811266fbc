// src/ingest/mod.rs
//
// Parsing for the performance bulk-upload file: comma-separated, no quoting,
// required case-sensitive header. Errors name the offending line.

use std::fmt::Display;
use std::str::FromStr;

use crate::models::PerformanceReview;

pub const REQUIRED_HEADER: [&str; 6] = [
    "emp_id",
    "project_id",
    "accuracy_score",
    "efficiency_score",
    "quality_score",
    "timeline_score",
];

pub fn parse_performance_csv(input: &str) -> Result<Vec<PerformanceReview>, String> {
    let mut lines = input
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim_end_matches('\r')))
        .filter(|(_, l)| !l.trim().is_empty());

    let (_, header) = lines.next().ok_or_else(|| "missing header row".to_string())?;
    let header_fields: Vec<&str> = header.split(',').map(str::trim).collect();
    if header_fields != REQUIRED_HEADER {
        return Err(format!(
            "invalid header '{header}': expected '{}'",
            REQUIRED_HEADER.join(",")
        ));
    }

    let mut rows = Vec::new();
    for (line_no, line) in lines {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != REQUIRED_HEADER.len() {
            return Err(format!(
                "line {line_no}: expected {} fields, got {}",
                REQUIRED_HEADER.len(),
                fields.len()
            ));
        }
        rows.push(PerformanceReview {
            emp_id: parse_field(fields[0], "emp_id", line_no)?,
            project_id: parse_field(fields[1], "project_id", line_no)?,
            accuracy_score: parse_field(fields[2], "accuracy_score", line_no)?,
            efficiency_score: parse_field(fields[3], "efficiency_score", line_no)?,
            quality_score: parse_field(fields[4], "quality_score", line_no)?,
            timeline_score: parse_field(fields[5], "timeline_score", line_no)?,
        });
    }
    Ok(rows)
}

fn parse_field<T>(raw: &str, name: &str, line_no: usize) -> Result<T, String>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse()
        .map_err(|e| format!("line {line_no}: invalid {name} '{raw}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "emp_id,project_id,accuracy_score,efficiency_score,quality_score,timeline_score";

    #[test]
    fn parses_rows() {
        let input = format!("{HEADER}\n1,10,8,8.5,9,7\n2,10,4,4,4,4\n");
        let rows = parse_performance_csv(&input).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            PerformanceReview {
                emp_id: 1,
                project_id: 10,
                accuracy_score: 8.0,
                efficiency_score: 8.5,
                quality_score: 9.0,
                timeline_score: 7.0,
            }
        );
        assert_eq!(rows[1].emp_id, 2);
    }

    #[test]
    fn header_only_input_yields_no_rows() {
        assert_eq!(parse_performance_csv(HEADER).unwrap(), vec![]);
    }

    #[test]
    fn empty_input_is_an_error() {
        let err = parse_performance_csv("").unwrap_err();
        assert!(err.contains("missing header"), "{err}");
    }

    #[test]
    fn header_is_case_sensitive() {
        let input = "EmpID,ProjectID,AccuracyScore,EfficiencyScore,QualityScore,TimelineScore\n1,1,5,5,5,5";
        let err = parse_performance_csv(input).unwrap_err();
        assert!(err.contains("invalid header"), "{err}");
    }

    #[test]
    fn reordered_header_is_rejected() {
        let input = "project_id,emp_id,accuracy_score,efficiency_score,quality_score,timeline_score\n1,1,5,5,5,5";
        assert!(parse_performance_csv(input).is_err());
    }

    #[test]
    fn accepts_crlf_and_surrounding_whitespace() {
        let input = format!("{HEADER}\r\n 3 , 7 , 6.5 ,6, 9 ,10\r\n");
        let rows = parse_performance_csv(&input).unwrap();
        assert_eq!(rows[0].emp_id, 3);
        assert_eq!(rows[0].timeline_score, 10.0);
    }

    #[test]
    fn skips_blank_lines() {
        let input = format!("\n{HEADER}\n\n1,1,5,5,5,5\n\n");
        assert_eq!(parse_performance_csv(&input).unwrap().len(), 1);
    }

    #[test]
    fn wrong_field_count_names_the_line() {
        let input = format!("{HEADER}\n1,1,5,5,5\n");
        let err = parse_performance_csv(&input).unwrap_err();
        assert!(err.contains("line 2"), "{err}");
        assert!(err.contains("expected 6 fields, got 5"), "{err}");
    }

    #[test]
    fn unparseable_number_names_field_and_line() {
        let input = format!("{HEADER}\n1,1,5,5,5,5\n2,2,high,5,5,5\n");
        let err = parse_performance_csv(&input).unwrap_err();
        assert!(err.contains("line 3"), "{err}");
        assert!(err.contains("accuracy_score"), "{err}");
    }
}
