//! The five cleaning operations.
//!
//! Each operation consumes the table, appends its log lines and returns the
//! transformed table. None of them ever adds rows.

use super::report::CleaningLog;
use super::spec::Operation;
use crate::error::Result;
use crate::table::{ColumnKind, column_kinds, columns_of_kind};
use polars::prelude::*;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Characters removed by [`Operation::CleanSpecialChars`].
///
/// A word character is a letter, a number or `_`; combining marks and
/// connector punctuation other than `_` are removed. Whitespace is `\s` plus
/// the information separators U+001C..U+001F.
pub const SPECIAL_CHARS_PATTERN: &str = r"[^\p{L}\p{N}_\s\x{1C}-\x{1F}]";

static SPECIAL_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SPECIAL_CHARS_PATTERN).expect("pattern is a valid regex"));

/// Text that [`Operation::RemoveNa`] treats as missing. Matched exactly.
pub const NA_SENTINEL: &str = "NA";

/// Multiplier applied to the interquartile range to build the outlier fence.
pub const IQR_MULTIPLIER: f64 = 1.5;

/// Dispatch one operation.
///
/// # Errors
///
/// Returns the error of the operation that ran.
pub fn apply_operation(op: Operation, df: DataFrame, log: &mut CleaningLog) -> Result<DataFrame> {
    match op {
        Operation::RemoveNull => remove_null(df, log),
        Operation::RemoveNa => remove_na(df, log),
        Operation::RemoveDuplicates => remove_duplicates(df, log),
        Operation::CleanSpecialChars => clean_special_chars(df, log),
        Operation::HandleOutliers => handle_outliers(df, log),
    }
}

fn drop_rows_with_missing(df: DataFrame) -> Result<DataFrame> {
    Ok(df.lazy().drop_nulls(None).collect()?)
}

/// Drop every row that has a missing cell in any column.
///
/// # Errors
///
/// Returns [`TidyError::DataProcessing`](crate::error::TidyError::DataProcessing)
/// if polars fails to evaluate the filter.
pub fn remove_null(df: DataFrame, log: &mut CleaningLog) -> Result<DataFrame> {
    let before = df.height();
    let df = drop_rows_with_missing(df)?;
    log.push(format!(
        "Removed {} rows due to null values.",
        before - df.height()
    ));
    Ok(df)
}

/// Convert exact `"NA"` text to missing, then drop every row with a missing
/// cell. Rows that were already missing a value are dropped too.
///
/// # Errors
///
/// Returns [`TidyError::DataProcessing`](crate::error::TidyError::DataProcessing)
/// if a text column cannot be rebuilt.
pub fn remove_na(mut df: DataFrame, log: &mut CleaningLog) -> Result<DataFrame> {
    let before = df.height();

    for name in columns_of_kind(&df, ColumnKind::Text) {
        let converted: StringChunked = df
            .column(&name)?
            .as_materialized_series()
            .str()?
            .into_iter()
            .map(|cell| cell.filter(|text| *text != NA_SENTINEL))
            .collect();
        df.replace(&name, converted.with_name(name.as_str().into()))?;
    }

    let df = drop_rows_with_missing(df)?;
    log.push(format!(
        "Removed {} rows due to '{NA_SENTINEL}' values.",
        before - df.height()
    ));
    Ok(df)
}

/// Drop rows identical to an earlier row across all columns. The first
/// occurrence stays and row order is preserved; missing cells compare equal.
///
/// # Errors
///
/// Returns [`TidyError::DataProcessing`](crate::error::TidyError::DataProcessing)
/// if polars fails to evaluate the query.
pub fn remove_duplicates(df: DataFrame, log: &mut CleaningLog) -> Result<DataFrame> {
    let before = df.height();
    let df = df
        .lazy()
        .unique_stable(None, UniqueKeepStrategy::First)
        .collect()?;
    log.push(format!("Removed {} duplicate rows.", before - df.height()));
    Ok(df)
}

/// Remove every character that is not a word character or whitespace.
pub fn strip_special_chars(text: &str) -> String {
    SPECIAL_CHARS.replace_all(text, "").into_owned()
}

/// Make names unique by appending `_1`, `_2`, ... to repeats.
fn dedupe_names(names: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for name in names {
        let mut candidate = name.clone();
        let mut suffix = 1;
        while !seen.insert(candidate.clone()) {
            candidate = format!("{name}_{suffix}");
            suffix += 1;
        }
        unique.push(candidate);
    }
    unique
}

/// Strip special characters from every text cell and from every header.
///
/// Missing cells are left missing. Headers that collide after stripping are
/// suffixed so names stay unique. One log line per text column, using the
/// column's name from before the rename.
///
/// # Errors
///
/// Returns [`TidyError::DataProcessing`](crate::error::TidyError::DataProcessing)
/// if a column cannot be read or the table cannot be rebuilt.
pub fn clean_special_chars(df: DataFrame, log: &mut CleaningLog) -> Result<DataFrame> {
    let kinds = column_kinds(&df);
    let new_names = dedupe_names(kinds.iter().map(|(name, _)| strip_special_chars(name)));

    let mut columns = Vec::with_capacity(kinds.len());
    for ((name, kind), new_name) in kinds.iter().zip(new_names) {
        let series = df.column(name)?.as_materialized_series();
        let cleaned = if *kind == ColumnKind::Text {
            let ca: StringChunked = series
                .str()?
                .into_iter()
                .map(|cell| cell.map(strip_special_chars))
                .collect();
            log.push(format!("Cleaned special characters in column '{name}'."));
            ca.into_series()
        } else {
            series.clone()
        };
        columns.push(Column::from(cleaned.with_name(new_name.into())));
    }

    Ok(DataFrame::new(columns)?)
}

/// Tukey fence for one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierFence {
    pub q1: f64,
    pub q3: f64,
    pub lower: f64,
    pub upper: f64,
}

impl OutlierFence {
    /// Quartiles use linear interpolation between closest ranks. Missing
    /// values are ignored; `None` if nothing is left.
    ///
    /// # Errors
    ///
    /// Returns [`TidyError::DataProcessing`](crate::error::TidyError::DataProcessing)
    /// if polars rejects the quantile.
    pub fn from_values(values: &Float64Chunked) -> Result<Option<Self>> {
        let q1 = values.quantile(0.25, QuantileMethod::Linear)?;
        let q3 = values.quantile(0.75, QuantileMethod::Linear)?;
        Ok(q1.zip(q3).map(|(q1, q3)| Self::from_quartiles(q1, q3)))
    }

    pub fn from_quartiles(q1: f64, q3: f64) -> Self {
        let iqr = q3 - q1;
        Self {
            q1,
            q3,
            lower: q1 - IQR_MULTIPLIER * iqr,
            upper: q3 + IQR_MULTIPLIER * iqr,
        }
    }

    /// Bounds are inclusive.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// Drop rows outside the outlier fence, numeric column by numeric column.
///
/// Columns are visited in table order and each column's fence is computed on
/// the rows that survived the previous columns. A row is kept only when its
/// value lies inside the fence, so rows missing a value in the current column
/// are dropped as well. The logged count covers values outside the fence only.
///
/// # Errors
///
/// Returns [`TidyError::DataProcessing`](crate::error::TidyError::DataProcessing)
/// if a numeric column cannot be cast to `f64` or the filter fails.
pub fn handle_outliers(mut df: DataFrame, log: &mut CleaningLog) -> Result<DataFrame> {
    for name in columns_of_kind(&df, ColumnKind::Numeric) {
        let series = df
            .column(&name)?
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        let values = series.f64()?;

        let fence = OutlierFence::from_values(values)?;
        if let Some(fence) = &fence {
            tracing::debug!(
                "Column '{name}': Q1={} Q3={} bounds=[{}, {}]",
                fence.q1,
                fence.q3,
                fence.lower,
                fence.upper
            );
        }

        let mut outliers = 0_usize;
        let keep: BooleanChunked = values
            .into_iter()
            .map(|value| match (value, &fence) {
                (Some(v), Some(fence)) => {
                    let inside = fence.contains(v);
                    if !inside {
                        outliers += 1;
                    }
                    inside
                }
                _ => false,
            })
            .collect();
        df = df.filter(&keep)?;

        log.push(format!(
            "Removed {outliers} outlier rows from column '{name}'."
        ));
    }
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_cells(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
        Ok(df
            .column(name)?
            .as_materialized_series()
            .str()?
            .into_iter()
            .map(|cell| cell.map(str::to_owned))
            .collect())
    }

    #[test]
    fn test_remove_null() -> Result<()> {
        let df = df!(
            "a" => [Some(1i64), None, Some(3), Some(4)],
            "b" => [Some("x"), Some("y"), None, Some("z")],
        )?;
        let mut log = CleaningLog::new();
        let df = remove_null(df, &mut log)?;

        assert_eq!(df.height(), 2);
        assert_eq!(log.lines(), ["Removed 2 rows due to null values."]);
        Ok(())
    }

    #[test]
    fn test_remove_na_exact_match_only() -> Result<()> {
        let df = df!(
            "code" => ["NA", "NAx", "na", " NA", "ok"],
            "n" => [1i64, 2, 3, 4, 5],
        )?;
        let mut log = CleaningLog::new();
        let df = remove_na(df, &mut log)?;

        assert_eq!(
            text_cells(&df, "code")?,
            vec![
                Some("NAx".to_owned()),
                Some("na".to_owned()),
                Some(" NA".to_owned()),
                Some("ok".to_owned()),
            ]
        );
        assert_eq!(log.lines(), ["Removed 1 rows due to 'NA' values."]);
        Ok(())
    }

    #[test]
    fn test_remove_na_also_drops_existing_missing() -> Result<()> {
        let df = df!(
            "code" => [Some("NA"), Some("b"), Some("c")],
            "n" => [Some(1i64), None, Some(3)],
        )?;
        let mut log = CleaningLog::new();
        let df = remove_na(df, &mut log)?;

        assert_eq!(df.height(), 1);
        assert_eq!(log.lines(), ["Removed 2 rows due to 'NA' values."]);
        Ok(())
    }

    #[test]
    fn test_remove_duplicates_keeps_first_and_is_idempotent() -> Result<()> {
        let df = df!(
            "k" => [Some("a"), Some("b"), Some("a"), None, None, Some("c")],
            "v" => [1i64, 2, 1, 9, 9, 1],
        )?;
        let mut log = CleaningLog::new();
        let df = remove_duplicates(df, &mut log)?;

        assert_eq!(
            text_cells(&df, "k")?,
            vec![
                Some("a".to_owned()),
                Some("b".to_owned()),
                None,
                Some("c".to_owned()),
            ]
        );

        let df = remove_duplicates(df, &mut log)?;
        assert_eq!(df.height(), 4);
        assert_eq!(
            log.lines(),
            ["Removed 2 duplicate rows.", "Removed 0 duplicate rows."]
        );
        Ok(())
    }

    #[test]
    fn test_strip_special_chars() {
        assert_eq!(strip_special_chars("Hello, World!"), "Hello World");
        assert_eq!(strip_special_chars("snake_case-42"), "snake_case42");
        assert_eq!(strip_special_chars("tab\there"), "tab\there");
        assert_eq!(strip_special_chars("Zürich (CH)"), "Zürich CH");
        assert_eq!(strip_special_chars("€$%&"), "");
    }

    #[test]
    fn test_strip_special_chars_drops_marks_and_connectors() {
        // Decomposed "é" loses its combining acute accent.
        assert_eq!(strip_special_chars("Cafe\u{301}"), "Cafe");
        assert_eq!(strip_special_chars("a\u{203f}b"), "ab");
        assert_eq!(strip_special_chars("a\u{200d}b"), "ab");
        assert_eq!(strip_special_chars("x_1\u{2075}"), "x_1\u{2075}");
    }

    #[test]
    fn test_strip_special_chars_keeps_information_separators() {
        assert_eq!(strip_special_chars("x\u{1c}y"), "x\u{1c}y");
        assert_eq!(strip_special_chars("\u{1d}\u{1e}\u{1f}!"), "\u{1d}\u{1e}\u{1f}");
        assert_eq!(strip_special_chars("a\u{a0}b\u{3000}c"), "a\u{a0}b\u{3000}c");
    }

    #[test]
    fn test_clean_special_chars() -> Result<()> {
        let df = df!(
            "name!" => [Some("Al!ce"), None, Some("B@b")],
            "score (%)" => [1i64, 2, 3],
            "city" => [Some("São-Paulo"), Some("Köln"), Some("N.Y.")],
        )?;
        let mut log = CleaningLog::new();
        let df = clean_special_chars(df, &mut log)?;

        let names: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(names, vec!["name", "score ", "city"]);
        assert_eq!(
            text_cells(&df, "name")?,
            vec![Some("Alce".to_owned()), None, Some("Bb".to_owned())]
        );
        assert_eq!(
            text_cells(&df, "city")?,
            vec![
                Some("SãoPaulo".to_owned()),
                Some("Köln".to_owned()),
                Some("NY".to_owned()),
            ]
        );
        assert_eq!(
            log.lines(),
            [
                "Cleaned special characters in column 'name!'.",
                "Cleaned special characters in column 'city'.",
            ]
        );
        Ok(())
    }

    #[test]
    fn test_clean_special_chars_is_idempotent() -> Result<()> {
        let df = df!("a-b" => ["x.y", "z?"], "n" => [1i64, 2])?;
        let mut log = CleaningLog::new();
        let once = clean_special_chars(df, &mut log)?;
        let twice = clean_special_chars(once.clone(), &mut log)?;
        assert!(once.equals_missing(&twice));
        Ok(())
    }

    #[test]
    fn test_clean_special_chars_keeps_names_unique() -> Result<()> {
        let df = df!("a!" => [1i64], "a?" => [2i64], "a" => [3i64])?;
        let mut log = CleaningLog::new();
        let df = clean_special_chars(df, &mut log)?;

        let names: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(names, vec!["a", "a_1", "a_2"]);
        assert!(log.is_empty(), "no text columns, no log lines");
        Ok(())
    }

    #[test]
    fn test_fence_matches_reference_values() -> Result<()> {
        let values = Float64Chunked::from_slice("v".into(), &[1.0, 2.0, 3.0, 4.0, 5.0, 100.0]);
        let fence = OutlierFence::from_values(&values)?.expect("non-empty column");
        assert!((fence.q1 - 2.25).abs() < 1e-12);
        assert!((fence.q3 - 4.75).abs() < 1e-12);
        assert!((fence.lower - -1.5).abs() < 1e-12);
        assert!((fence.upper - 8.5).abs() < 1e-12);
        assert!(fence.contains(8.5));
        assert!(!fence.contains(100.0));
        Ok(())
    }

    #[test]
    fn test_handle_outliers_single_column() -> Result<()> {
        let df = df!("v" => [1i64, 2, 3, 4, 5, 100])?;
        let mut log = CleaningLog::new();
        let df = handle_outliers(df, &mut log)?;

        assert_eq!(df.height(), 5);
        assert_eq!(log.lines(), ["Removed 1 outlier rows from column 'v'."]);
        Ok(())
    }

    #[test]
    fn test_handle_outliers_narrows_column_by_column() -> Result<()> {
        let a = [1i64, 2, 3, 4, 5, 6, 7, 100];
        let b = [10i64, 10, 10, 10, 10, 10, 11, 50];
        let df = df!("a" => a, "b" => b)?;

        // Fences computed on the untouched table would flag one row in `a`
        // and two in `b` (11 and 50).
        let b_all = Float64Chunked::from_iter_values("b".into(), b.iter().map(|&v| v as f64));
        let b_fence = OutlierFence::from_values(&b_all)?.expect("non-empty column");
        let b_flagged = b.iter().filter(|&&v| !b_fence.contains(v as f64)).count();
        assert_eq!(b_flagged, 2);

        let mut log = CleaningLog::new();
        let df = handle_outliers(df, &mut log)?;

        // Dropping a=100 also drops b=50, so b's fence becomes [10, 10] and
        // only the 11 goes.
        assert_eq!(
            log.lines(),
            [
                "Removed 1 outlier rows from column 'a'.",
                "Removed 1 outlier rows from column 'b'.",
            ]
        );
        assert_eq!(df.height(), 6);
        Ok(())
    }

    #[test]
    fn test_handle_outliers_drops_missing_and_skips_text() -> Result<()> {
        let df = df!(
            "v" => [Some(1.0f64), Some(2.0), None, Some(3.0), Some(4.0), Some(5.0), Some(100.0)],
            "label" => ["a", "b", "c", "d", "e", "f", "g"],
        )?;
        let mut log = CleaningLog::new();
        let df = handle_outliers(df, &mut log)?;

        // The missing value goes with the row but is not counted as an outlier.
        assert_eq!(df.height(), 5);
        assert_eq!(df.column("v")?.null_count(), 0);
        assert_eq!(
            text_cells(&df, "label")?,
            ["a", "b", "d", "e", "f"].map(|s| Some(s.to_owned())).to_vec()
        );
        assert_eq!(log.lines(), ["Removed 1 outlier rows from column 'v'."]);
        Ok(())
    }

    #[test]
    fn test_handle_outliers_all_missing_column() -> Result<()> {
        let df = df!("v" => [None::<f64>, None])?;
        let mut log = CleaningLog::new();
        let df = handle_outliers(df, &mut log)?;

        assert_eq!(df.height(), 0);
        assert_eq!(log.lines(), ["Removed 0 outlier rows from column 'v'."]);
        Ok(())
    }
}
