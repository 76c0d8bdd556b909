use std::collections::HashMap;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::data::model::{Column, ColumnKind, Dataset, Value};

// ---------------------------------------------------------------------------
// Analysis result
// ---------------------------------------------------------------------------

/// Everything the narrative prompt is built from. Built once per run.
///
/// Serializes to a JSON object whose per-column maps keep header order.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    #[serde(serialize_with = "ordered_map")]
    pub summary: Vec<(String, ColumnSummary)>,
    #[serde(serialize_with = "ordered_map")]
    pub missing_values: Vec<(String, usize)>,
    pub correlation: Correlation,
}

impl Analysis {
    pub fn summary_of(&self, column: &str) -> Option<&ColumnSummary> {
        self.summary
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, s)| s)
    }

    pub fn missing_of(&self, column: &str) -> Option<usize> {
        self.missing_values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, n)| *n)
    }
}

/// Descriptive statistics for one column; the shape depends on its kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColumnSummary {
    Numeric(NumericSummary),
    Categorical(CategoricalSummary),
}

/// Statistics over the non-missing values of a numeric column.
/// `None` marks a statistic that is undefined for the sample size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (n − 1).
    pub std: Option<f64>,
    pub min: Option<f64>,
    #[serde(rename = "25%")]
    pub q1: Option<f64>,
    #[serde(rename = "50%")]
    pub median: Option<f64>,
    #[serde(rename = "75%")]
    pub q3: Option<f64>,
    pub max: Option<f64>,
}

/// Frequency statistics for a text or boolean column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalSummary {
    pub count: usize,
    pub unique: usize,
    /// Most frequent value; ties go to the value seen first.
    pub top: Option<String>,
    pub freq: usize,
}

/// Pairwise Pearson correlations between numeric columns.
///
/// Empty when fewer than two numeric columns exist. A cell is `None` when
/// the pair has fewer than two complete rows or zero variance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Correlation {
    pub columns: Vec<String>,
    pub matrix: Vec<Vec<Option<f64>>>,
}

impl Correlation {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.matrix[i][j]
    }
}

impl Serialize for Correlation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Row<'a> {
            columns: &'a [String],
            values: &'a [Option<f64>],
        }
        impl Serialize for Row<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.columns.len()))?;
                for (name, v) in self.columns.iter().zip(self.values) {
                    map.serialize_entry(name, v)?;
                }
                map.end()
            }
        }

        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, values) in self.columns.iter().zip(&self.matrix) {
            let row = Row {
                columns: &self.columns,
                values,
            };
            map.serialize_entry(name, &row)?;
        }
        map.end()
    }
}

fn ordered_map<S, V>(entries: &[(String, V)], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    V: Serialize,
{
    let mut map = serializer.serialize_map(Some(entries.len()))?;
    for (k, v) in entries {
        map.serialize_entry(k, v)?;
    }
    map.end()
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Compute summary statistics, missing counts and correlations.
pub fn analyze(dataset: &Dataset) -> Analysis {
    let summary = dataset
        .columns
        .iter()
        .map(|col| (col.name.clone(), summarize_column(col)))
        .collect();

    let missing_values = dataset
        .columns
        .iter()
        .map(|col| (col.name.clone(), col.null_count()))
        .collect();

    Analysis {
        summary,
        missing_values,
        correlation: correlate(dataset),
    }
}

fn summarize_column(col: &Column) -> ColumnSummary {
    match col.kind {
        ColumnKind::Integer | ColumnKind::Float => {
            ColumnSummary::Numeric(summarize_numeric(&col.numeric_values()))
        }
        ColumnKind::Boolean | ColumnKind::Text => {
            ColumnSummary::Categorical(summarize_categorical(&col.values))
        }
    }
}

pub fn summarize_numeric(values: &[f64]) -> NumericSummary {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    NumericSummary {
        count: values.len(),
        mean: mean(values),
        std: sample_std(values),
        min: sorted.first().copied(),
        q1: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q3: quantile(&sorted, 0.75),
        max: sorted.last().copied(),
    }
}

fn summarize_categorical(values: &[Value]) -> CategoricalSummary {
    // value → (count, first index seen)
    let mut counts: HashMap<&Value, (usize, usize)> = HashMap::new();
    let mut count = 0;
    for (idx, v) in values.iter().enumerate() {
        if v.is_null() {
            continue;
        }
        count += 1;
        counts.entry(v).or_insert((0, idx)).0 += 1;
    }

    let top = counts
        .iter()
        .max_by(|(_, (ca, ia)), (_, (cb, ib))| ca.cmp(cb).then(ib.cmp(ia)))
        .map(|(v, (c, _))| (v.to_string(), *c));

    CategoricalSummary {
        count,
        unique: counts.len(),
        freq: top.as_ref().map_or(0, |(_, c)| *c),
        top: top.map(|(v, _)| v),
    }
}

fn correlate(dataset: &Dataset) -> Correlation {
    let numeric: Vec<&Column> = dataset.numeric_columns().collect();
    if numeric.len() < 2 {
        return Correlation::default();
    }

    let series: Vec<Vec<Option<f64>>> = numeric
        .iter()
        .map(|c| c.values.iter().map(Value::as_f64).collect())
        .collect();

    let n = numeric.len();
    let mut matrix = vec![vec![None; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = pearson_pairwise(&series[i], &series[j]);
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }

    Correlation {
        columns: numeric.iter().map(|c| c.name.clone()).collect(),
        matrix,
    }
}

// ---------------------------------------------------------------------------
// Numeric helpers
// ---------------------------------------------------------------------------

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation; needs at least two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// Quantile of already-sorted data with linear interpolation.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Pearson r over rows where both series have a value.
fn pearson_pairwise(a: &[Option<f64>], b: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let my = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for &(x, y) in &pairs {
        sxy += (x - mx) * (y - my);
        sxx += (x - mx).powi(2);
        syy += (y - my).powi(2);
    }
    let denom = (sxx * syy).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }
    Some((sxy / denom).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::parse_csv;

    fn approx(a: Option<f64>, b: f64) -> bool {
        a.map_or(false, |a| (a - b).abs() < 1e-10)
    }

    #[test]
    fn four_row_reference_values() {
        let ds = parse_csv("x,y\n1,10\n2,20\n3,\n4,40\n").unwrap();
        let analysis = analyze(&ds);

        let Some(ColumnSummary::Numeric(x)) = analysis.summary_of("x") else {
            panic!("x should be numeric");
        };
        assert_eq!(x.count, 4);
        assert!(approx(x.mean, 2.5));
        assert!(approx(x.std, (5.0f64 / 3.0).sqrt()));
        assert!(approx(x.q1, 1.75));
        assert!(approx(x.median, 2.5));
        assert!(approx(x.q3, 3.25));

        let Some(ColumnSummary::Numeric(y)) = analysis.summary_of("y") else {
            panic!("y should be numeric");
        };
        assert_eq!(y.count, 3);
        assert!(approx(y.mean, 70.0 / 3.0));
        assert!(approx(y.std, (700.0f64 / 3.0).sqrt()));
        assert!(approx(y.min, 10.0));
        assert!(approx(y.max, 40.0));

        assert_eq!(analysis.missing_of("x"), Some(0));
        assert_eq!(analysis.missing_of("y"), Some(1));
        assert!(approx(analysis.correlation.get("x", "y"), 1.0));
    }

    #[test]
    fn missing_counts_are_bounded_by_rows() {
        let ds = parse_csv("a,b,c\n1,,x\n,,\nNA,2,y\n").unwrap();
        let analysis = analyze(&ds);
        for (_, n) in &analysis.missing_values {
            assert!(*n <= ds.len());
        }
        assert_eq!(analysis.missing_of("a"), Some(2));
        assert_eq!(analysis.missing_of("b"), Some(2));
        assert_eq!(analysis.missing_of("c"), Some(1));
    }

    #[test]
    fn correlation_empty_with_fewer_than_two_numeric_columns() {
        let ds = parse_csv("name,score\na,1\nb,2\n").unwrap();
        let analysis = analyze(&ds);
        assert!(analysis.correlation.is_empty());

        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["correlation"], serde_json::json!({}));
    }

    #[test]
    fn constant_column_correlation_is_undefined() {
        let ds = parse_csv("a,b\n1,5\n2,5\n3,5\n").unwrap();
        let analysis = analyze(&ds);
        assert_eq!(analysis.correlation.get("a", "b"), None);
        assert!(approx(analysis.correlation.get("a", "a"), 1.0));
    }

    #[test]
    fn categorical_top_and_freq() {
        let ds = parse_csv("c,flag\nred,true\nblue,false\nred,true\nblue,\ngreen,true\n").unwrap();
        let analysis = analyze(&ds);

        let Some(ColumnSummary::Categorical(c)) = analysis.summary_of("c") else {
            panic!("c should be categorical");
        };
        assert_eq!(c.count, 5);
        assert_eq!(c.unique, 3);
        // red and blue tie at 2; red was seen first.
        assert_eq!(c.top.as_deref(), Some("red"));
        assert_eq!(c.freq, 2);

        let Some(ColumnSummary::Categorical(flag)) = analysis.summary_of("flag") else {
            panic!("flag should be categorical");
        };
        assert_eq!(flag.top.as_deref(), Some("true"));
        assert_eq!(flag.freq, 3);
    }

    #[test]
    fn single_value_has_no_std() {
        let s = summarize_numeric(&[7.0]);
        assert_eq!(s.count, 1);
        assert_eq!(s.std, None);
        assert!(approx(s.median, 7.0));
    }

    #[test]
    fn serialized_summary_keeps_column_order() {
        let ds = parse_csv("zeta,alpha\n1,2\n3,4\n").unwrap();
        let json = serde_json::to_string(&analyze(&ds)).unwrap();
        let zeta = json.find("\"zeta\"").unwrap();
        let alpha = json.find("\"alpha\"").unwrap();
        assert!(zeta < alpha);
        assert!(json.contains("\"25%\""));
    }

    #[test]
    fn mixed_text_column_counts_raw_values() {
        let ds = parse_csv("code\n1.0\n1\n007\nabc\nTrue\n").unwrap();
        let analysis = analyze(&ds);
        let Some(ColumnSummary::Categorical(code)) = analysis.summary_of("code") else {
            panic!("code should be categorical");
        };
        assert_eq!(code.count, 5);
        assert_eq!(code.unique, 5);
        assert_eq!(code.top.as_deref(), Some("1.0"));
    }

    #[test]
    fn all_missing_column_is_numeric() {
        let ds = parse_csv("a,b,empty\n1,2,\n2,4,\n3,5,NA\n").unwrap();
        let analysis = analyze(&ds);

        let Some(ColumnSummary::Numeric(empty)) = analysis.summary_of("empty") else {
            panic!("empty should be numeric");
        };
        assert_eq!(empty.count, 0);
        assert_eq!(empty.mean, None);
        assert_eq!(empty.min, None);
        assert_eq!(analysis.missing_of("empty"), Some(3));

        assert_eq!(analysis.correlation.columns, vec!["a", "b", "empty"]);
        assert_eq!(analysis.correlation.get("a", "empty"), None);
        assert_eq!(analysis.correlation.get("empty", "empty"), None);

        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["summary"]["empty"]["count"], serde_json::json!(0));
        assert!(json["summary"]["empty"]["mean"].is_null());
    }
}
