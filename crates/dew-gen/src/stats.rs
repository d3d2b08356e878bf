//! Descriptive statistics for the two DEW splits.
//!
//! DEW-MathQ statistics are computed from generated entries, DEW-LogiQ
//! statistics from the split's question records. Both are read as loosely
//! as possible: missing fields count as empty.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// MathQ questions carry a preamble before this marker.
const MATHQ_QUESTION_MARKER: &str = "\n\nquestion: ";

const UNKNOWN: &str = "Unknown";

// ============================================================================
// Summary
// ============================================================================

/// Mean, median and maximum of a length distribution.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Summary {
    pub mean: f64,
    pub median: f64,
    pub max: usize,
}

impl Summary {
    /// `None` for an empty sample.
    pub fn of(values: &[usize]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_unstable();
        let n = sorted.len();
        let median = if n % 2 == 1 {
            sorted[n / 2] as f64
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) as f64 / 2.0
        };
        Some(Self {
            mean: sorted.iter().sum::<usize>() as f64 / n as f64,
            median,
            max: sorted[n - 1],
        })
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Mean: {:.1}, Median: {:.1}, Max: {}",
            self.mean, self.median, self.max
        )
    }
}

// ============================================================================
// Question types
// ============================================================================

/// Question type by leading word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum QuestionType {
    What,
    Which,
    How,
    When,
    Where,
    Why,
    Calculate,
    Determine,
    Find,
    If,
    Other,
}

impl QuestionType {
    const PREFIXES: [(&'static str, QuestionType); 10] = [
        ("what ", Self::What),
        ("which ", Self::Which),
        ("how ", Self::How),
        ("when ", Self::When),
        ("where ", Self::Where),
        ("why ", Self::Why),
        ("calculate ", Self::Calculate),
        ("determine ", Self::Determine),
        ("find ", Self::Find),
        ("if ", Self::If),
    ];

    /// Classify a question. MathQ questions are classified by the text
    /// after their last `question: ` marker.
    ///
    /// ```rust
    /// use dew_gen::stats::QuestionType;
    ///
    /// assert_eq!(QuestionType::classify("  How much water?", false), QuestionType::How);
    /// assert_eq!(
    ///     QuestionType::classify("Context.\n\nQuestion: Find the cost.", true),
    ///     QuestionType::Find
    /// );
    /// ```
    pub fn classify(question: &str, mathq: bool) -> Self {
        let lowered = question.trim().to_lowercase();
        let text = if mathq {
            lowered
                .rsplit(MATHQ_QUESTION_MARKER)
                .next()
                .unwrap_or(lowered.as_str())
        } else {
            lowered.as_str()
        };
        Self::PREFIXES
            .iter()
            .find(|(prefix, _)| text.starts_with(prefix))
            .map(|&(_, kind)| kind)
            .unwrap_or(Self::Other)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::What => "What",
            Self::Which => "Which",
            Self::How => "How",
            Self::When => "When",
            Self::Where => "Where",
            Self::Why => "Why",
            Self::Calculate => "Calculate",
            Self::Determine => "Determine",
            Self::Find => "Find",
            Self::If => "If",
            Self::Other => "Other",
        }
    }
}

/// The most frequent key; ties go to the smallest key.
fn most_common<K: Ord + Copy>(counts: &BTreeMap<K, usize>) -> Option<K> {
    counts
        .iter()
        .fold(None, |best: Option<(K, usize)>, (&k, &n)| match best {
            Some((_, m)) if m >= n => best,
            _ => Some((k, n)),
        })
        .map(|(k, _)| k)
}

fn count<'a>(values: impl Iterator<Item = &'a str>) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for v in values {
        *counts.entry(v.to_string()).or_insert(0) += 1;
    }
    counts
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

// ============================================================================
// DEW-MathQ
// ============================================================================

/// Statistics of a generated DEW-MathQ file.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MathQStats {
    pub total_questions: usize,
    pub domain_counts: BTreeMap<String, usize>,
    /// Words per non-empty question.
    pub question_lengths: Vec<usize>,
    /// Characters of all options of one question joined as `value unit`.
    pub option_lengths: Vec<usize>,
    pub question_type_counts: BTreeMap<QuestionType, usize>,
}

impl MathQStats {
    pub fn from_entries(entries: &[serde_json::Value]) -> Self {
        let mut stats = Self {
            total_questions: entries.len(),
            domain_counts: count(
                entries
                    .iter()
                    .map(|e| e.get("domain").and_then(|d| d.as_str()).unwrap_or(UNKNOWN)),
            ),
            ..Self::default()
        };

        for entry in entries {
            let question = entry
                .get("gold_problem")
                .and_then(|q| q.as_str())
                .unwrap_or("");
            if !question.is_empty() {
                stats.question_lengths.push(word_count(question));
            }
            *stats
                .question_type_counts
                .entry(QuestionType::classify(question, true))
                .or_insert(0) += 1;

            let Some(mc) = entry
                .get("multiple_choice_options")
                .and_then(|m| m.as_object())
            else {
                continue;
            };
            for question in mc.values() {
                let combined = options_text(question);
                if !combined.is_empty() {
                    stats.option_lengths.push(combined.chars().count());
                }
            }
        }
        stats
    }

    pub fn unique_domains(&self) -> usize {
        self.domain_counts.len()
    }

    pub fn question_length(&self) -> Option<Summary> {
        Summary::of(&self.question_lengths)
    }

    pub fn option_length(&self) -> Option<Summary> {
        Summary::of(&self.option_lengths)
    }

    pub fn most_common_question_type(&self) -> Option<QuestionType> {
        most_common(&self.question_type_counts)
    }
}

/// Options of one question as `"v1 u1 v2 u2 ..."`.
fn options_text(question: &serde_json::Value) -> String {
    let Some(options) = question.get("options").and_then(|o| o.as_array()) else {
        return String::new();
    };
    options
        .iter()
        .map(|option| match option {
            serde_json::Value::Object(map) => {
                let value = map.get("value").map(json_text).unwrap_or_default();
                let unit = map.get("unit").map(json_text).unwrap_or_default();
                format!("{value} {unit}").trim().to_string()
            }
            other => json_text(other),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn json_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ============================================================================
// DEW-LogiQ
// ============================================================================

/// One DEW-LogiQ question record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogiQRecord {
    pub question: String,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub answer_truth: String,
    #[serde(rename = "answer_option_A")]
    pub answer_option_a: String,
    #[serde(rename = "answer_option_B")]
    pub answer_option_b: String,
    #[serde(rename = "answer_option_C")]
    pub answer_option_c: String,
    pub knowledge_context: String,
}

/// Statistics of the DEW-LogiQ split.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LogiQStats {
    pub total_questions: usize,
    pub category_counts: BTreeMap<String, usize>,
    pub subcategory_counts: BTreeMap<String, usize>,
    /// Words per non-empty question.
    pub question_lengths: Vec<usize>,
    /// Characters of the answer and the three options joined by spaces.
    pub option_lengths: Vec<usize>,
    /// Characters per non-empty knowledge context.
    pub context_lengths: Vec<usize>,
    pub question_type_counts: BTreeMap<QuestionType, usize>,
}

impl LogiQStats {
    pub fn from_records(records: &[LogiQRecord]) -> Self {
        let mut stats = Self {
            total_questions: records.len(),
            category_counts: count(records.iter().map(|r| r.category.as_deref().unwrap_or(UNKNOWN))),
            subcategory_counts: count(
                records
                    .iter()
                    .map(|r| r.subcategory.as_deref().unwrap_or(UNKNOWN)),
            ),
            ..Self::default()
        };

        for record in records {
            if !record.question.is_empty() {
                stats.question_lengths.push(word_count(&record.question));
            }
            let options = format!(
                "{} {} {} {}",
                record.answer_truth,
                record.answer_option_a,
                record.answer_option_b,
                record.answer_option_c
            );
            let options = options.trim();
            if !options.is_empty() {
                stats.option_lengths.push(options.chars().count());
            }
            if !record.knowledge_context.is_empty() {
                stats
                    .context_lengths
                    .push(record.knowledge_context.chars().count());
            }
            *stats
                .question_type_counts
                .entry(QuestionType::classify(&record.question, false))
                .or_insert(0) += 1;
        }
        stats
    }

    pub fn unique_categories(&self) -> usize {
        self.category_counts.len()
    }

    pub fn unique_subcategories(&self) -> usize {
        self.subcategory_counts.len()
    }

    pub fn question_length(&self) -> Option<Summary> {
        Summary::of(&self.question_lengths)
    }

    pub fn option_length(&self) -> Option<Summary> {
        Summary::of(&self.option_lengths)
    }

    pub fn context_length(&self) -> Option<Summary> {
        Summary::of(&self.context_lengths)
    }

    pub fn most_common_question_type(&self) -> Option<QuestionType> {
        most_common(&self.question_type_counts)
    }
}

// ============================================================================
// Summary table
// ============================================================================

fn mean_text(values: &[usize]) -> String {
    Summary::of(values)
        .map(|s| format!("{:.0}", s.mean))
        .unwrap_or_else(|| "N/A".to_string())
}

fn type_text(kind: Option<QuestionType>) -> String {
    kind.map(|k| k.name().to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

/// Side-by-side summary of both splits as a plain-text table.
pub fn summary_table(math: &MathQStats, logiq: Option<&LogiQStats>) -> String {
    let na = || "N/A".to_string();
    let mut rows: Vec<(&str, String, Option<String>)> = vec![
        (
            "Total Questions",
            math.total_questions.to_string(),
            logiq.map(|l| l.total_questions.to_string()),
        ),
        (
            "Unique Domains/Categories",
            math.unique_domains().to_string(),
            logiq.map(|l| l.unique_categories().to_string()),
        ),
        (
            "Unique Subdomains/Subcategories",
            na(),
            logiq.map(|l| l.unique_subcategories().to_string()),
        ),
        (
            "Avg Question Length (words)",
            mean_text(&math.question_lengths),
            logiq.map(|l| mean_text(&l.question_lengths)),
        ),
        (
            "Avg MC Options Length (chars)",
            mean_text(&math.option_lengths),
            logiq.map(|l| mean_text(&l.option_lengths)),
        ),
        (
            "Avg Knowledge Context Length (chars)",
            na(),
            logiq.map(|l| mean_text(&l.context_lengths)),
        ),
        (
            "Most Common Question Type",
            type_text(math.most_common_question_type()),
            logiq.map(|l| type_text(l.most_common_question_type())),
        ),
    ];
    rows.push((
        "Domain/Category Coverage",
        "Mathematical water management".to_string(),
        logiq.map(|_| "Conceptual water management".to_string()),
    ));

    let header = ("Metric", "DEW-MathQ", "DEW-LogiQ");
    let w0 = rows.iter().map(|r| r.0.len()).max().unwrap_or(0).max(header.0.len());
    let w1 = rows.iter().map(|r| r.1.len()).max().unwrap_or(0).max(header.1.len());

    let mut out = String::new();
    let mut line = |a: &str, b: &str, c: Option<&str>| {
        let row = match c {
            Some(c) => format!("{a:<w0$}  {b:<w1$}  {c}"),
            None => format!("{a:<w0$}  {b}"),
        };
        out.push_str(row.trim_end());
        out.push('\n');
    };
    line(header.0, header.1, logiq.map(|_| header.2));
    for (metric, m, l) in &rows {
        line(metric, m, l.as_deref());
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn math_entries() -> Vec<serde_json::Value> {
        vec![
            json!({
                "domain": "economic evaluations",
                "gold_problem": "Calculate the cost per acre for 120.0 acres.",
                "multiple_choice_options": {
                    "IOFCPA": {"options": [
                        {"value": 12.5, "unit": "dollar", "is_correct": true},
                        {"value": 125, "unit": "dollar", "is_correct": false}
                    ], "correct_index": 0}
                }
            }),
            json!({
                "domain": "economic evaluations",
                "gold_problem": "What is the total cost?",
                "multiple_choice_options": {}
            }),
            json!({"gold_problem": "Background.\n\nQuestion: How much water is saved?"}),
        ]
    }

    #[test]
    fn test_summary() {
        let s = Summary::of(&[3, 1, 4, 2]).unwrap();
        assert_eq!(s.mean, 2.5);
        assert_eq!(s.median, 2.5);
        assert_eq!(s.max, 4);
        assert_eq!(Summary::of(&[5, 1, 3]).unwrap().median, 3.0);
        assert!(Summary::of(&[]).is_none());
        assert_eq!(s.to_string(), "Mean: 2.5, Median: 2.5, Max: 4");
    }

    #[test]
    fn test_classify() {
        assert_eq!(QuestionType::classify("Determine the head.", false), QuestionType::Determine);
        assert_eq!(QuestionType::classify("Whatever", false), QuestionType::Other);
        assert_eq!(QuestionType::classify("", false), QuestionType::Other);
        // the marker is only honored for MathQ
        assert_eq!(
            QuestionType::classify("Intro.\n\nquestion: why is that?", false),
            QuestionType::Other
        );
    }

    #[test]
    fn test_mathq_stats() {
        let stats = MathQStats::from_entries(&math_entries());
        assert_eq!(stats.total_questions, 3);
        assert_eq!(stats.domain_counts["economic evaluations"], 2);
        assert_eq!(stats.domain_counts["Unknown"], 1);
        assert_eq!(stats.unique_domains(), 2);
        assert_eq!(stats.question_lengths, vec![8, 5, 7]);
        // "12.5 dollar 125 dollar"
        assert_eq!(stats.option_lengths, vec![22]);
        assert_eq!(stats.question_type_counts[&QuestionType::How], 1);
        assert_eq!(stats.most_common_question_type(), Some(QuestionType::What));
    }

    #[test]
    fn test_logiq_stats() {
        let records: Vec<LogiQRecord> = serde_json::from_value(json!([
            {
                "question": "Which method reduces deep percolation?",
                "category": "Irrigation",
                "subcategory": "Efficiency",
                "answer_truth": "Surge",
                "answer_option_A": "Flood",
                "answer_option_B": "Basin",
                "answer_option_C": "Border",
                "knowledge_context": "Surge flow."
            },
            {"question": "Why line canals?", "category": "Irrigation"}
        ]))
        .unwrap();
        let stats = LogiQStats::from_records(&records);
        assert_eq!(stats.unique_categories(), 1);
        assert_eq!(stats.subcategory_counts["Unknown"], 1);
        assert_eq!(stats.option_lengths, vec!["Surge Flood Basin Border".len()]);
        assert_eq!(stats.context_lengths, vec![11]);
        assert_eq!(stats.question_lengths, vec![5, 3]);
        assert_eq!(stats.most_common_question_type(), Some(QuestionType::Which));
    }

    #[test]
    fn test_summary_table() {
        let math = MathQStats::from_entries(&math_entries());
        let table = summary_table(&math, None);
        assert!(table.starts_with("Metric"));
        assert!(table.contains("Total Questions"));
        assert!(table.lines().any(|l| l.starts_with("Unique Subdomains/Subcategories") && l.ends_with("N/A")));
        assert!(!table.contains("DEW-LogiQ"));

        let logiq = LogiQStats::from_records(&[LogiQRecord {
            question: "Which crop?".to_string(),
            ..LogiQRecord::default()
        }]);
        let table = summary_table(&math, Some(&logiq));
        assert!(table.lines().next().unwrap().ends_with("DEW-LogiQ"));
        assert!(table.contains("Conceptual water management"));
    }
}
