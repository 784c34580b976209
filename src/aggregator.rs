//! Run-level statistics over successfully analyzed responses.
//!
//! Every ratio is guarded: a share or percentage of an empty set is 0, never
//! NaN. Record errors never reach this module.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::config::{AggregationConfig, SegmentField};
use crate::constants::clustering::UNTHEMED_LABEL;
use crate::data::{
    NormalizedText, Response, SentimentLabel, SentimentResult, Theme, ThemeAssignment,
    ThemeOrigin,
};
use crate::metadata::day_bucket;
use crate::normalizer::canonical_token;
use crate::types::{SegmentValue, ThemeId, ThemeLabel, Token};

/// Per-label counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCounts {
    /// Responses labeled negative.
    pub negative: usize,
    /// Responses labeled neutral.
    pub neutral: usize,
    /// Responses labeled positive.
    pub positive: usize,
}

impl LabelCounts {
    /// Count one response with `label`.
    pub fn add(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Negative => self.negative += 1,
            SentimentLabel::Neutral => self.neutral += 1,
            SentimentLabel::Positive => self.positive += 1,
        }
    }

    /// Count for `label`.
    pub fn get(&self, label: SentimentLabel) -> usize {
        match label {
            SentimentLabel::Negative => self.negative,
            SentimentLabel::Neutral => self.neutral,
            SentimentLabel::Positive => self.positive,
        }
    }

    /// Responses counted across all labels.
    pub fn total(&self) -> usize {
        self.negative + self.neutral + self.positive
    }
}

/// Per-label percentages in `0..=100`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelPercentages {
    /// Share of negative responses.
    pub negative: f64,
    /// Share of neutral responses.
    pub neutral: f64,
    /// Share of positive responses.
    pub positive: f64,
}

/// Sentiment label distribution.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    /// Responses counted.
    pub total: usize,
    /// Responses per label.
    pub counts: LabelCounts,
    /// Percentage per label.
    pub percentages: LabelPercentages,
}

impl SentimentDistribution {
    /// Derive totals and percentages from label counts.
    pub fn from_counts(counts: LabelCounts) -> Self {
        let total = counts.total();
        Self {
            total,
            counts,
            percentages: LabelPercentages {
                negative: percentage(counts.negative, total),
                neutral: percentage(counts.neutral, total),
                positive: percentage(counts.positive, total),
            },
        }
    }
}

/// Summary of polarity values (all zero for an empty set).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PolarityStats {
    /// Number of values summarized.
    pub count: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Median; the mean of the middle pair for even counts.
    pub median: f64,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
}

impl PolarityStats {
    /// Summarize polarity values.
    pub fn from_values(values: &[f32]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let mut sorted: Vec<f64> = values.iter().map(|v| f64::from(*v)).collect();
        sorted.sort_by(f64::total_cmp);
        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let median = if count % 2 == 1 {
            sorted[count / 2]
        } else {
            (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
        };
        Self {
            count,
            mean,
            median,
            min: sorted[0],
            max: sorted[count - 1],
        }
    }
}

/// Statistics for one value of a segment field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentStats {
    /// Segment value (an attribute value or a `YYYY-MM-DD` day).
    pub segment: SegmentValue,
    /// Label distribution within the segment.
    pub distribution: SentimentDistribution,
    /// Polarity summary within the segment.
    pub polarity: PolarityStats,
}

/// Breakdown of one segment field, segments sorted by value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentBreakdown {
    /// Display name of the segment field.
    pub field: String,
    /// Segments sorted by value.
    pub segments: Vec<SegmentStats>,
    /// Responses lacking the field (or carrying an unparsable date).
    pub missing: usize,
}

/// One row of the theme frequency table, in theme rank order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThemeFrequency {
    /// Theme id, matching [`Theme::theme_id`].
    pub theme_id: ThemeId,
    /// Theme label.
    pub label: ThemeLabel,
    /// Seeded or emergent.
    pub origin: ThemeOrigin,
    /// Responses that are members of the theme.
    pub member_count: usize,
    /// Member count as a percentage of analyzed responses.
    pub share: f64,
    /// Responses whose dominant theme this is.
    pub dominant_count: usize,
}

/// One row of the sentiment label x dominant theme table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CrossTabRow {
    /// `None` for the unthemed row.
    pub theme_id: Option<ThemeId>,
    /// Theme label, or the unthemed label.
    pub label: ThemeLabel,
    /// Dominant-theme responses per sentiment label.
    pub counts: LabelCounts,
}

/// Problem keyword concentrated in negative feedback.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriorityIssue {
    /// Problem keyword in canonical token form.
    pub issue: Token,
    /// Occurrences across negative responses.
    pub frequency: usize,
    /// Frequency as a percentage of analyzed responses.
    pub percentage: f64,
}

/// Occurrences of a seeded keyword across analyzed responses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordFrequency {
    /// Seeded keyword in canonical token form.
    pub keyword: Token,
    /// Occurrences across analyzed responses.
    pub count: usize,
}

/// Aggregate statistics of one run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    /// Successfully analyzed responses (errors excluded).
    pub analyzed: usize,
    /// Label distribution over every analyzed response.
    pub distribution: SentimentDistribution,
    /// Polarity summary over every analyzed response.
    pub polarity: PolarityStats,
    /// One breakdown per configured segment field.
    pub segments: Vec<SegmentBreakdown>,
    /// Themes in rank order.
    pub theme_frequency: Vec<ThemeFrequency>,
    /// Theme rows in rank order followed by the unthemed row.
    pub cross_tab: Vec<CrossTabRow>,
    /// Most frequent problem keywords in negative responses.
    pub priority_issues: Vec<PriorityIssue>,
    /// Seeded keywords by count descending, then alphabetically.
    pub keyword_frequency: Vec<KeywordFrequency>,
}

/// One successfully analyzed response.
#[derive(Clone, Copy, Debug)]
pub struct AnalyzedRecord<'a> {
    /// The response as submitted.
    pub response: &'a Response,
    /// Its normalized tokens.
    pub text: &'a NormalizedText,
    /// Its sentiment result.
    pub sentiment: &'a SentimentResult,
}

/// Merges per-response results into [`AggregateStats`].
#[derive(Clone, Debug)]
pub struct Aggregator {
    config: AggregationConfig,
    problem_keywords: HashSet<Token>,
    seeded_keywords: HashSet<Token>,
}

impl Aggregator {
    /// `seeded_keywords` are the normalized keywords of every seeded theme.
    pub fn new<I>(config: &AggregationConfig, seeded_keywords: I) -> Self
    where
        I: IntoIterator<Item = Token>,
    {
        Self {
            config: config.clone(),
            problem_keywords: config
                .problem_keywords
                .iter()
                .filter_map(|word| canonical_token(word))
                .collect(),
            seeded_keywords: seeded_keywords.into_iter().collect(),
        }
    }

    /// Compute run statistics from analyzed records and clustering output.
    pub fn aggregate(
        &self,
        records: &[AnalyzedRecord<'_>],
        themes: &[Theme],
        assignments: &[ThemeAssignment],
    ) -> AggregateStats {
        let analyzed = records.len();
        let mut counts = LabelCounts::default();
        for record in records {
            counts.add(record.sentiment.label);
        }
        let polarities: Vec<f32> = records.iter().map(|r| r.sentiment.polarity).collect();

        let dominant: HashMap<&str, ThemeId> = assignments
            .iter()
            .map(|a| (a.response_id.as_str(), a.theme_id))
            .collect();

        AggregateStats {
            analyzed,
            distribution: SentimentDistribution::from_counts(counts),
            polarity: PolarityStats::from_values(&polarities),
            segments: self
                .config
                .segment_fields
                .iter()
                .map(|field| segment_breakdown(field, records))
                .collect(),
            theme_frequency: theme_frequency(themes, assignments, analyzed),
            cross_tab: cross_tab(themes, records, &dominant),
            priority_issues: self.priority_issues(records),
            keyword_frequency: self.keyword_frequency(records),
        }
    }

    fn priority_issues(&self, records: &[AnalyzedRecord<'_>]) -> Vec<PriorityIssue> {
        let analyzed = records.len();
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for record in records
            .iter()
            .filter(|r| r.sentiment.label == SentimentLabel::Negative)
        {
            for token in &record.text.tokens {
                if self.problem_keywords.contains(token) {
                    *counts.entry(token.as_str()).or_default() += 1;
                }
            }
        }
        let mut ranked = ranked_counts(counts);
        ranked.truncate(self.config.max_issues);
        ranked
            .into_iter()
            .map(|(issue, frequency)| PriorityIssue {
                issue: issue.to_string(),
                frequency,
                percentage: percentage(frequency, analyzed),
            })
            .collect()
    }

    fn keyword_frequency(&self, records: &[AnalyzedRecord<'_>]) -> Vec<KeywordFrequency> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for record in records {
            for token in &record.text.tokens {
                if self.seeded_keywords.contains(token) {
                    *counts.entry(token.as_str()).or_default() += 1;
                }
            }
        }
        ranked_counts(counts)
            .into_iter()
            .filter(|(_, count)| *count >= self.config.min_keyword_frequency)
            .map(|(keyword, count)| KeywordFrequency {
                keyword: keyword.to_string(),
                count,
            })
            .collect()
    }
}

fn segment_breakdown(field: &SegmentField, records: &[AnalyzedRecord<'_>]) -> SegmentBreakdown {
    let mut groups: BTreeMap<SegmentValue, (LabelCounts, Vec<f32>)> = BTreeMap::new();
    let mut missing = 0usize;
    for record in records {
        let raw = record.response.meta(field.key());
        let value = match (field, raw) {
            (_, None) => None,
            (SegmentField::Attribute(_), Some(raw)) => {
                Some(raw.trim().to_string()).filter(|value| !value.is_empty())
            }
            (SegmentField::Day(_), Some(raw)) => day_bucket(raw),
        };
        let Some(value) = value else {
            missing += 1;
            continue;
        };
        let (counts, polarities) = groups.entry(value).or_default();
        counts.add(record.sentiment.label);
        polarities.push(record.sentiment.polarity);
    }
    SegmentBreakdown {
        field: field.name(),
        segments: groups
            .into_iter()
            .map(|(segment, (counts, polarities))| SegmentStats {
                segment,
                distribution: SentimentDistribution::from_counts(counts),
                polarity: PolarityStats::from_values(&polarities),
            })
            .collect(),
        missing,
    }
}

fn theme_frequency(
    themes: &[Theme],
    assignments: &[ThemeAssignment],
    analyzed: usize,
) -> Vec<ThemeFrequency> {
    let mut dominant_counts: HashMap<ThemeId, usize> = HashMap::new();
    for assignment in assignments {
        *dominant_counts.entry(assignment.theme_id).or_default() += 1;
    }
    themes
        .iter()
        .map(|theme| ThemeFrequency {
            theme_id: theme.theme_id,
            label: theme.label.clone(),
            origin: theme.origin,
            member_count: theme.member_count(),
            share: percentage(theme.member_count(), analyzed),
            dominant_count: dominant_counts.get(&theme.theme_id).copied().unwrap_or(0),
        })
        .collect()
}

fn cross_tab(
    themes: &[Theme],
    records: &[AnalyzedRecord<'_>],
    dominant: &HashMap<&str, ThemeId>,
) -> Vec<CrossTabRow> {
    let mut rows: Vec<CrossTabRow> = themes
        .iter()
        .map(|theme| CrossTabRow {
            theme_id: Some(theme.theme_id),
            label: theme.label.clone(),
            counts: LabelCounts::default(),
        })
        .collect();
    let row_of: HashMap<ThemeId, usize> = themes
        .iter()
        .enumerate()
        .map(|(row, theme)| (theme.theme_id, row))
        .collect();
    let mut unthemed = CrossTabRow {
        theme_id: None,
        label: UNTHEMED_LABEL.to_string(),
        counts: LabelCounts::default(),
    };
    for record in records {
        let row = dominant
            .get(record.sentiment.response_id.as_str())
            .and_then(|theme_id| row_of.get(theme_id));
        match row {
            Some(row) => rows[*row].counts.add(record.sentiment.label),
            None => unthemed.counts.add(record.sentiment.label),
        }
    }
    rows.push(unthemed);
    rows
}

/// Count descending, then token ascending.
fn ranked_counts(counts: HashMap<&str, usize>) -> Vec<(&str, usize)> {
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
}

/// `part / total * 100`, defined as 0 for an empty total.
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}
