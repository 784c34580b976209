use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum, error::ErrorKind};

use crate::config::{AnalysisConfig, MetricKind, Membership};
use crate::constants::metadata::{META_FIELD_SEGMENT, META_FIELD_TIMESTAMP};
use crate::{AnalysisPipeline, AnalysisRun, LexiconStore, Response};

/// Sample UX feedback used when no `--input` file is given.
const SAMPLE_FEEDBACK: &[&str] = &[
    "The interface is really intuitive and easy to use. Love the new design!",
    "Search function is too slow and often doesn't find what I'm looking for",
    "Great recommendations, very personalized and relevant to my interests",
    "App keeps crashing when I try to browse different categories",
    "Loading times are terrible, makes the whole experience frustrating",
    "Simple and clean layout, navigation is straightforward",
    "Voice search never understands what I'm saying, very confusing",
    "Amazing user experience, everything works perfectly",
    "Too many bugs and errors, needs better quality control",
    "Fast and responsive, great performance overall",
    "Difficult to find new content, browsing is complicated",
    "Love the personalized suggestions, very accurate",
    "Interface design is beautiful and modern",
    "Frequent crashes and technical issues are annoying",
    "Easy to use and understand, very intuitive",
    "Slow loading makes me want to use other apps instead",
    "Great job on the recent updates, much better now",
    "Search results are not relevant to what I'm looking for",
    "Smooth and fast, excellent performance",
    "Confusing navigation, hard to find what I want",
];

const SAMPLE_SEGMENTS: &[&str] = &["consumer", "enterprise"];

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MetricArg {
    Overlap,
    Jaccard,
    Dice,
}

impl From<MetricArg> for MetricKind {
    fn from(value: MetricArg) -> Self {
        match value {
            MetricArg::Overlap => MetricKind::OverlapCoefficient,
            MetricArg::Jaccard => MetricKind::Jaccard,
            MetricArg::Dice => MetricKind::Dice,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "feedback_demo",
    disable_help_subcommand = true,
    about = "Analyze a batch of open-ended feedback",
    long_about = "Score sentiment, cluster themes, and print run statistics for a feedback batch.",
    after_help = "Without --input a built-in batch of UX feedback is analyzed. Set RUST_LOG=feedback_analysis=debug for pipeline logs."
)]
struct FeedbackDemoCli {
    #[arg(
        long,
        value_name = "PATH",
        help = "JSON array of responses ({\"id\", \"raw_text\", \"metadata\"})"
    )]
    input: Option<PathBuf>,
    #[arg(
        long,
        value_name = "PATH",
        help = "JSON analysis configuration; omitted fields take defaults"
    )]
    config: Option<PathBuf>,
    #[arg(long = "negation-window", help = "Override the negation window")]
    negation_window: Option<usize>,
    #[arg(
        long = "min-similarity",
        value_parser = parse_unit_f32,
        help = "Override the seeded theme similarity threshold"
    )]
    min_similarity: Option<f32>,
    #[arg(long, value_enum, help = "Override the similarity metric")]
    metric: Option<MetricArg>,
    #[arg(long, help = "Assign each response to its dominant theme only")]
    dominant: bool,
    #[arg(long = "no-emergent", help = "Disable emergent themes")]
    no_emergent: bool,
    #[arg(long, help = "Print the full run as JSON instead of a summary")]
    json: bool,
}

/// Run the feedback analysis demo with CLI-style arguments (program name excluded).
pub fn run_feedback_demo<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) =
        parse_cli::<FeedbackDemoCli, _>(std::iter::once("feedback_demo".to_string()).chain(args_iter))?
    else {
        return Ok(());
    };

    let mut config = match &cli.config {
        Some(path) => serde_json::from_str::<AnalysisConfig>(&fs::read_to_string(path)?)?,
        None => AnalysisConfig::default(),
    };
    if let Some(window) = cli.negation_window {
        config.sentiment.negation_window = window;
    }
    if let Some(min_similarity) = cli.min_similarity {
        config.clustering.seeded_min_similarity = min_similarity;
    }
    if let Some(metric) = cli.metric {
        config.clustering.metric = metric.into();
    }
    if cli.dominant {
        config.clustering.membership = Membership::Dominant;
    }
    if cli.no_emergent {
        config.clustering.allow_emergent = false;
    }

    let batch = match &cli.input {
        Some(path) => serde_json::from_str::<Vec<Response>>(&fs::read_to_string(path)?)?,
        None => sample_batch(),
    };

    let pipeline = AnalysisPipeline::new(Arc::new(LexiconStore::english()), config)?;
    let run = pipeline.run(&batch)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&run)?);
    } else {
        print_summary(&run);
    }
    Ok(())
}

fn sample_batch() -> Vec<Response> {
    SAMPLE_FEEDBACK
        .iter()
        .enumerate()
        .map(|(idx, text)| {
            Response::new(format!("fb-{:02}", idx + 1), *text)
                .with_meta(
                    META_FIELD_SEGMENT.as_str(),
                    SAMPLE_SEGMENTS[idx % SAMPLE_SEGMENTS.len()],
                )
                .with_meta(
                    META_FIELD_TIMESTAMP.as_str(),
                    format!("2025-02-{:02}T10:00:00Z", 20 + idx % 3),
                )
        })
        .collect()
}

fn print_summary(run: &AnalysisRun) {
    let stats = &run.stats;
    println!("=== feedback analysis ===");
    println!("run id  : {}", run.run_id);
    println!(
        "analyzed: {} of {} responses ({} errors)",
        stats.analyzed,
        run.batch.response_count,
        run.errors.len()
    );
    println!();

    println!("[SENTIMENT]");
    let percentages = &stats.distribution.percentages;
    let counts = &stats.distribution.counts;
    println!("  positive: {:>3} ({:.1}%)", counts.positive, percentages.positive);
    println!("  neutral : {:>3} ({:.1}%)", counts.neutral, percentages.neutral);
    println!("  negative: {:>3} ({:.1}%)", counts.negative, percentages.negative);
    println!(
        "  polarity: mean {:.3}, median {:.3}, range [{:.3}, {:.3}]",
        stats.polarity.mean, stats.polarity.median, stats.polarity.min, stats.polarity.max
    );
    println!();

    println!("[THEMES]");
    for theme in &run.themes {
        println!(
            "  {:<24} {:>3} responses  score {:.2}  ({:?})",
            theme.label,
            theme.member_count(),
            theme.score,
            theme.origin
        );
        if let Some(quote) = theme.exemplars.first().and_then(|e| e.quote.as_deref()) {
            println!("    \"{quote}\"");
        }
    }
    println!();

    println!("[SENTIMENT BY THEME]");
    for row in &stats.cross_tab {
        println!(
            "  {:<24} +{:<3} ={:<3} -{:<3}",
            row.label, row.counts.positive, row.counts.neutral, row.counts.negative
        );
    }
    println!();

    for breakdown in &stats.segments {
        println!("[SEGMENT {}]", breakdown.field);
        for segment in &breakdown.segments {
            println!(
                "  {:<24} {:>3} responses  mean {:.3}",
                segment.segment, segment.distribution.total, segment.polarity.mean
            );
        }
        if breakdown.missing > 0 {
            println!("  (missing: {})", breakdown.missing);
        }
        println!();
    }

    println!("[PRIORITY ISSUES]");
    if stats.priority_issues.is_empty() {
        println!("  none");
    }
    for issue in &stats.priority_issues {
        println!(
            "  {:<16} {:>3} mentions ({:.1}% of responses)",
            issue.issue, issue.frequency, issue.percentage
        );
    }

    if !run.warnings.is_empty() {
        println!();
        println!("[WARNINGS]");
        for warning in &run.warnings {
            println!("  {warning:?}");
        }
    }
    for error in &run.errors {
        eprintln!("rejected {}: {:?} ({})", error.response_id, error.kind, error.reason);
    }
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}

fn parse_unit_f32(raw: &str) -> Result<f32, String> {
    let value = raw
        .trim()
        .parse::<f32>()
        .map_err(|_| format!("invalid similarity '{raw}': must be a float"))?;
    if !(0.0..=1.0).contains(&value) {
        return Err(format!("similarity {value} must lie within [0, 1]"));
    }
    Ok(value)
}
