use crate::metadata::MetadataKey;

/// Constants used by the text normalizer.
pub mod normalizer {
    /// Token substituted for any word containing malformed-encoding replacement characters.
    pub const PLACEHOLDER_TOKEN: &str = "<?>";
    /// Character emitted by lossy UTF-8 decoding for malformed byte sequences.
    pub const REPLACEMENT_CHAR: char = '\u{FFFD}';
    /// Default minimum token length (in chars) kept after normalization.
    pub const DEFAULT_MIN_TOKEN_LENGTH: usize = 2;
    /// Default English stop words.
    ///
    /// Negation markers (`not`, `no`, `never`, ...) and intensifiers (`very`,
    /// `too`, ...) are deliberately absent so the scorer can see them.
    pub const DEFAULT_STOP_WORDS: &[&str] = &[
        "a", "about", "after", "all", "also", "am", "an", "and", "any", "are", "as", "at", "be",
        "been", "being", "but", "by", "can", "could", "did", "do", "does", "doing", "for", "from",
        "had", "has", "have", "having", "he", "her", "here", "him", "his", "how", "i", "if", "im",
        "in", "into", "is", "it", "its", "ive", "just", "me", "my", "of", "on", "or", "our",
        "ours", "she", "so", "some", "than", "that", "the", "their", "them", "then", "there",
        "these", "they", "this", "those", "to", "up", "us", "was", "we", "were", "what", "when",
        "where", "which", "while", "who", "will", "with", "would", "you", "your",
    ];
}

/// Constants used by sentiment scoring and labeling.
pub mod sentiment {
    /// Default polarity below which a response is labeled negative.
    pub const DEFAULT_NEGATIVE_BELOW: f32 = -0.1;
    /// Default polarity above which a response is labeled positive.
    pub const DEFAULT_POSITIVE_ABOVE: f32 = 0.1;
    /// Default number of tokens after a negation marker whose polarity is flipped.
    pub const DEFAULT_NEGATION_WINDOW: usize = 3;
}

/// Constants used by theme clustering.
pub mod clustering {
    /// Default minimum similarity for joining a seeded theme.
    pub const DEFAULT_SEEDED_MIN_SIMILARITY: f32 = 0.1;
    /// Default minimum similarity for joining an existing emergent theme.
    pub const DEFAULT_EMERGENT_MIN_SIMILARITY: f32 = 0.25;
    /// Default number of tokens used to label an emergent theme.
    pub const DEFAULT_EMERGENT_LABEL_TERMS: usize = 2;
    /// Default number of exemplars attached to every theme.
    pub const DEFAULT_EXEMPLARS_PER_THEME: usize = 3;
    /// Default maximum characters in an exemplar quote.
    pub const DEFAULT_QUOTE_MAX_CHARS: usize = 240;
    /// Suffix marking a truncated exemplar quote.
    pub const QUOTE_ELLIPSIS: char = '…';
    /// Separator between terms in an emergent theme label.
    pub const EMERGENT_LABEL_SEPARATOR: &str = " / ";
    /// Label used in cross-tabulations for responses without a dominant theme.
    pub const UNTHEMED_LABEL: &str = "unthemed";
}

/// Constants used by aggregation.
pub mod aggregation {
    /// Default number of priority issues reported.
    pub const DEFAULT_MAX_ISSUES: usize = 5;
    /// Default minimum occurrences for a keyword to appear in the keyword table.
    pub const DEFAULT_MIN_KEYWORD_FREQUENCY: usize = 2;
    /// Default problem keywords scanned in negative responses.
    pub const DEFAULT_PROBLEM_KEYWORDS: &[&str] = &[
        "slow",
        "confusing",
        "difficult",
        "complicated",
        "broken",
        "error",
        "errors",
        "bug",
        "bugs",
        "crash",
        "crashes",
        "crashing",
        "loading",
        "laggy",
        "terrible",
        "awful",
        "hate",
        "problem",
        "issue",
        "issues",
        "frustrating",
        "annoying",
        "expensive",
    ];
}

/// Constants used by per-record validation inside the pipeline.
pub mod limits {
    /// Default maximum share of placeholder tokens before a record is rejected.
    pub const DEFAULT_MAX_PLACEHOLDER_RATIO: f32 = 0.5;
    /// Default maximum raw text length (chars) accepted per response.
    pub const DEFAULT_MAX_RESPONSE_CHARS: usize = 20_000;
}

/// Constants used by metadata keys and segment breakdowns.
pub mod metadata {
    use super::MetadataKey;

    /// Canonical metadata field naming the respondent segment.
    pub const META_FIELD_SEGMENT: MetadataKey = MetadataKey::new("segment");
    /// Canonical metadata field naming the originating survey question.
    pub const META_FIELD_QUESTION: MetadataKey = MetadataKey::new("question_id");
    /// Canonical metadata field holding the response timestamp.
    pub const META_FIELD_TIMESTAMP: MetadataKey = MetadataKey::new("timestamp");
}

/// Constants used by the pipeline run fingerprint.
pub mod pipeline {
    /// Prefix of every generated run id.
    pub const RUN_ID_PREFIX: &str = "run-";
    /// Offset mixed into run fingerprints so they never equal a bare content hash.
    pub const RUN_SEED_OFFSET: u64 = 0xFEED_BAC4;
}
