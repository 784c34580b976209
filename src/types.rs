/// Opaque response identifier supplied upstream (unique within a batch).
/// Examples: `resp-0001`, `survey_q7::842`
pub type ResponseId = String;
/// Deterministic identifier of one analysis run.
/// Example: `run-5f1c9a27d3e0b884`
pub type RunId = String;
/// Numeric theme identifier; seeded themes come first in configuration order.
/// Examples: `0` (first seeded theme), `7` (an emergent theme)
pub type ThemeId = usize;
/// Canonical token produced by the normalizer.
/// Examples: `price`, `dont`, `<?>`
pub type Token = String;
/// Metadata attribute name on a response.
/// Examples: `segment`, `question_id`, `timestamp`
pub type MetaKey = String;
/// Metadata attribute value on a response.
/// Examples: `enterprise`, `q7`, `2025-02-25T09:30:00Z`
pub type MetaValue = String;
/// Normalized segment value used in breakdown tables.
/// Examples: `enterprise`, `2025-02-25`
pub type SegmentValue = String;
/// Human-readable theme label.
/// Examples: `pricing`, `packaging / box`
pub type ThemeLabel = String;
