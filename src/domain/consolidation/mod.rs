// ============================================================
// CONSOLIDATION DOMAIN LAYER
// ============================================================
// Group records, header roles and output policies for contact consolidation

mod group;
mod header_kind;
mod modes;
mod options;

pub use group::{ConsolidatedGroups, GroupKey, GroupRecord};
pub use header_kind::{classify_header, HeaderClassification, HeaderKind};
pub use modes::{ContentMode, LayoutMode};
pub use options::ConsolidationOptions;

/// Output column carrying merged email values
pub const EMAIL_COLUMN: &str = "Email";

/// Output column carrying merged phone values
pub const PHONE_COLUMN: &str = "Phone";

/// Preferred grouping columns when present in the header list
pub const PREFERRED_KEY_FIELDS: [&str; 4] = ["ACTIVATION", "Phone1", "Phone2", "Email1"];

/// Number of leading headers used as key when no preferred column exists
pub const FALLBACK_KEY_COUNT: usize = 4;
