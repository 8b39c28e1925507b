//! Schema versioning for serialized snapshot series and reports.

/// Version of the snapshot-series document and of the JSON reports.
///
/// Bumped on any incompatible change to field names or meaning.
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Returns true if a document written with `version` can be read by this build.
///
/// Only the major component has to match.
pub fn is_compatible(version: &str) -> bool {
    let major = |v: &str| v.split('.').next().map(str::to_owned);
    match (major(version), major(SCHEMA_VERSION)) {
        (Some(a), Some(b)) => !a.is_empty() && a == b,
        _ => false,
    }
}
