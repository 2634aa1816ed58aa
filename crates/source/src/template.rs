//! Version placeholder substitution
//!
//! Urls and tags may carry `{v}` (full version), `{M}` (major), `{m}`
//! (minor) and `{p}` (patch) placeholders filled in at resolution time.

use semver::Version;

/// Substitute version placeholders in `input`, returning the result.
///
/// A string without placeholders is returned unchanged.
#[must_use]
pub fn apply_version_to_url(input: &str, v: &Version) -> String {
    input
        .replace("{v}", &v.to_string())
        .replace("{M}", &v.major.to_string())
        .replace("{m}", &v.minor.to_string())
        .replace("{p}", &v.patch.to_string())
}
