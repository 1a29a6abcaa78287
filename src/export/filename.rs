//! Short deterministic filenames for export files.

use url::Url;

use super::ExportFormat;

/// Upper bound on generated filename length, extension included.
pub const MAX_FILENAME_CHARS: usize = 15;

const FALLBACK_STEM: &str = "export";

/// Derives an export filename from a source URL or search id.
///
/// URLs use their last non-empty path segment (decoded, extension dropped),
/// falling back to the host. Anything else is used as-is. The result is
/// sanitized and truncated so the whole name fits in [`MAX_FILENAME_CHARS`].
///
/// ```
/// use scrapehub_core::export::{export_filename, ExportFormat};
///
/// assert_eq!(export_filename("https://en.wikipedia.org/wiki/Cat", ExportFormat::Csv), "Cat.csv");
/// ```
#[must_use]
pub fn export_filename(source: &str, format: ExportFormat) -> String {
    let stem = stem_from_source(source);
    fit_to_budget(&stem, "", format.extension())
}

/// Variant of `filename` with a `-n` counter, still within the budget.
///
/// Used when two sources in one batch produce the same name.
#[must_use]
pub fn numbered_filename(filename: &str, counter: usize) -> String {
    let (stem, extension) = filename
        .rfind('.')
        .map_or((filename, ""), |dot| (&filename[..dot], &filename[dot..]));
    fit_to_budget(stem, &format!("-{counter}"), extension)
}

fn fit_to_budget(stem: &str, suffix: &str, extension: &str) -> String {
    let budget = MAX_FILENAME_CHARS
        .saturating_sub(extension.chars().count())
        .saturating_sub(suffix.chars().count());
    let truncated: String = stem.chars().take(budget).collect();
    let truncated = truncated.trim_end_matches(['_', '.', '-']);
    let stem = if truncated.is_empty() {
        FALLBACK_STEM.chars().take(budget).collect()
    } else {
        truncated.to_string()
    };
    format!("{stem}{suffix}{extension}")
}

fn stem_from_source(source: &str) -> String {
    let Ok(url) = Url::parse(source.trim()) else {
        return sanitize_filename_component(source);
    };

    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
        .map(|s| urlencoding::decode(s).map_or_else(|_| s.to_string(), |d| d.into_owned()));

    if let Some(segment) = segment {
        let without_ext = match segment.rfind('.') {
            Some(dot) if dot > 0 => &segment[..dot],
            _ => segment.as_str(),
        };
        let cleaned = sanitize_filename_component(without_ext);
        if !cleaned.is_empty() {
            return cleaned;
        }
    }

    url.host_str()
        .map(|host| sanitize_filename_component(&host.replace('.', "-")))
        .unwrap_or_default()
}

/// Replaces characters that are unsafe in filenames with `_`, collapsing
/// runs and trimming separators from both ends.
pub(crate) fn sanitize_filename_component(value: &str) -> String {
    let mut out = String::new();
    let mut prev_sep = false;
    for ch in value.chars() {
        let mapped = match ch {
            c if c.is_alphanumeric() || matches!(c, '-' | '.') => c,
            _ => '_',
        };
        if mapped == '_' {
            if !prev_sep {
                out.push('_');
                prev_sep = true;
            }
        } else {
            out.push(mapped);
            prev_sep = false;
        }
    }
    out.trim_matches(['_', '.']).to_string()
}
