//! Text helpers for displays that render snapshots.

use crate::{
    config::ScannerConfig,
    span::{Segment, SegmentKind},
};

/// Replaces tabs and line breaks with their escape sequences (`\t`, `\n`, `\r`).
///
/// Used for one-line labels such as the delimiter or the source description.
pub fn escape_special(text: &str) -> String {
    text.replace('\t', "\\t")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

/// Makes whitespace visible the way word processors do: `→` before every tab,
/// `¶` before every line feed. The original characters are kept.
pub fn visible_whitespace(text: &str) -> String {
    text.replace('\n', "¶\n").replace('\t', "→\t")
}

/// One-line summary of a scanner configuration, e.g. `delimiter: \t  radix: 10  locale: sk_SK`.
pub fn config_summary(config: &ScannerConfig) -> String {
    format!(
        "delimiter: {}  radix: {}  locale: {}",
        escape_special(&config.delimiter),
        config.radix,
        config.locale
    )
}

/// Renders segments with tokens wrapped in `open`/`close` markers.
pub fn mark_tokens(segments: &[Segment], open: &str, close: &str, visible: bool) -> String {
    segments
        .iter()
        .map(|segment| {
            let text = if visible {
                visible_whitespace(&segment.text)
            } else {
                segment.text.clone()
            };
            match segment.kind {
                SegmentKind::Token => format!("{open}{text}{close}"),
                SegmentKind::Gap | SegmentKind::Trail => text,
            }
        })
        .collect()
}
