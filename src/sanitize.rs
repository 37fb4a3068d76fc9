//! Escaping and truncation primitives shared by every serializer.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use unicode_segmentation::UnicodeSegmentation;

/// Marker appended to truncated labels.
pub const ELLIPSIS: &str = "...";

static LINE_BREAK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r\n|[\r\n]").unwrap());
static ID_STRIP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\p{L}\p{Nd}_-]+").unwrap());

/// Output grammar a label is being prepared for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelTarget {
    /// Graphviz double-quoted string.
    Dot,
    /// Mermaid quoted node label.
    Mermaid,
    /// XML text or attribute content.
    Svg,
    /// Normalization only; used for raster text.
    Plain,
}

/// Reduce an id to letters, digits, `-` and `_`. Empty results become `"node"`.
pub fn sanitize_id(raw: &str) -> String {
    let stripped = ID_STRIP_RE.replace_all(raw, "");
    if stripped.is_empty() {
        "node".to_string()
    } else {
        stripped.into_owned()
    }
}

/// 32-bit FNV-1a.
pub fn fnv1a_32(bytes: &[u8]) -> u32 {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in bytes {
        hash ^= u32::from(*byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}

/// Per-render memo of raw id -> collision-free sanitized id.
///
/// The first raw id to claim a sanitized base keeps it. Later ids that
/// reduce to the same base get an `_xxxxxxxx` suffix from the FNV-1a hash
/// of the raw id. Register ids in a stable order (sorted) so the winner of
/// a collision does not depend on input order.
#[derive(Debug, Default)]
pub struct SafeIdRegistry {
    assigned: HashMap<String, String>,
    used: HashSet<String>,
}

impl SafeIdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, raw: &str) -> String {
        if let Some(safe) = self.assigned.get(raw) {
            return safe.clone();
        }
        let safe = self.claim(raw);
        self.assigned.insert(raw.to_string(), safe.clone());
        safe
    }

    /// Claim an id for a synthetic node that has no raw issue id.
    ///
    /// Never memoized, so an issue whose raw id equals `name` keeps its
    /// own safe id and the synthetic node gets a distinct one.
    pub fn reserve(&mut self, name: &str) -> String {
        self.claim(name)
    }

    fn claim(&mut self, raw: &str) -> String {
        let base = sanitize_id(raw);
        let mut safe = base.clone();
        if self.used.contains(&safe) {
            safe = format!("{base}_{:08x}", fnv1a_32(raw.as_bytes()));
            let hashed = safe.clone();
            let mut counter = 2;
            while self.used.contains(&safe) {
                safe = format!("{hashed}_{counter}");
                counter += 1;
            }
        }
        self.used.insert(safe.clone());
        safe
    }
}

/// Normalize, escape for `target`, and truncate to at most `max_runes` chars.
///
/// Truncation cuts only between extended grapheme clusters. Escape
/// sequences live inside their cluster, so `&lt;` is either kept whole or
/// dropped, and counts as four runes.
pub fn sanitize_label(raw: &str, max_runes: usize, target: LabelTarget) -> String {
    let normalized = normalize_text(raw, target);
    let clusters: Vec<Cluster> = normalized
        .graphemes(true)
        .map(|g| Cluster::escaped(g, target))
        .collect();
    truncate_clusters(&clusters, max_runes)
}

/// Truncate to `max_runes` chars without splitting grapheme clusters.
pub fn truncate_runes(text: &str, max_runes: usize) -> String {
    let clusters: Vec<Cluster> = text
        .graphemes(true)
        .map(|g| Cluster {
            text: g.to_string(),
            runes: g.chars().count(),
        })
        .collect();
    truncate_clusters(&clusters, max_runes)
}

/// Entity-escape the five XML special characters.
pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Escape a value for a DOT double-quoted string. Newlines become spaces.
pub fn escape_dot(input: &str) -> String {
    LINE_BREAK_RE
        .replace_all(input, " ")
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
}

fn normalize_text(raw: &str, target: LabelTarget) -> String {
    let spaced = LINE_BREAK_RE.replace_all(raw, " ");
    let visible: String = spaced
        .chars()
        .filter(|c| !c.is_control())
        .filter(|c| target != LabelTarget::Svg || is_xml_char(*c))
        .collect();
    visible.trim().to_string()
}

/// XML 1.0 `Char` production. Surrogates cannot occur in a `char`.
fn is_xml_char(ch: char) -> bool {
    matches!(
        ch,
        '\u{9}'
            | '\u{A}'
            | '\u{D}'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}

/// One grapheme cluster after escaping, with its rune cost.
#[derive(Debug, Clone)]
struct Cluster {
    text: String,
    runes: usize,
}

impl Cluster {
    fn escaped(grapheme: &str, target: LabelTarget) -> Self {
        let mut text = String::with_capacity(grapheme.len());
        for ch in grapheme.chars() {
            match escape_char(ch, target) {
                Escaped::Char(c) => text.push(c),
                Escaped::Seq(seq) => text.push_str(seq),
            }
        }
        let runes = text.chars().count();
        Self { text, runes }
    }
}

enum Escaped {
    Char(char),
    Seq(&'static str),
}

fn escape_char(ch: char, target: LabelTarget) -> Escaped {
    match (target, ch) {
        (LabelTarget::Dot, '\\') => Escaped::Seq("\\\\"),
        (LabelTarget::Dot, '"') => Escaped::Seq("\\\""),
        (LabelTarget::Mermaid, '"' | '`') => Escaped::Char('\''),
        (LabelTarget::Mermaid, '[' | '{') => Escaped::Char('('),
        (LabelTarget::Mermaid, ']' | '}') => Escaped::Char(')'),
        (LabelTarget::Mermaid, '|') => Escaped::Char('/'),
        (LabelTarget::Mermaid | LabelTarget::Svg, '<') => Escaped::Seq("&lt;"),
        (LabelTarget::Mermaid | LabelTarget::Svg, '>') => Escaped::Seq("&gt;"),
        (LabelTarget::Svg, '&') => Escaped::Seq("&amp;"),
        (LabelTarget::Svg, '"') => Escaped::Seq("&quot;"),
        (LabelTarget::Svg, '\'') => Escaped::Seq("&apos;"),
        _ => Escaped::Char(ch),
    }
}

fn truncate_clusters(clusters: &[Cluster], max_runes: usize) -> String {
    let total: usize = clusters.iter().map(|c| c.runes).sum();
    let mut out = String::new();
    if total <= max_runes {
        clusters.iter().for_each(|c| out.push_str(&c.text));
        return out;
    }

    let ellipsis = ELLIPSIS.chars().count();
    let (budget, marker) = if max_runes > ellipsis {
        (max_runes - ellipsis, ELLIPSIS)
    } else {
        (max_runes, "")
    };

    let mut used = 0;
    for cluster in clusters {
        if used + cluster.runes > budget {
            break;
        }
        used += cluster.runes;
        out.push_str(&cluster.text);
    }
    out.push_str(marker);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("bv-123", "bv-123")]
    #[case("a.b/c", "abc")]
    #[case("über_1", "über_1")]
    #[case("!!!", "node")]
    #[case("", "node")]
    fn sanitizes_ids(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(sanitize_id(raw), expected);
    }

    #[test]
    fn fnv_matches_reference_vectors() {
        assert_eq!(fnv1a_32(b""), 0x811c9dc5);
        assert_eq!(fnv1a_32(b"a"), 0xe40c292c);
        assert_eq!(fnv1a_32(b"foobar"), 0xbf9cf968);
    }

    #[test]
    fn registry_resolves_collisions_and_memoizes() {
        let mut registry = SafeIdRegistry::new();
        let first = registry.get("a.b");
        let second = registry.get("ab");
        assert_eq!(first, "ab");
        assert_eq!(second, format!("ab_{:08x}", fnv1a_32(b"ab")));
        assert_eq!(registry.get("a.b"), first);
        assert_eq!(registry.get("ab"), second);
    }

    #[test]
    fn registry_never_returns_duplicates() {
        let mut registry = SafeIdRegistry::new();
        let hashed = format!("x_{:08x}", fnv1a_32(b"x!"));
        let raws = ["x", hashed.as_str(), "x!", "!x", "x?"];
        let safe: HashSet<String> = raws.iter().map(|r| registry.get(r)).collect();
        assert_eq!(safe.len(), raws.len());
    }

    #[test]
    fn reserved_ids_never_shadow_issue_ids() {
        let mut registry = SafeIdRegistry::new();
        assert_eq!(registry.get("NoLinks"), "NoLinks");
        let reserved = registry.reserve("NoLinks");
        assert_eq!(reserved, format!("NoLinks_{:08x}", fnv1a_32(b"NoLinks")));
        assert_eq!(registry.get("NoLinks"), "NoLinks");
    }

    #[test]
    fn mermaid_label_replaces_syntax() {
        let label = sanitize_label("say \"hi\" [x] {y} a|b `c` <d>", 100, LabelTarget::Mermaid);
        assert_eq!(label, "say 'hi' (x) (y) a/b 'c' &lt;d&gt;");
    }

    #[test]
    fn dot_label_escapes_quotes_and_backslashes() {
        let label = sanitize_label("C:\\path \"q\"\nnext", 100, LabelTarget::Dot);
        assert_eq!(label, "C:\\\\path \\\"q\\\" next");
    }

    #[test]
    fn svg_label_escapes_entities() {
        let label = sanitize_label("Dangerous <script> & 'x'", 100, LabelTarget::Svg);
        assert_eq!(label, "Dangerous &lt;script&gt; &amp; &apos;x&apos;");
    }

    #[test]
    fn strips_controls_and_trims() {
        let label = sanitize_label("  a\tb\u{7}\r\nc  ", 100, LabelTarget::Plain);
        assert_eq!(label, "ab c");
    }

    #[test]
    fn truncation_appends_ellipsis() {
        assert_eq!(truncate_runes("abcdefghij", 6), "abc...");
        assert_eq!(truncate_runes("abcdefghij", 3), "abc");
        assert_eq!(truncate_runes("abc", 3), "abc");
        assert_eq!(truncate_runes("abc", 0), "");
    }

    #[test]
    fn truncation_counts_runes_not_bytes() {
        let out = truncate_runes("日本語のテキストです", 7);
        assert_eq!(out, "日本語の...");
        assert_eq!(out.chars().count(), 7);
    }

    #[rstest]
    // "e" + combining acute accent straddles the cut point.
    #[case("abe\u{301}fghij", 6, "ab...")]
    // woman + ZWJ + laptop is one cluster of three runes.
    #[case("ab\u{1F469}\u{200D}\u{1F4BB}cdefgh", 7, "ab...")]
    #[case("ab\u{1F469}\u{200D}\u{1F4BB}cdefgh", 8, "ab\u{1F469}\u{200D}\u{1F4BB}...")]
    // Regional indicator pair for the German flag.
    #[case("abc\u{1F1E9}\u{1F1EA}defgh", 7, "abc...")]
    #[case("abc\u{1F1E9}\u{1F1EA}defgh", 8, "abc\u{1F1E9}\u{1F1EA}...")]
    fn truncation_keeps_combining_sequences_whole(
        #[case] text: &str,
        #[case] max: usize,
        #[case] expected: &str,
    ) {
        let out = truncate_runes(text, max);
        assert_eq!(out, expected);
        assert!(!out.contains("\u{200D}..."));
    }

    #[test]
    fn svg_label_drops_non_xml_chars() {
        let label = sanitize_label("bad \u{FFFE} title\u{FFFF}", 100, LabelTarget::Svg);
        assert_eq!(label, "bad  title");
        let dot = sanitize_label("keep \u{FFFE}", 100, LabelTarget::Dot);
        assert_eq!(dot, "keep \u{FFFE}");
    }

    #[test]
    fn truncation_never_splits_entities() {
        let out = sanitize_label("ab<cdefgh", 8, LabelTarget::Svg);
        assert_eq!(out, "ab...");
        assert!(out.chars().count() <= 8);
    }

    #[test]
    fn output_never_exceeds_budget() {
        let samples = [
            "",
            "short",
            "Dangerous <script>alert('x')</script>",
            "emoji 👩\u{200D}💻 sequences and accents é\u{301}\u{302}",
            "\"quoted\" \\ back\\slashes [brackets] {braces}",
        ];
        for sample in samples {
            for max in 0..48 {
                for target in [
                    LabelTarget::Dot,
                    LabelTarget::Mermaid,
                    LabelTarget::Svg,
                    LabelTarget::Plain,
                ] {
                    let out = sanitize_label(sample, max, target);
                    assert!(out.chars().count() <= max, "{sample:?} {max} {target:?} -> {out:?}");
                }
            }
        }
    }
}
