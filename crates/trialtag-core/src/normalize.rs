//! Text normalisation for clinical-trial descriptions and label cells.
//!
//! Two strengths of normalisation are used and must not be mixed:
//!
//! - [`clean`] is heavy: it strips symbols and expands clinical abbreviations.
//!   It feeds the statistical labelers and their training corpus.
//! - [`canonical_text`] is light: case and whitespace only. It decides whether
//!   two feedback submissions are about the same text.
//!
//! Label cells hold zero or more values joined by `;`. [`split_multilabel`]
//! and [`join_multilabel`] convert between cells and value lists;
//! [`canonical_labels`] produces the order-insensitive comparison key used by
//! the duplicate-feedback check.

use std::sync::LazyLock;

use regex::Regex;

/// Clinical abbreviations, applied in this order. Later patterns see the
/// output of earlier ones.
const ABBREVIATIONS: &[(&str, &str)] = &[
    (r"\bnsclc\b", "non small cell lung cancer"),
    (r"\bcrc\b", "colorectal cancer"),
    (r"\ber\+\b", "er positive"),
    (r"\bpr\+\b", "pr positive"),
    (r"\bmsi-h\b", "msi high"),
];

static ABBREVIATION_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    ABBREVIATIONS
        .iter()
        .map(|&(pattern, replacement)| {
            let re = Regex::new(pattern).expect("abbreviation pattern is valid");
            (re, replacement)
        })
        .collect()
});

/// Delimiters recognised inside a label cell when comparing feedback.
const LABEL_DELIMITERS: &[char] = &[';', ','];

/// Normalise text for keyword recall and model input.
///
/// # Algorithm
///
/// 1. Lower-case
/// 2. Replace every character outside `a-z`, `0-9`, whitespace, `-` and `+`
///    with a space
/// 3. Expand [`ABBREVIATIONS`] in order
/// 4. Collapse whitespace runs to one space and trim
///
/// `clean(clean(t)) == clean(t)` for every input.
pub fn clean(text: &str) -> String {
    let stripped: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || c == '-' || c == '+'
            {
                c
            } else {
                ' '
            }
        })
        .collect();

    let mut expanded = stripped;
    for (re, replacement) in ABBREVIATION_PATTERNS.iter() {
        expanded = re.replace_all(&expanded, *replacement).into_owned();
    }

    collapse_whitespace(&expanded)
}

/// Normalise text for equality checks: lower-case, collapse whitespace, trim.
pub fn canonical_text(text: &str) -> String {
    collapse_whitespace(&text.to_lowercase())
}

/// Split a `;`-joined label cell into trimmed, non-empty values.
///
/// "A;B; C" → ["A", "B", "C"]
pub fn split_multilabel(cell: &str) -> Vec<String> {
    cell.split(';')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join label values into a cell: trimmed, empties dropped, sorted, `"; "`.
pub fn join_multilabel<S: AsRef<str>>(values: &[S]) -> String {
    let mut items: Vec<&str> = values
        .iter()
        .map(|v| v.as_ref().trim())
        .filter(|v| !v.is_empty())
        .collect();
    items.sort_unstable();
    items.join("; ")
}

/// Comparison key for a label cell in the duplicate-feedback check.
///
/// A cell containing `;` or `,` is split on both, each item passed through
/// [`canonical_text`], empties dropped, the items sorted and rejoined with
/// `", "`. Any other cell is just [`canonical_text`].
///
/// "X; Y" and "y, x" both become "x, y".
pub fn canonical_labels(cell: &str) -> String {
    if !cell.contains(LABEL_DELIMITERS) {
        return canonical_text(cell);
    }
    let mut items: Vec<String> = cell
        .split(LABEL_DELIMITERS)
        .map(canonical_text)
        .filter(|v| !v.is_empty())
        .collect();
    items.sort_unstable();
    items.join(", ")
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
