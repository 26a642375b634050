//! Cell text sanitization
//!
//! OCR services emit cell text with LaTeX math fragments, footnote markers,
//! HTML line breaks and digits spaced out character by character. [`clean`]
//! strips those artifacts in a fixed order; each pass assumes the artifacts
//! removed by the earlier passes are gone.
//!
//! ```rust
//! use tablift::sanitize::clean;
//!
//! assert_eq!(clean("${ }^{1}$ Padi<br>2 0 2 0"), "Padi 2020");
//! ```

use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    // Empty math blocks carrying only a footnote exponent: ${ }^{1}$, ${ }$
    static ref EMPTY_EXPONENT_MATH: Regex = Regex::new(r"\$\s*\{\s*\}\s*\^\{\d+\}\s*\$").unwrap();
    static ref EMPTY_MATH: Regex = Regex::new(r"\$\s*\{\s*\}\s*\$").unwrap();

    static ref MATH_DELIMITERS: Regex = Regex::new(r"\$([^$]*)\$").unwrap();

    static ref COMMAND_WITH_ARG: Regex = Regex::new(r"\\[a-zA-Z]+\{([^}]*)\}").unwrap();
    static ref BARE_COMMAND: Regex = Regex::new(r"\\[a-zA-Z]+").unwrap();

    static ref EMPTY_GROUP_EXPONENT: Regex = Regex::new(r"\{\s*\}\s*\^\{\d+\}").unwrap();
    static ref BARE_EXPONENT: Regex = Regex::new(r"\^\{\d+\}").unwrap();
    static ref EMPTY_GROUP: Regex = Regex::new(r"\{\s*\}").unwrap();

    static ref HTML_TAG: Regex = Regex::new(r"<[^>]+>").unwrap();

    static ref SPACED_DIGITS: Regex = Regex::new(r"\d(?:\s+\d)+").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Clean a single cell or title string.
///
/// Total, and idempotent on most input. Tags are replaced after empty groups
/// are removed, so a tag inside braces leaves a group behind for the next
/// pass: `clean("{<b>}")` is `"{ }"`, which cleans to `""`.
pub fn clean(text: &str) -> String {
    let text = EMPTY_EXPONENT_MATH.replace_all(text, "");
    let text = EMPTY_MATH.replace_all(&text, "");

    let text = MATH_DELIMITERS.replace_all(&text, "${1}");

    let text = COMMAND_WITH_ARG.replace_all(&text, "${1}");
    let text = BARE_COMMAND.replace_all(&text, "");

    let text = EMPTY_GROUP_EXPONENT.replace_all(&text, "");
    let text = BARE_EXPONENT.replace_all(&text, "");
    let text = EMPTY_GROUP.replace_all(&text, "");

    let text = HTML_TAG.replace_all(&text, " ");

    let text = SPACED_DIGITS.replace_all(&text, |caps: &Captures| {
        WHITESPACE.replace_all(&caps[0], "").into_owned()
    });

    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// Clean every cell of a row
pub fn clean_row<S: AsRef<str>>(row: &[S]) -> Vec<String> {
    row.iter().map(|cell| clean(cell.as_ref())).collect()
}
