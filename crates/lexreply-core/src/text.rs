//! Whitespace and line-ending normalisation for email text.
//!
//! Everything that goes into a prompt, and every reply that comes back from
//! a model, passes through [`normalize`] so prompts are stable across
//! platforms and drafts carry no stray whitespace.

/// Normalise email text.
///
/// Accepts `&str` or `Option<&str>`; absent or empty input yields `""`.
///
/// 1. Non-breaking spaces become ordinary spaces
/// 2. `\r\n` and bare `\r` become `\n`
/// 3. Trailing whitespace is stripped from every line
/// 4. Two or more consecutive blank lines collapse to one blank line
/// 5. The whole result is trimmed
///
/// The output is a fixed point: `normalize(normalize(s)) == normalize(s)`.
pub fn normalize<'a>(text: impl Into<Option<&'a str>>) -> String {
    let text = match text.into() {
        Some(t) if !t.is_empty() => t,
        _ => return String::new(),
    };

    let unified = text
        .replace('\u{a0}', " ")
        .replace("\r\n", "\n")
        .replace('\r', "\n");

    let mut out = String::with_capacity(unified.len());
    let mut blank_run = 0usize;

    for line in unified.split('\n') {
        let line = line.trim_end();
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }

    out.trim().to_string()
}
