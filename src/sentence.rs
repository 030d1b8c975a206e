//! Japanese sentence segmentation for example lookup.
//!
//! Text is first split into lines. A line ending in the particle `の` is
//! joined with the next one, since light-novel text often breaks a noun
//! phrase across lines. Each joined line is then split after every run of
//! terminal punctuation (`。！？!?`), keeping any closing brackets that
//! immediately follow the run with the sentence they close.

const CONTINUATION: char = 'の';

fn is_terminal(c: char) -> bool {
    matches!(c, '。' | '！' | '？' | '!' | '?')
}

fn is_closing(c: char) -> bool {
    matches!(c, '」' | '』' | '）' | ')' | '】')
}

/// Splits `text` into trimmed, non-empty sentences in reading order.
///
/// # Examples
///
/// ```
/// use namebook::sentence::segment_sentences;
///
/// let sentences = segment_sentences("「行くぞ！」アツシは言った。\n森の\n奥へ向かう。");
/// assert_eq!(sentences, vec!["「行くぞ！」", "アツシは言った。", "森の奥へ向かう。"]);
/// ```
#[must_use]
pub fn segment_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    for line in join_continued_lines(text) {
        split_line(&line, &mut sentences);
    }
    sentences
}

/// Segments paragraphs as one text, each paragraph on its own line.
#[must_use]
pub fn segment_paragraphs<I, P>(paragraphs: I) -> Vec<String>
where
    I: IntoIterator<Item = P>,
    P: AsRef<str>,
{
    let text = paragraphs
        .into_iter()
        .map(|p| p.as_ref().to_string())
        .collect::<Vec<_>>()
        .join("\n");
    segment_sentences(&text)
}

fn join_continued_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut pending = String::new();
    for line in text.lines() {
        pending.push_str(line.trim_end());
        if pending.ends_with(CONTINUATION) {
            continue;
        }
        lines.push(std::mem::take(&mut pending));
    }
    if !pending.is_empty() {
        lines.push(pending);
    }
    lines
}

fn split_line(line: &str, out: &mut Vec<String>) {
    let chars: Vec<char> = line.chars().collect();
    let len = chars.len();
    let mut current = String::new();
    let mut i = 0;

    while i < len {
        current.push(chars[i]);
        if is_terminal(chars[i]) {
            // Absorb the rest of the punctuation run and trailing closers.
            while i + 1 < len && (is_terminal(chars[i + 1]) || is_closing(chars[i + 1])) {
                i += 1;
                current.push(chars[i]);
            }
            flush(&mut current, out);
        }
        i += 1;
    }
    flush(&mut current, out);
}

fn flush(current: &mut String, out: &mut Vec<String>) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
    current.clear();
}
