//! Text preparation for synthesis: assembling a post's spoken text,
//! splitting it into sentences and grouping sentences into batches.

/// Join a post's brief and detail descriptions into the text to be spoken.
///
/// Returns `None` when both parts are blank.
pub fn post_speech_text(brief: &str, detail: &str) -> Option<String> {
    let brief = brief.trim();
    let detail = detail.trim();

    match (brief.is_empty(), detail.is_empty()) {
        (true, true) => None,
        (false, true) => Some(brief.to_string()),
        (true, false) => Some(detail.to_string()),
        (false, false) => {
            let separator = if ends_sentence(brief) { " " } else { ". " };
            Some(format!("{brief}{separator}{detail}"))
        }
    }
}

fn ends_sentence(text: &str) -> bool {
    text.ends_with(['.', '!', '?'])
}

/// Split text into sentences at `.`, `!` or `?` followed by whitespace.
///
/// Terminal punctuation stays with its sentence; blank fragments are dropped.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let Some(&(_, next)) = chars.peek() else {
            break;
        };
        if next.is_whitespace() {
            let end = i + c.len_utf8();
            let sentence = text[start..end].trim();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            start = end;
        }
    }

    let rest = text[start..].trim();
    if !rest.is_empty() {
        sentences.push(rest);
    }

    sentences
}

/// Group consecutive sentences into batches of `batch_size`, each joined by a space.
///
/// A `batch_size` of zero is treated as one.
pub fn batch_sentences(sentences: &[&str], batch_size: usize) -> Vec<String> {
    sentences
        .chunks(batch_size.max(1))
        .map(|batch| batch.join(" "))
        .collect()
}
