use crate::error::ChapterizeError;
use crate::models::{Language, RequestConfig, SplitMethod};
use regex::Regex;
use std::sync::LazyLock;

static CHAPTER_MARKERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    let patterns = [
        r"第\w+章",        // 第1章, 第一章, 第十二章
        r"Chương\s*\d+", // Chương 1, Chương12
    ];

    patterns
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect()
});

static SENTENCE_BREAK: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"[.!?]( +)").ok());

/// Splits `config.additional_text` the way the configuration asks for.
pub fn split_text(config: &RequestConfig) -> Result<Vec<String>, ChapterizeError> {
    let text = &config.additional_text;

    match config.split_method {
        SplitMethod::ByChapterMarker => split_by_chapter_markers(text),
        SplitMethod::ByCount => {
            let split_length = config.effective_split_length();
            if split_length == 0 {
                return Err(ChapterizeError::InvalidSplitLength);
            }

            Ok(match config.language {
                Language::English => split_by_words(text, split_length),
                Language::Chinese | Language::Vietnamese => split_by_chars(text, split_length),
            })
        }
    }
}

/// Each chunk runs from one chapter marker to the next. Text before the first
/// marker is not part of any chunk.
pub fn split_by_chapter_markers(text: &str) -> Result<Vec<String>, ChapterizeError> {
    let mut starts: Vec<usize> = CHAPTER_MARKERS
        .iter()
        .flat_map(|regex| regex.find_iter(text).map(|m| m.start()))
        .collect();

    starts.sort_unstable();
    starts.dedup();

    if starts.is_empty() {
        return Err(ChapterizeError::NoChapterMarkers);
    }

    let chapters = starts
        .iter()
        .enumerate()
        .map(|(idx, &start)| {
            let end = starts.get(idx + 1).copied().unwrap_or(text.len());
            text[start..end].trim().to_string()
        })
        .collect();

    Ok(chapters)
}

/// Packs whole lines into chunks of at most `max_chars` characters. Lines are
/// never broken, so a single long line becomes its own chunk.
pub fn split_by_chars(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_length = 0;

    for line in text.split('\n') {
        let line_length = line.chars().count();

        if current_length + line_length > max_chars && !current.is_empty() {
            chunks.push(current.join("\n"));
            current.clear();
            current_length = 0;
        }

        current.push(line);
        // +1 for the newline
        current_length += line_length + 1;
    }

    if !current.is_empty() {
        chunks.push(current.join("\n"));
    }

    chunks
}

/// Packs whole sentences into chunks of at most `max_words` words. Sentences
/// longer than the limit are cut into `max_words`-sized pieces.
pub fn split_by_words(text: &str, max_words: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_words = 0;

    let mut flush = |current: &mut String| {
        let trimmed = current.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }
        current.clear();
    };

    for sentence in split_sentences(text) {
        let words: Vec<&str> = sentence.split_whitespace().collect();

        if words.len() > max_words {
            for piece in words.chunks(max_words) {
                let piece_text = piece.join(" ");
                if current_words + piece.len() > max_words {
                    flush(&mut current);
                    current = piece_text;
                    current_words = piece.len();
                } else {
                    append_sentence(&mut current, &piece_text);
                    current_words += piece.len();
                }
            }
        } else if current_words + words.len() <= max_words {
            append_sentence(&mut current, sentence);
            current_words += words.len();
        } else {
            flush(&mut current);
            current = sentence.to_string();
            current_words = words.len();
        }
    }

    flush(&mut current);
    chunks
}

fn append_sentence(current: &mut String, sentence: &str) {
    if !current.is_empty() {
        current.push(' ');
    }
    current.push_str(sentence);
}

/// Breaks text at runs of spaces that follow `.`, `!` or `?`.
fn split_sentences(text: &str) -> Vec<&str> {
    let Some(breaks) = SENTENCE_BREAK.as_ref() else {
        return vec![text];
    };

    let mut sentences = Vec::new();
    let mut start = 0;

    for caps in breaks.captures_iter(text) {
        if let Some(gap) = caps.get(1) {
            sentences.push(&text[start..gap.start()]);
            start = gap.end();
        }
    }

    sentences.push(&text[start..]);
    sentences
}
