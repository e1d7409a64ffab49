use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

pub const STOP_WORDS: &[&str] = &[
    "the", "and", "to", "of", "a", "in", "is", "that", "it", "on", "you", "for", "i", "with", "as",
    "at", "this", "but", "be", "are",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

/// Frequency table that remembers the order in which words were first seen.
///
/// Ranking sorts by count and falls back to first occurrence, so equal counts
/// always come out in the same order for the same input.
#[derive(Debug, Default, Clone)]
pub struct WordCounter {
    index: HashMap<String, usize>,
    entries: Vec<WordCount>,
}

impl WordCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, word: &str) {
        if let Some(&position) = self.index.get(word) {
            self.entries[position].count += 1;
            return;
        }
        self.index.insert(word.to_string(), self.entries.len());
        self.entries.push(WordCount {
            word: word.to_string(),
            count: 1,
        });
    }

    #[must_use]
    pub fn count(&self, word: &str) -> usize {
        self.index
            .get(word)
            .map_or(0, |&position| self.entries[position].count)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn most_common(&self, limit: usize) -> Vec<WordCount> {
        let mut ranked = self.entries.clone();
        // stable: ties keep first-seen order
        ranked.sort_by(|left, right| right.count.cmp(&left.count));
        ranked.truncate(limit);
        ranked
    }
}

#[must_use]
pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

/// Lowercases `text` and splits it into word-character runs.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    word_regex()
        .find_iter(text)
        .map(|found| found.as_str().to_lowercase())
}

/// Counts words across `texts`, skipping stop words.
pub fn count_words<'a, I>(texts: I) -> WordCounter
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counter = WordCounter::new();
    for text in texts {
        for word in tokenize(text) {
            if !is_stop_word(&word) {
                counter.add(&word);
            }
        }
    }
    counter
}

/// Top `limit` non-stop words across `texts`.
pub fn top_words<'a, I>(texts: I, limit: usize) -> Vec<WordCount>
where
    I: IntoIterator<Item = &'a str>,
{
    count_words(texts).most_common(limit)
}

fn word_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"\b\w+\b").expect("word regex should compile"))
}
