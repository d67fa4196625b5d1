use std::sync::OnceLock;

use regex::Regex;

static WORD_RE: OnceLock<Regex> = OnceLock::new();

const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "st", "jr", "sr", "vs", "etc", "inc", "corp", "co", "ltd", "gen",
    "sen", "rep", "gov", "prof", "lt", "col", "sgt", "u.s", "u.k", "u.n", "e.g", "i.e", "a.m",
    "p.m", "jan", "feb", "aug", "sept", "oct", "nov", "dec",
];

const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few", "for",
    "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself",
    "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just",
    "me", "more", "most", "my", "myself", "nor", "of", "off", "on", "once", "only", "or", "other",
    "our", "ours", "ourselves", "out", "over", "own", "same", "she", "should", "so", "some",
    "such", "than", "that", "the", "their", "theirs", "them", "themselves", "then", "there",
    "these", "they", "this", "those", "through", "to", "too", "under", "until", "up", "very",
    "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom", "why", "will",
    "with", "would", "you", "your", "yours", "yourself", "yourselves", "said", "says",
];

fn word_re() -> &'static Regex {
    WORD_RE.get_or_init(|| {
        Regex::new(r"[\p{L}\p{N}]+(?:['’][\p{L}]+)*").expect("word pattern is valid")
    })
}

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

fn is_closer(c: char) -> bool {
    matches!(c, '"' | '\'' | ')' | ']' | '”' | '’')
}

fn starts_sentence(c: char) -> bool {
    c.is_uppercase() || c.is_numeric() || matches!(c, '"' | '\'' | '“' | '‘' | '(')
}

fn ends_with_abbreviation(fragment: &str) -> bool {
    let last = fragment
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or("")
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();
    // Initials such as "J. Smith".
    if last.chars().count() == 1 && last.chars().all(char::is_alphabetic) {
        return true;
    }
    ABBREVIATIONS.contains(&last.as_str())
}

/// Splits prose into sentences on `.`, `!` and `?` followed by whitespace and
/// a capital, digit or opening quote. Known abbreviations do not end a sentence.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < chars.len() {
        let (pos, c) = chars[i];
        if !is_terminator(c) {
            i += 1;
            continue;
        }

        let mut j = i + 1;
        while j < chars.len() && (is_terminator(chars[j].1) || is_closer(chars[j].1)) {
            j += 1;
        }
        let end = chars.get(j).map(|&(p, _)| p).unwrap_or(text.len());

        let boundary = match chars.get(j) {
            None => true,
            Some(&(_, next)) if next.is_whitespace() => chars[j..]
                .iter()
                .find(|(_, ch)| !ch.is_whitespace())
                .map(|&(_, ch)| starts_sentence(ch))
                .unwrap_or(true),
            Some(_) => false,
        };

        if boundary && !(c == '.' && ends_with_abbreviation(&text[start..pos])) {
            let sentence = text[start..end].trim();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            start = end;
        }
        i = j;
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

/// Word tokens in their original casing.
pub fn words(text: &str) -> impl Iterator<Item = &str> {
    word_re().find_iter(text).map(|m| m.as_str())
}

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

/// Crude English suffix stripping; enough to conflate plurals and tenses.
pub fn stem(word: &str) -> String {
    let word = word.replace('’', "'");
    let word = word.strip_suffix("'s").unwrap_or(&word);
    let len = word.chars().count();

    if len > 4 {
        if let Some(base) = word.strip_suffix("ies") {
            return format!("{base}y");
        }
        for suffix in ["ing", "ed", "ly", "es"] {
            if let Some(base) = word.strip_suffix(suffix) {
                if base.chars().count() >= 3 {
                    return base.to_string();
                }
            }
        }
    }
    if len > 3 && !word.ends_with("ss") {
        if let Some(base) = word.strip_suffix('s') {
            return base.to_string();
        }
    }
    word.to_string()
}

/// Lowercased, stop-word-free, stemmed terms of a sentence.
pub fn content_terms(sentence: &str) -> Vec<String> {
    words(sentence)
        .map(str::to_lowercase)
        .filter(|w| !is_stop_word(w))
        .map(|w| stem(&w))
        .collect()
}
