//! Rule-based grammar and style checker
//!
//! Issue offsets are character offsets into the checked text, not byte offsets.

use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::types::{ComplianceIssue, Severity};

/// Category attached to every issue this checker reports
pub const CATEGORY: &str = "grammar/style";

static SINGULAR_SUBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(this|it|he|she)\s+(are)\b").unwrap());

static PLURAL_SUBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(they|we|these|those)\s+(is|was|has)\b").unwrap());

static ARTICLE_A: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(a)\s+([aeiou][\p{L}-]*)").unwrap());

static ARTICLE_AN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(an)\s+([bcdfgjklmnpqrstvwz][\p{L}-]*)").unwrap());

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\p{L}']+").unwrap());

static SPACE_BEFORE_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+([,.;:!?])(?:\s|$)").unwrap());

static MULTI_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {2,}").unwrap());

static LOWERCASE_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^\s*|([.!?])\s+)(\p{Ll})").unwrap());

/// Vowel-initial words that take "a" because they start with a consonant sound
const CONSONANT_SOUND_PREFIXES: &[&str] = &["uni", "use", "usu", "uti", "ure", "eu", "one", "once"];

/// Tokens ending in a period that do not end a sentence
const ABBREVIATIONS: &[&str] = &["etc", "vs", "approx", "cf", "e.g", "i.e", "mr", "mrs", "ms", "dr", "no"];

/// A finding in byte offsets before conversion to an issue
struct Finding {
    start: usize,
    end: usize,
    severity: Severity,
    message: String,
    suggestion: Option<String>,
}

/// English grammar and style rules
pub struct GrammarChecker {
    language: String,
}

impl Default for GrammarChecker {
    fn default() -> Self {
        Self::new("en-US")
    }
}

impl GrammarChecker {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }

    /// Language tag the checker was configured with
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Check `text`, returning issues ordered by position
    pub fn check(&self, text: &str) -> Vec<ComplianceIssue> {
        if !self.language.to_lowercase().starts_with("en") {
            tracing::warn!("No grammar rules for language {}, skipping checks", self.language);
            return Vec::new();
        }

        let mut findings = Vec::new();
        subject_verb_agreement(text, &mut findings);
        indefinite_articles(text, &mut findings);
        repeated_words(text, &mut findings);
        space_before_punctuation(text, &mut findings);
        repeated_spaces(text, &mut findings);
        lowercase_sentence_start(text, &mut findings);

        findings.sort_by_key(|f| (f.start, f.end));
        findings
            .into_iter()
            .map(|f| ComplianceIssue {
                category: CATEGORY.to_string(),
                severity: f.severity,
                sentence: Some(sentence_around(text, f.start)),
                message: f.message,
                suggestion: f.suggestion,
                offset_start: Some(char_offset(text, f.start)),
                offset_end: Some(char_offset(text, f.end)),
            })
            .collect()
    }
}

// "were" stays allowed after singular subjects ("if it were")
fn singular_verb(_verb: &str) -> &'static str {
    "is"
}

fn plural_verb(verb: &str) -> &'static str {
    match verb {
        "is" => "are",
        "was" => "were",
        _ => "have",
    }
}

fn subject_verb_agreement(text: &str, out: &mut Vec<Finding>) {
    let rules: [(&Regex, fn(&str) -> &'static str); 2] = [
        (&*SINGULAR_SUBJECT, singular_verb as fn(&str) -> &'static str),
        (&*PLURAL_SUBJECT, plural_verb as fn(&str) -> &'static str),
    ];

    for (re, fix) in rules {
        for caps in re.captures_iter(text) {
            let (Some(whole), Some(subject), Some(verb)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            let replacement = fix(&verb.as_str().to_lowercase());
            out.push(Finding {
                start: whole.start(),
                end: whole.end(),
                severity: Severity::High,
                message: format!(
                    "The verb '{}' does not agree with the subject '{}'.",
                    verb.as_str(),
                    subject.as_str()
                ),
                suggestion: Some(format!("{} {}", subject.as_str(), replacement)),
            });
        }
    }
}

fn indefinite_articles(text: &str, out: &mut Vec<Finding>) {
    for caps in ARTICLE_A.captures_iter(text) {
        if let Some(finding) = article_finding(&caps, "an", |word| {
            let lower = word.to_lowercase();
            !CONSONANT_SOUND_PREFIXES.iter().any(|p| lower.starts_with(p))
        }) {
            out.push(finding);
        }
    }
    for caps in ARTICLE_AN.captures_iter(text) {
        if let Some(finding) = article_finding(&caps, "a", |_| true) {
            out.push(finding);
        }
    }
}

fn article_finding(caps: &Captures, wanted: &str, applies: impl Fn(&str) -> bool) -> Option<Finding> {
    let whole = caps.get(0)?;
    let article = caps.get(1)?.as_str();
    let word = caps.get(2)?.as_str();

    // Acronyms are read letter by letter
    if word.len() > 1 && word.chars().all(|c| !c.is_lowercase()) {
        return None;
    }
    if !applies(word) {
        return None;
    }

    let wanted = if article.starts_with('A') {
        let mut chars = wanted.chars();
        chars
            .next()
            .map(|c| c.to_uppercase().chain(chars).collect::<String>())
            .unwrap_or_default()
    } else {
        wanted.to_string()
    };

    Some(Finding {
        start: whole.start(),
        end: whole.end(),
        severity: Severity::High,
        message: format!("Use '{}' instead of '{}' before '{}'.", wanted, article, word),
        suggestion: Some(format!("{} {}", wanted, word)),
    })
}

fn repeated_words(text: &str, out: &mut Vec<Finding>) {
    let mut previous: Option<regex::Match> = None;
    for word in WORD.find_iter(text) {
        if let Some(prev) = previous {
            let gap = &text[prev.end()..word.start()];
            if !gap.is_empty()
                && gap.chars().all(|c| c == ' ' || c == '\t')
                && prev.as_str().to_lowercase() == word.as_str().to_lowercase()
            {
                out.push(Finding {
                    start: prev.start(),
                    end: word.end(),
                    severity: Severity::Medium,
                    message: "Possible typo: you repeated a word.".to_string(),
                    suggestion: Some(prev.as_str().to_string()),
                });
            }
        }
        previous = Some(word);
    }
}

fn space_before_punctuation(text: &str, out: &mut Vec<Finding>) {
    for caps in SPACE_BEFORE_PUNCT.captures_iter(text) {
        let (Some(whole), Some(punct)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        // Ignore spacing at the start of a line
        let line_start = text[..whole.start()].rfind('\n').map(|i| i + 1).unwrap_or(0);
        if text[line_start..whole.start()].trim().is_empty() {
            continue;
        }
        out.push(Finding {
            start: whole.start(),
            end: punct.end(),
            severity: Severity::Medium,
            message: "Don't put a space before the punctuation mark.".to_string(),
            suggestion: Some(punct.as_str().to_string()),
        });
    }
}

fn repeated_spaces(text: &str, out: &mut Vec<Finding>) {
    for m in MULTI_SPACE.find_iter(text) {
        let before = text[..m.start()].chars().next_back();
        let after = text[m.end()..].chars().next();
        let inside_line = matches!(before, Some(c) if !c.is_whitespace())
            && matches!(after, Some(c) if !c.is_whitespace() && !",.;:!?".contains(c));
        if inside_line {
            out.push(Finding {
                start: m.start(),
                end: m.end(),
                severity: Severity::Medium,
                message: "Possible typo: you repeated a whitespace.".to_string(),
                suggestion: Some(" ".to_string()),
            });
        }
    }
}

fn lowercase_sentence_start(text: &str, out: &mut Vec<Finding>) {
    for caps in LOWERCASE_START.captures_iter(text) {
        let Some(letter) = caps.get(2) else {
            continue;
        };
        if let Some(punct) = caps.get(1) {
            let before = &text[..punct.start()];
            let token = before
                .rsplit(char::is_whitespace)
                .next()
                .unwrap_or("")
                .to_lowercase();
            if token.is_empty() || ABBREVIATIONS.contains(&token.as_str()) || token.contains('.') {
                continue;
            }
        }
        out.push(Finding {
            start: letter.start(),
            end: letter.end(),
            severity: Severity::Medium,
            message: "This sentence does not start with an uppercase letter.".to_string(),
            suggestion: Some(letter.as_str().to_uppercase()),
        });
    }
}

/// Trimmed sentence containing byte offset `at`
fn sentence_around(text: &str, at: usize) -> String {
    let is_boundary = |c: char| matches!(c, '.' | '!' | '?' | '\n');
    let start = text[..at]
        .char_indices()
        .rev()
        .find(|(_, c)| is_boundary(*c))
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    let end = text[at..]
        .char_indices()
        .find(|(_, c)| is_boundary(*c))
        .map(|(i, c)| if c == '\n' { at + i } else { at + i + c.len_utf8() })
        .unwrap_or(text.len());
    text[start..end].trim().to_string()
}

fn char_offset(text: &str, byte: usize) -> usize {
    text[..byte].chars().count()
}
