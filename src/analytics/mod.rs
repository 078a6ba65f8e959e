//! Per-user descriptive statistics over stored notes.
//!
//! The whole report is a pure, deterministic function of the user's note
//! rows and a reference instant; no storage access, no external calls.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Note;

const TOP_WORDS: usize = 10;
const TOP_TAGS: usize = 10;
const TOP_TOPICS: usize = 5;
const RECENT_NOTES: usize = 5;
const FREQUENCY_WINDOW_DAYS: i64 = 30;
const MIN_WORD_LENGTH: usize = 4;

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "up", "about", "into", "through", "during", "before", "after", "above", "below",
    "between", "among", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "do", "does", "did", "will", "would", "could", "should", "may", "might", "must", "can",
    "this", "that", "these", "those", "i", "you", "he", "she", "it", "we", "they", "me", "him",
    "her", "us", "them",
];

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "excellent", "amazing", "wonderful", "fantastic", "awesome", "brilliant",
    "perfect", "outstanding", "superb", "marvelous", "terrific", "fabulous", "magnificent",
    "spectacular", "remarkable", "incredible", "phenomenal", "exceptional",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "terrible", "awful", "horrible", "dreadful", "disgusting", "appalling", "atrocious",
    "abysmal", "deplorable", "ghastly", "hideous", "horrendous", "lousy", "nasty", "revolting",
    "shocking", "sickening", "vile", "wretched",
];

const TECH_WORDS: &[&str] = &[
    "code", "programming", "software", "development", "application", "system", "database",
    "algorithm", "function", "variable",
];

const BUSINESS_WORDS: &[&str] = &[
    "meeting", "project", "client", "budget", "deadline", "strategy", "goal", "target",
    "revenue", "profit",
];

const PERSONAL_WORDS: &[&str] = &[
    "family", "friend", "personal", "life", "home", "relationship", "feeling", "emotion",
    "thought", "idea",
];

const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnalyticsReport {
    /// Number of notes the user owns
    pub total_notes: u64,
    /// Sum of per-note word counts
    pub total_words: u64,
    /// round(total_words / total_notes, 2); 0 with no notes
    pub average_words_per_note: f64,
    /// Sum of per-note reading times, in minutes
    pub total_reading_time: u64,
    /// Weekday with the most note creations, or "No data"
    pub most_productive_day: String,
    /// Daily note-creation counts over the last 30 days, newest first
    pub writing_frequency: Vec<DailyActivity>,
    pub content_analysis: ContentAnalysis,
    /// Tag usage counts, most used first
    pub tag_distribution: Vec<TagFrequency>,
    /// The 5 most recently updated notes
    pub recent_activity: Vec<RecentNote>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContentAnalysis {
    /// Top non-stopword tokens across titles and content
    pub most_common_words: Vec<WordFrequency>,
    /// (positive - negative) word count, normalized per total words, x100
    pub sentiment_score: f64,
    /// Simplified Flesch Reading Ease, clamped to [0, 100]
    pub complexity_score: f64,
    /// Weight of the fixed topic buckets among the top common words
    pub topics: Vec<TopicWeight>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WordFrequency {
    pub word: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TopicWeight {
    pub topic: String,
    pub weight: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TagFrequency {
    pub tag: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DailyActivity {
    pub date: NaiveDate,
    pub notes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecentNote {
    pub title: String,
    pub word_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Computes the full report for one user's notes. `now` anchors the 30-day
/// frequency window.
pub fn analyze(notes: &[Note], now: DateTime<Utc>) -> AnalyticsReport {
    let total_notes = notes.len() as u64;
    let total_words: u64 = notes.iter().map(|n| u64::from(n.word_count.max(0) as u32)).sum();
    let total_reading_time: u64 = notes
        .iter()
        .map(|n| u64::from(n.reading_time.max(0) as u32))
        .sum();

    let average_words_per_note = if total_notes > 0 {
        round2(total_words as f64 / total_notes as f64)
    } else {
        0.0
    };

    let most_common_words = most_common_words(notes);
    let topics = topic_buckets(&most_common_words);

    AnalyticsReport {
        total_notes,
        total_words,
        average_words_per_note,
        total_reading_time,
        most_productive_day: most_productive_day(notes),
        writing_frequency: writing_frequency(notes, now),
        content_analysis: ContentAnalysis {
            sentiment_score: sentiment_score(notes),
            complexity_score: complexity_score(notes),
            topics,
            most_common_words,
        },
        tag_distribution: tag_distribution(notes),
        recent_activity: recent_activity(notes),
    }
}

/// Top tokens longer than three characters across title+content, lowercased
/// with non-letters dropped, excluding stop words.
fn most_common_words(notes: &[Note]) -> Vec<WordFrequency> {
    let mut counts: HashMap<String, u64> = HashMap::new();

    for note in notes {
        let text: String = format!("{} {}", note.title, note.content)
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_lowercase() || c.is_whitespace())
            .collect();

        for word in text.split_whitespace() {
            if word.len() >= MIN_WORD_LENGTH && !STOP_WORDS.contains(&word) {
                *counts.entry(word.to_string()).or_insert(0) += 1;
            }
        }
    }

    top_n(counts, TOP_WORDS)
        .into_iter()
        .map(|(word, count)| WordFrequency { word, count })
        .collect()
}

/// Positive minus negative word occurrences, normalized per total content
/// words and scaled by 100. Zero when there are no words at all.
fn sentiment_score(notes: &[Note]) -> f64 {
    let mut positive = 0i64;
    let mut negative = 0i64;
    let mut total = 0i64;

    for note in notes {
        for word in letter_words(&note.content.to_lowercase()) {
            total += 1;
            if POSITIVE_WORDS.contains(&word) {
                positive += 1;
            } else if NEGATIVE_WORDS.contains(&word) {
                negative += 1;
            }
        }
    }

    if total == 0 {
        return 0.0;
    }

    round2((positive - negative) as f64 / total as f64 * 100.0)
}

/// Simplified Flesch Reading Ease from average sentence length and average
/// word length, clamped to [0, 100].
fn complexity_score(notes: &[Note]) -> f64 {
    let mut sentences = 0u64;
    let mut words = 0u64;
    let mut characters = 0u64;

    for note in notes {
        sentences += note
            .content
            .split(['.', '!', '?'])
            .filter(|s| !s.trim().is_empty())
            .count() as u64;

        for word in letter_words(&note.content) {
            words += 1;
            characters += word.len() as u64;
        }
    }

    if sentences == 0 || words == 0 {
        return 0.0;
    }

    let words_per_sentence = words as f64 / sentences as f64;
    let chars_per_word = characters as f64 / words as f64;

    let score = 206.835 - 1.015 * words_per_sentence - 84.6 * chars_per_word / 4.7;
    round1(score.clamp(0.0, 100.0))
}

/// Assigns each top common word to one of four fixed buckets and sums the
/// counts per bucket.
fn topic_buckets(common_words: &[WordFrequency]) -> Vec<TopicWeight> {
    let mut buckets: HashMap<&'static str, u64> = HashMap::new();

    for wf in common_words {
        let word = wf.word.as_str();
        let bucket = if TECH_WORDS.contains(&word) {
            "Technology"
        } else if BUSINESS_WORDS.contains(&word) {
            "Business"
        } else if PERSONAL_WORDS.contains(&word) {
            "Personal"
        } else {
            "General"
        };
        *buckets.entry(bucket).or_insert(0) += wf.count;
    }

    let counts = buckets
        .into_iter()
        .map(|(topic, weight)| (topic.to_string(), weight))
        .collect();

    top_n_from_vec(counts, TOP_TOPICS)
        .into_iter()
        .map(|(topic, weight)| TopicWeight { topic, weight })
        .collect()
}

fn most_productive_day(notes: &[Note]) -> String {
    if notes.is_empty() {
        return "No data".to_string();
    }

    let mut counts = [0u64; 7];
    for note in notes {
        counts[note.created_at.weekday().num_days_from_sunday() as usize] += 1;
    }

    let best = counts
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)))
        .map_or(0, |(i, _)| i);

    DAY_NAMES[best].to_string()
}

fn writing_frequency(notes: &[Note], now: DateTime<Utc>) -> Vec<DailyActivity> {
    let cutoff = now - Duration::days(FREQUENCY_WINDOW_DAYS);

    let mut counts: HashMap<NaiveDate, u64> = HashMap::new();
    for note in notes {
        if note.created_at >= cutoff {
            *counts.entry(note.created_at.date_naive()).or_insert(0) += 1;
        }
    }

    let mut days: Vec<DailyActivity> = counts
        .into_iter()
        .map(|(date, notes)| DailyActivity { date, notes })
        .collect();
    days.sort_by(|a, b| b.date.cmp(&a.date));
    days
}

fn tag_distribution(notes: &[Note]) -> Vec<TagFrequency> {
    let mut counts: HashMap<String, u64> = HashMap::new();

    for note in notes {
        if let Some(tags) = &note.tags {
            for tag in tags {
                *counts.entry(tag.clone()).or_insert(0) += 1;
            }
        }
    }

    top_n(counts, TOP_TAGS)
        .into_iter()
        .map(|(tag, count)| TagFrequency { tag, count })
        .collect()
}

fn recent_activity(notes: &[Note]) -> Vec<RecentNote> {
    let mut sorted: Vec<&Note> = notes.iter().collect();
    sorted.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

    sorted
        .into_iter()
        .take(RECENT_NOTES)
        .map(|n| RecentNote {
            title: n.title.clone(),
            word_count: n.word_count,
            created_at: n.created_at,
            updated_at: n.updated_at,
        })
        .collect()
}

/// Words as maximal runs of alphabetic characters.
fn letter_words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphabetic())
        .filter(|w| !w.is_empty())
}

/// Highest-count entries first; ties broken alphabetically for
/// deterministic output.
fn top_n(counts: HashMap<String, u64>, n: usize) -> Vec<(String, u64)> {
    top_n_from_vec(counts.into_iter().collect(), n)
}

fn top_n_from_vec(mut counts: Vec<(String, u64)>, n: usize) -> Vec<(String, u64)> {
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts.truncate(n);
    counts
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn note_at(content: &str, created: DateTime<Utc>) -> Note {
        let word_count = crate::metrics::word_count(content);
        Note {
            id: 1,
            user_id: 1,
            title: "Title".to_string(),
            content: content.to_string(),
            tags: None,
            ai_summary: None,
            word_count,
            reading_time: crate::metrics::reading_time(word_count),
            created_at: created,
            updated_at: created,
        }
    }

    fn ts(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn empty_input_yields_zeroed_report() {
        let report = analyze(&[], ts(2026, 8, 25));
        assert_eq!(report.total_notes, 0);
        assert_eq!(report.average_words_per_note, 0.0);
        assert_eq!(report.most_productive_day, "No data");
        assert_eq!(report.content_analysis.sentiment_score, 0.0);
        assert_eq!(report.content_analysis.complexity_score, 0.0);
        assert!(report.writing_frequency.is_empty());
        assert!(report.recent_activity.is_empty());
    }

    #[test]
    fn average_words_is_rounded_to_two_places() {
        let notes = vec![
            note_at("one two", ts(2026, 8, 1)),
            note_at("one two three", ts(2026, 8, 2)),
            note_at("one two three four", ts(2026, 8, 3)),
        ];
        let report = analyze(&notes, ts(2026, 8, 25));
        assert_eq!(report.total_words, 9);
        assert_eq!(report.average_words_per_note, 3.0);

        let notes = vec![
            note_at("one", ts(2026, 8, 1)),
            note_at("one two", ts(2026, 8, 2)),
            note_at("one two three four", ts(2026, 8, 3)),
        ];
        let report = analyze(&notes, ts(2026, 8, 25));
        // 7 / 3 = 2.333...
        assert_eq!(report.average_words_per_note, 2.33);
    }

    #[test]
    fn sentiment_counts_fixed_word_lists() {
        let notes = vec![note_at("good good work despite one bad day", ts(2026, 8, 1))];
        // (2 - 1) / 7 * 100 = 14.2857...
        assert_eq!(sentiment_score(&notes), 14.29);
    }

    #[test]
    fn sentiment_is_zero_without_words() {
        let notes = vec![note_at("12345 !!!", ts(2026, 8, 1))];
        assert_eq!(sentiment_score(&notes), 0.0);
    }

    #[test]
    fn complexity_is_clamped_to_valid_range() {
        // Extremely long single-sentence content forces the raw formula
        // below zero.
        let long = vec!["sesquipedalian"; 400].join(" ");
        let notes = vec![note_at(&format!("{long}."), ts(2026, 8, 1))];
        assert_eq!(complexity_score(&notes), 0.0);

        let easy = vec![note_at("Go. Run. Sit. Nap.", ts(2026, 8, 1))];
        let score = complexity_score(&easy);
        assert!((0.0..=100.0).contains(&score));
        assert!(score > 90.0);
    }

    #[test]
    fn common_words_skip_stopwords_and_short_tokens() {
        let notes = vec![note_at(
            "the project meeting about the project was about code",
            ts(2026, 8, 1),
        )];
        let words = most_common_words(&notes);
        let listed: Vec<&str> = words.iter().map(|w| w.word.as_str()).collect();
        assert!(listed.contains(&"project"));
        assert!(listed.contains(&"meeting"));
        assert!(!listed.contains(&"the"));
        assert!(!listed.contains(&"was"));
        // "code" is only 4 letters, kept; "about" is a stop word, dropped.
        assert!(listed.contains(&"code"));
        assert!(!listed.contains(&"about"));
    }

    #[test]
    fn topics_bucket_by_fixed_keyword_lists() {
        let notes = vec![note_at(
            "database database algorithm meeting family sunshine sunshine sunshine",
            ts(2026, 8, 1),
        )];
        let report = analyze(&notes, ts(2026, 8, 25));
        let topics = &report.content_analysis.topics;

        let weight = |name: &str| {
            topics
                .iter()
                .find(|t| t.topic == name)
                .map_or(0, |t| t.weight)
        };
        assert_eq!(weight("Technology"), 3); // database x2 + algorithm
        assert_eq!(weight("Business"), 1);
        assert_eq!(weight("Personal"), 1);
        // sunshine x3 plus the lowercased title token "title"
        assert_eq!(weight("General"), 4);
    }

    #[test]
    fn writing_frequency_honors_thirty_day_window() {
        let now = ts(2026, 8, 25);
        let notes = vec![
            note_at("recent", ts(2026, 8, 24)),
            note_at("recent", ts(2026, 8, 24)),
            note_at("edge", ts(2026, 8, 1)),
            note_at("ancient", ts(2026, 1, 1)),
        ];
        let freq = writing_frequency(&notes, now);
        assert_eq!(freq.len(), 2);
        assert_eq!(freq[0].date, NaiveDate::from_ymd_opt(2026, 8, 24).unwrap());
        assert_eq!(freq[0].notes, 2);
        assert_eq!(freq[1].notes, 1);
    }

    #[test]
    fn most_productive_day_names_the_busiest_weekday() {
        // 2026-08-24 is a Monday.
        let notes = vec![
            note_at("a", ts(2026, 8, 24)),
            note_at("b", ts(2026, 8, 17)),
            note_at("c", ts(2026, 8, 25)),
        ];
        assert_eq!(most_productive_day(&notes), "Monday");
    }

    #[test]
    fn tag_distribution_ranks_by_usage() {
        let mut a = note_at("a", ts(2026, 8, 1));
        a.tags = Some(vec!["work".to_string(), "ideas".to_string()]);
        let mut b = note_at("b", ts(2026, 8, 2));
        b.tags = Some(vec!["work".to_string()]);
        let c = note_at("c", ts(2026, 8, 3));

        let dist = tag_distribution(&[a, b, c]);
        assert_eq!(dist[0].tag, "work");
        assert_eq!(dist[0].count, 2);
        assert_eq!(dist[1].tag, "ideas");
    }

    #[test]
    fn recent_activity_caps_at_five_newest() {
        let notes: Vec<Note> = (1..=7)
            .map(|d| note_at("x", ts(2026, 8, d)))
            .collect();
        let recent = recent_activity(&notes);
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].updated_at, ts(2026, 8, 7));
        assert_eq!(recent[4].updated_at, ts(2026, 8, 3));
    }
}
