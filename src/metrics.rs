//! Word metrics derived from note content on every save.

/// Words-per-minute used for the reading time estimate.
const READING_SPEED_WPM: i32 = 200;

/// Removes HTML-style markup, replacing each tag with a space so adjacent
/// words do not fuse.
pub fn strip_markup(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut in_tag = false;
    for c in content.chars() {
        match c {
            '<' => {
                in_tag = true;
                out.push(' ');
            }
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

/// Counts whitespace-delimited tokens of the content with markup stripped.
pub fn word_count(content: &str) -> i32 {
    let stripped = strip_markup(content);
    i32::try_from(stripped.split_whitespace().count()).unwrap_or(i32::MAX)
}

/// Estimated reading time in minutes: ceil(words / 200), never below 1.
pub fn reading_time(word_count: i32) -> i32 {
    let words = word_count.max(0).unsigned_abs();
    i32::try_from(words.div_ceil(READING_SPEED_WPM.unsigned_abs()))
        .unwrap_or(i32::MAX)
        .max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_whitespace_delimited_tokens() {
        assert_eq!(word_count("one two three"), 3);
        assert_eq!(word_count("  spaced\tout\nwords  "), 3);
        assert_eq!(word_count(""), 0);
    }

    #[test]
    fn markup_is_stripped_before_counting() {
        assert_eq!(word_count("<p>hello <b>world</b></p>"), 2);
        assert_eq!(word_count("before<br>after"), 2);
    }

    #[test]
    fn reading_time_floors_at_one_minute() {
        assert_eq!(reading_time(0), 1);
        assert_eq!(reading_time(1), 1);
        assert_eq!(reading_time(200), 1);
    }

    #[test]
    fn reading_time_rounds_up() {
        assert_eq!(reading_time(201), 2);
        assert_eq!(reading_time(250), 2);
        assert_eq!(reading_time(401), 3);
    }

    #[test]
    fn two_hundred_fifty_words_read_in_two_minutes() {
        let content = vec!["word"; 250].join(" ");
        let wc = word_count(&content);
        assert_eq!(wc, 250);
        assert_eq!(reading_time(wc), 2);
    }
}
