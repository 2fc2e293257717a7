//! Sentence segmentation with byte spans

use factcheck_domain::Span;

/// One sentence of the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sentence<'a> {
    /// Position among the non-empty sentences of the input
    pub index: usize,
    /// Location of the trimmed sentence in the input
    pub span: Span,
    /// Trimmed sentence text
    pub text: &'a str,
}

impl Sentence<'_> {
    /// Number of whitespace-separated words
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Whether the sentence ends with a question mark (ignoring closing quotes)
    pub fn is_question(&self) -> bool {
        self.text
            .trim_end_matches(is_closing)
            .ends_with('?')
    }
}

/// Split text into sentences
///
/// A boundary is `.`, `!` or `?` (plus any closing quotes or brackets right
/// after it) followed by whitespace or the end of the text. Decimals such as
/// `1.8` never split because the period is followed by a digit. Trailing
/// text without terminal punctuation forms a final sentence.
pub fn split_sentences(text: &str) -> Vec<Sentence<'_>> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }

        let mut end = i + c.len_utf8();
        while let Some(&(j, next)) = chars.peek() {
            if is_closing(next) {
                end = j + next.len_utf8();
                chars.next();
            } else {
                break;
            }
        }

        let at_boundary = match chars.peek() {
            None => true,
            Some(&(_, next)) => next.is_whitespace(),
        };

        if at_boundary {
            push_sentence(&mut sentences, text, start, end);
            start = end;
        }
    }

    if start < text.len() {
        push_sentence(&mut sentences, text, start, text.len());
    }

    sentences
}

fn is_closing(c: char) -> bool {
    matches!(c, '"' | '\'' | ')' | ']' | '\u{201D}' | '\u{2019}')
}

fn push_sentence<'a>(out: &mut Vec<Sentence<'a>>, text: &'a str, start: usize, end: usize) {
    let raw = &text[start..end];
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return;
    }

    let lead = raw.len() - raw.trim_start().len();
    let span_start = start + lead;

    out.push(Sentence {
        index: out.len(),
        span: Span {
            start: span_start,
            end: span_start + trimmed.len(),
        },
        text: trimmed,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_split() {
        let sentences = split_sentences("First one. Second one! Third one?");
        let texts: Vec<&str> = sentences.iter().map(|s| s.text).collect();
        assert_eq!(texts, vec!["First one.", "Second one!", "Third one?"]);
    }

    #[test]
    fn test_decimals_do_not_split() {
        let sentences = split_sentences("The deficit is $1.8 trillion. It was 1.7 before.");
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].text, "The deficit is $1.8 trillion.");
    }

    #[test]
    fn test_spans_point_into_input() {
        let text = "  Alpha beta.   Gamma delta!  ";
        for sentence in split_sentences(text) {
            assert_eq!(&text[sentence.span.start..sentence.span.end], sentence.text);
        }
    }

    #[test]
    fn test_indices_are_sequential() {
        let sentences = split_sentences("A b c. D e f. G h i.");
        let indices: Vec<usize> = sentences.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_trailing_text_without_punctuation() {
        let sentences = split_sentences("Complete sentence. Dangling words");
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[1].text, "Dangling words");
    }

    #[test]
    fn test_closing_quote_stays_with_sentence() {
        let sentences = split_sentences("He said \"it doubled.\" Then he left.");
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].text, "He said \"it doubled.\"");
    }

    #[test]
    fn test_empty_and_whitespace_input() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences("   \n\t ").is_empty());
    }

    #[test]
    fn test_repeated_punctuation() {
        let sentences = split_sentences("Really?! Yes.");
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].text, "Really?!");
    }

    #[test]
    fn test_question_detection_ignores_quotes() {
        let sentences = split_sentences("Who knows what \"really happened?\"");
        assert!(sentences[0].is_question());
    }

    #[test]
    fn test_word_count() {
        let sentences = split_sentences("One two three.");
        assert_eq!(sentences[0].word_count(), 3);
    }
}
