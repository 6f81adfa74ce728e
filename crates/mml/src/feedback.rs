//! Interpreter feedback (warnings and notes about skipped tokens).
//!
//! The interpreter never stops on bad input. Anything it has to skip or
//! reinterpret is recorded here so callers can surface it.

use serde::{Deserialize, Serialize};

/// One observation made while interpreting an MML stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub level: FeedbackLevel,
    pub message: String,
    /// Zero-based index of the token in the stream
    pub token_index: usize,
    /// Byte offset of the token in the stream
    pub offset: usize,
    /// The offending token text
    pub token: Option<String>,
    pub suggestion: Option<String>,
}

impl Feedback {
    pub fn warning(message: impl Into<String>, token_index: usize, offset: usize) -> Self {
        Feedback {
            level: FeedbackLevel::Warning,
            message: message.into(),
            token_index,
            offset,
            token: None,
            suggestion: None,
        }
    }

    pub fn info(message: impl Into<String>, token_index: usize, offset: usize) -> Self {
        Feedback {
            level: FeedbackLevel::Info,
            message: message.into(),
            token_index,
            offset,
            token: None,
            suggestion: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedbackLevel {
    /// Token was skipped or only partly honoured
    Warning,
    /// Token was accepted but has no effect
    Info,
}

/// Collector for feedback during interpretation
#[derive(Debug, Default)]
pub struct FeedbackCollector {
    feedback: Vec<Feedback>,
    token_index: usize,
    offset: usize,
    token: String,
}

impl FeedbackCollector {
    pub fn new() -> Self {
        FeedbackCollector::default()
    }

    /// Point the collector at the token about to be processed
    pub fn set_position(&mut self, token_index: usize, offset: usize, token: &str) {
        self.token_index = token_index;
        self.offset = offset;
        self.token.clear();
        self.token.push_str(token);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.feedback.push(
            Feedback::warning(message, self.token_index, self.offset).with_token(&self.token),
        );
    }

    pub fn warning_with_suggestion(
        &mut self,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) {
        self.feedback.push(
            Feedback::warning(message, self.token_index, self.offset)
                .with_token(&self.token)
                .with_suggestion(suggestion),
        );
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.feedback
            .push(Feedback::info(message, self.token_index, self.offset).with_token(&self.token));
    }

    pub fn into_feedback(self) -> Vec<Feedback> {
        self.feedback
    }

    pub fn feedback(&self) -> &[Feedback] {
        &self.feedback
    }
}

/// A value together with the feedback gathered while producing it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResult<T> {
    pub value: T,
    pub feedback: Vec<Feedback>,
}

impl<T> ParseResult<T> {
    pub fn new(value: T, feedback: Vec<Feedback>) -> Self {
        ParseResult { value, feedback }
    }

    pub fn ok(value: T) -> Self {
        ParseResult {
            value,
            feedback: Vec::new(),
        }
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings().next().is_some()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Feedback> {
        self.feedback
            .iter()
            .filter(|f| f.level == FeedbackLevel::Warning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_builder() {
        let fb = Feedback::warning("Unknown command 'z'", 3, 12)
            .with_token("z99")
            .with_suggestion("Use one of t v o l r @ or a note letter");

        assert_eq!(fb.level, FeedbackLevel::Warning);
        assert_eq!(fb.token_index, 3);
        assert_eq!(fb.offset, 12);
        assert_eq!(fb.token.as_deref(), Some("z99"));
        assert!(fb.suggestion.is_some());
    }

    #[test]
    fn test_feedback_collector_tracks_position() {
        let mut collector = FeedbackCollector::new();

        collector.set_position(0, 0, "t0");
        collector.warning("Tempo must be positive");
        collector.set_position(4, 17, "@0");
        collector.info("Instrument markers are ignored");

        let feedback = collector.into_feedback();
        assert_eq!(feedback.len(), 2);
        assert_eq!(feedback[0].token.as_deref(), Some("t0"));
        assert_eq!(feedback[1].token_index, 4);
        assert_eq!(feedback[1].offset, 17);
        assert_eq!(feedback[1].level, FeedbackLevel::Info);
    }

    #[test]
    fn test_parse_result() {
        let result: ParseResult<i32> = ParseResult::new(
            42,
            vec![
                Feedback::info("noted", 0, 0),
                Feedback::warning("skipped", 1, 3),
            ],
        );

        assert!(result.has_warnings());
        assert_eq!(result.warnings().count(), 1);
        assert!(!ParseResult::ok(1).has_warnings());
    }
}
