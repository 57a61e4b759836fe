//! Token sinks
//!
//! The generator never builds its output as one string. It hands a stream of
//! classified tokens to a [`TokenSink`], which decides how they turn into
//! characters: [`PlainTextWriter`] concatenates them, [`TokenRecorder`] keeps
//! the classification so a caller can highlight keywords, types and comments.

use serde::{Deserialize, Serialize};

/// Classification of an emitted token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Identifiers, punctuation, whitespace and line breaks
    Text,
    /// Language keyword (`public`, `class`, `CREATE PROCEDURE`)
    Keyword,
    /// Name of a user-defined or framework type
    UserType,
    Comment,
    /// Diagnostic text for objects that failed extraction
    Error,
}

/// Receiver of generated tokens.
///
/// Implementors only provide [`write_token`](TokenSink::write_token) and
/// [`clear`](TokenSink::clear); the typed and line-terminated variants are
/// derived from them.
pub trait TokenSink {
    fn write_token(&mut self, kind: TokenKind, text: &str);

    /// Discard everything written so far
    fn clear(&mut self);

    fn write(&mut self, text: &str) {
        self.write_token(TokenKind::Text, text);
    }

    fn write_keyword(&mut self, text: &str) {
        self.write_token(TokenKind::Keyword, text);
    }

    fn write_user_type(&mut self, text: &str) {
        self.write_token(TokenKind::UserType, text);
    }

    fn write_comment(&mut self, text: &str) {
        self.write_token(TokenKind::Comment, text);
    }

    fn write_error(&mut self, text: &str) {
        self.write_token(TokenKind::Error, text);
    }

    fn end_line(&mut self) {
        self.write_token(TokenKind::Text, "\n");
    }

    fn write_line(&mut self, text: &str) {
        self.write(text);
        self.end_line();
    }

    fn write_line_keyword(&mut self, text: &str) {
        self.write_keyword(text);
        self.end_line();
    }

    fn write_line_user_type(&mut self, text: &str) {
        self.write_user_type(text);
        self.end_line();
    }

    fn write_line_comment(&mut self, text: &str) {
        self.write_comment(text);
        self.end_line();
    }

    fn write_line_error(&mut self, text: &str) {
        self.write_error(text);
        self.end_line();
    }
}

/// Sink producing plain text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlainTextWriter {
    buffer: String,
}

impl PlainTextWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> &str {
        &self.buffer
    }

    pub fn into_string(self) -> String {
        self.buffer
    }
}

impl TokenSink for PlainTextWriter {
    fn write_token(&mut self, _kind: TokenKind, text: &str) {
        self.buffer.push_str(text);
    }

    fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl std::fmt::Display for PlainTextWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.buffer)
    }
}

/// One recorded token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

/// Sink keeping every token with its classification
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenRecorder {
    tokens: Vec<Token>,
}

impl TokenRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Texts of all tokens of one kind, in emission order
    pub fn texts_of(&self, kind: TokenKind) -> impl Iterator<Item = &str> {
        self.tokens
            .iter()
            .filter(move |t| t.kind == kind)
            .map(|t| t.text.as_str())
    }

    /// Concatenated text, identical to what [`PlainTextWriter`] would hold
    pub fn render(&self) -> String {
        self.render_with(|_, text| text.to_string())
    }

    /// Concatenate tokens after passing each through `decorate`
    pub fn render_with<F>(&self, mut decorate: F) -> String
    where
        F: FnMut(TokenKind, &str) -> String,
    {
        self.tokens
            .iter()
            .map(|t| decorate(t.kind, &t.text))
            .collect()
    }
}

impl TokenSink for TokenRecorder {
    fn write_token(&mut self, kind: TokenKind, text: &str) {
        if text.is_empty() {
            return;
        }
        // Adjacent tokens of the same kind are merged
        if let Some(last) = self.tokens.last_mut()
            && last.kind == kind
            && text != "\n"
            && !last.text.ends_with('\n')
        {
            last.text.push_str(text);
            return;
        }
        self.tokens.push(Token {
            kind,
            text: text.to_string(),
        });
    }

    fn clear(&mut self) {
        self.tokens.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emit(sink: &mut dyn TokenSink) {
        sink.write_keyword("public");
        sink.write(" ");
        sink.write_keyword("class");
        sink.write(" ");
        sink.write_line_user_type("Credit");
        sink.write_line_comment("// note");
        sink.write_line_error("/*");
    }

    #[test]
    fn test_plain_text_writer() {
        let mut writer = PlainTextWriter::new();
        emit(&mut writer);
        assert_eq!(writer.contents(), "public class Credit\n// note\n/*\n");
        writer.clear();
        assert_eq!(writer.contents(), "");
    }

    #[test]
    fn test_recorder_matches_plain_text() {
        let mut recorder = TokenRecorder::new();
        let mut writer = PlainTextWriter::new();
        emit(&mut recorder);
        emit(&mut writer);
        assert_eq!(recorder.render(), writer.into_string());
        let keywords: Vec<&str> = recorder.texts_of(TokenKind::Keyword).collect();
        assert_eq!(keywords, vec!["public", "class"]);
        let user_types: Vec<&str> = recorder.texts_of(TokenKind::UserType).collect();
        assert_eq!(user_types, vec!["Credit"]);
    }

    #[test]
    fn test_recorder_decorates() {
        let mut recorder = TokenRecorder::new();
        recorder.write_keyword("int");
        recorder.write(" Id;");
        let html = recorder.render_with(|kind, text| match kind {
            TokenKind::Keyword => format!("<b>{}</b>", text),
            _ => text.to_string(),
        });
        assert_eq!(html, "<b>int</b> Id;");
    }
}
