use serde::Serialize;
use thiserror::Error;

/// A 1-indexed line and column in the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    /// Line, from 1.
    pub line: usize,
    /// Column, from 1.
    pub column: usize,
}

impl SourceLocation {
    /// Creates a location.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Shift a location found inside a segment that starts at `first_line`.
    pub fn offset_lines(&self, first_line: usize) -> Self {
        Self {
            line: self.line + first_line.saturating_sub(1),
            column: self.column,
        }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// markdown-rs rejected a block.
#[derive(Debug, Error)]
pub enum MdxDocError {
    /// The parser message and where it points.
    #[error("Parse error at {location}: {message}")]
    Markdown {
        /// Parser message.
        message: String,
        /// Where the parser stopped.
        location: SourceLocation,
    },
}

impl MdxDocError {
    /// Where the parser stopped.
    pub fn location(&self) -> &SourceLocation {
        match self {
            Self::Markdown { location, .. } => location,
        }
    }
}

/// Something the deserializer kept going through, but that the author
/// should probably look at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseWarning {
    /// A fence that runs to the end of the input.
    UnclosedCodeFence {
        /// The opening fence.
        location: SourceLocation,
        /// `` ` `` or `~`.
        marker: char,
    },
    /// Markup that parsed, but not into what the author probably meant:
    /// raw YAML blocks mid-document, attributes on `<u>`, repeated
    /// attribute names.
    SuspiciousMarkup {
        /// Start of the markup.
        location: SourceLocation,
        /// What looked wrong.
        message: String,
    },
}

impl ParseWarning {
    /// Where the warning points.
    pub fn location(&self) -> &SourceLocation {
        match self {
            ParseWarning::UnclosedCodeFence { location, .. }
            | ParseWarning::SuspiciousMarkup { location, .. } => location,
        }
    }

    fn location_mut(&mut self) -> &mut SourceLocation {
        match self {
            ParseWarning::UnclosedCodeFence { location, .. }
            | ParseWarning::SuspiciousMarkup { location, .. } => location,
        }
    }
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseWarning::UnclosedCodeFence { location, marker } => {
                write!(f, "{location}: code fence ({marker}) is never closed")
            }
            ParseWarning::SuspiciousMarkup { location, message } => {
                write!(f, "{location}: {message}")
            }
        }
    }
}

/// A block that failed to parse and was kept as a plain-text paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecoverableError {
    /// Parser message.
    pub message: String,
    /// First line of the block, or the parser's own position when it gave one.
    pub location: SourceLocation,
}

impl RecoverableError {
    /// Creates an error.
    pub fn new(message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            message: message.into(),
            location,
        }
    }
}

impl std::fmt::Display for RecoverableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "error at {}: {}", self.location, self.message)
    }
}

/// Everything recovered from during one deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseDiagnostics {
    /// Non-fatal warnings.
    pub warnings: Vec<ParseWarning>,
    /// Blocks degraded to plain text.
    pub errors: Vec<RecoverableError>,
}

impl ParseDiagnostics {
    /// No diagnostics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a warning.
    pub fn add_warning(&mut self, warning: ParseWarning) {
        self.warnings.push(warning);
    }

    /// Records an error.
    pub fn add_error(&mut self, error: RecoverableError) {
        self.errors.push(error);
    }

    /// Moves everything from `other` into this collection.
    pub fn extend(&mut self, other: ParseDiagnostics) {
        self.warnings.extend(other.warnings);
        self.errors.extend(other.errors);
    }

    /// Whether any warning was recorded.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Whether any block was degraded.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Warnings plus errors.
    pub fn count(&self) -> usize {
        self.warnings.len() + self.errors.len()
    }

    /// True for a clean document.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Shift every location, for input that started at `first_line` of a
    /// larger document.
    pub fn offset_lines(&mut self, first_line: usize) {
        for warning in &mut self.warnings {
            let location = warning.location_mut();
            *location = location.offset_lines(first_line);
        }
        for error in &mut self.errors {
            error.location = error.location.offset_lines(first_line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_lines_shifts_segment_location() {
        let location = SourceLocation::new(2, 5).offset_lines(10);
        assert_eq!(location, SourceLocation::new(11, 5));
    }

    #[test]
    fn recoverable_error_display_includes_severity() {
        let err = RecoverableError::new("bad tag", SourceLocation::new(3, 1));
        assert_eq!(err.to_string(), "error at 3:1: bad tag");
    }

    #[test]
    fn diagnostics_extend_and_count() {
        let mut diagnostics = ParseDiagnostics::new();
        let mut other = ParseDiagnostics::new();
        other.add_warning(ParseWarning::UnclosedCodeFence {
            location: SourceLocation::new(1, 1),
            marker: '`',
        });
        other.add_error(RecoverableError::new("x", SourceLocation::new(4, 2)));
        diagnostics.extend(other);
        assert!(diagnostics.has_warnings());
        assert!(diagnostics.has_errors());
        assert_eq!(diagnostics.count(), 2);

        diagnostics.offset_lines(5);
        assert_eq!(diagnostics.warnings[0].location(), &SourceLocation::new(5, 1));
        assert_eq!(diagnostics.errors[0].location, SourceLocation::new(8, 2));
    }
}
