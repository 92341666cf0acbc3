/// Positional patterns used by localized composites, e.g. `"{1} de {0}"`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("unclosed brace")]
    UnclosedBrace,
    #[error("unmatched closing brace")]
    UnmatchedClose,
    #[error("nested braces are not allowed")]
    NestedBrace,
    #[error("empty braces")]
    EmptyPlaceholder,
    #[error("unexpected '{0}' in placeholder")]
    UnexpectedChar(char),
    #[error("bad placeholder '{0}'")]
    BadIndex(String),
    #[error("uses {arity} parts but the entry has {parts}")]
    TooFewParts { arity: usize, parts: usize },
}

/// A segment of a parsed pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSegment {
    /// Literal text, emitted as-is.
    Literal(String),
    /// Placeholder for the part at this index: `{0}`.
    Slot(usize),
}

/// A parsed pattern — a sequence of segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub segments: Vec<PatternSegment>,
}

impl Pattern {
    /// Parse a pattern string.
    ///
    /// Syntax:
    /// - `{n}` → `Slot(n)`
    /// - `{{` / `}}` → literal `{` / `}`
    /// - Everything else → `Literal`
    pub fn parse(input: &str) -> Result<Pattern, PatternError> {
        let mut segments = Vec::new();
        let mut literal_buf = String::new();
        let mut chars = input.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal_buf.push('{');
                }
                '{' => {
                    if !literal_buf.is_empty() {
                        segments.push(PatternSegment::Literal(std::mem::take(&mut literal_buf)));
                    }
                    let mut digits = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(d) if d.is_ascii_digit() => digits.push(d),
                            Some('{') => return Err(PatternError::NestedBrace),
                            Some(other) => return Err(PatternError::UnexpectedChar(other)),
                            None => return Err(PatternError::UnclosedBrace),
                        }
                    }
                    if digits.is_empty() {
                        return Err(PatternError::EmptyPlaceholder);
                    }
                    let index = digits
                        .parse::<usize>()
                        .map_err(|_| PatternError::BadIndex(digits))?;
                    segments.push(PatternSegment::Slot(index));
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal_buf.push('}');
                }
                '}' => return Err(PatternError::UnmatchedClose),
                other => literal_buf.push(other),
            }
        }

        if !literal_buf.is_empty() {
            segments.push(PatternSegment::Literal(literal_buf));
        }

        Ok(Pattern { segments })
    }

    /// Number of parts this pattern needs: one more than its highest slot.
    pub fn arity(&self) -> usize {
        self.segments
            .iter()
            .filter_map(|s| match s {
                PatternSegment::Slot(i) => Some(i + 1),
                PatternSegment::Literal(_) => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// Substitute `parts` into the pattern. Parts not named by any slot are
    /// dropped; a slot past the end of `parts` is an error.
    pub fn render(&self, parts: &[String]) -> Result<String, PatternError> {
        self.check_parts(parts.len())?;
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                PatternSegment::Literal(text) => out.push_str(text),
                PatternSegment::Slot(i) => {
                    out.push_str(&parts[*i]);
                }
            }
        }
        Ok(out)
    }

    /// A pattern may ignore parts, but every slot needs one.
    pub fn check_parts(&self, parts: usize) -> Result<(), PatternError> {
        let arity = self.arity();
        if arity > parts {
            return Err(PatternError::TooFewParts { arity, parts });
        }
        Ok(())
    }
}
