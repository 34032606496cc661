/*! Recursive-descent parser that converts patterns into an [`Ast`].

The grammar accepted by the parser is:

```text
alternation := sequence ('|' sequence)*
sequence    := (atom quantifier?)*
atom        := literal | '.' | '^' | '$' | '\' escape | '[' class ']'
             | '(' group ')'
quantifier  := '*' | '+' | '?' | '{' m '}' | '{' m ',' '}' | '{' m ',' n '}'
```

The parser looks ahead at most three characters, which is what octal
escapes (`\101`) require. Positions reported in errors are character
offsets within the pattern.
 */

use thiserror::Error;

use crate::re::ast::Ast;
use crate::re::charclass::{CharClass, RangeSet};

/// Maximum number of capture groups in a pattern.
pub const MAX_CAPTURES: u32 = 255;

/// Error returned when a pattern is malformed.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[error("{kind} at position {position}")]
pub struct ParseError {
    kind: ParseErrorKind,
    position: usize,
}

impl ParseError {
    fn new(kind: ParseErrorKind, position: usize) -> Self {
        Self { kind, position }
    }

    /// The kind of error.
    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }

    /// Offset, in characters, of the place where the error was detected.
    pub fn position(&self) -> usize {
        self.position
    }
}

/// Each of the errors that can be found while parsing a pattern.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("unexpected `{0}`, a literal was expected")]
    UnexpectedMetaChar(char),

    #[error("unmatched `(`")]
    UnmatchedOpenParen,

    #[error("unmatched `)`")]
    UnmatchedCloseParen,

    #[error("unknown group syntax, only `(?:` is supported")]
    UnknownGroupSyntax,

    #[error("trailing `\\` in pattern")]
    DanglingBackslash,

    #[error("unknown escape sequence `\\{0}`")]
    UnknownEscape(char),

    #[error("malformed octal escape")]
    MalformedOctal,

    #[error("back-references are not allowed in character classes")]
    BackReferenceInClass,

    #[error("back-reference to group {0} from inside the group itself")]
    BackReferenceToOpenGroup(u32),

    #[error("malformed repetition")]
    MalformedRepetition,

    #[error("invalid repetition range {{{0},{1}}}")]
    InvalidRepetitionRange(u32, u32),

    #[error("unterminated character class")]
    UnterminatedClass,

    #[error("invalid character class range `{0}-{1}`")]
    ReversedClassRange(char, char),

    #[error("too many capture groups, the maximum is {0}")]
    TooManyCaptures(u32),
}

/// A pattern parser.
pub struct Parser {
    max_captures: u32,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self { max_captures: MAX_CAPTURES }
    }

    /// Sets the maximum number of capture groups allowed in a pattern.
    /// Patterns with more groups produce
    /// [`ParseErrorKind::TooManyCaptures`].
    pub fn max_captures(mut self, n: u32) -> Self {
        self.max_captures = n;
        self
    }

    /// Parses the pattern and returns its AST.
    pub fn parse(&self, pattern: &str) -> Result<Ast, ParseError> {
        let mut state = State {
            chars: pattern.chars().collect(),
            pos: 0,
            captures: 0,
            open_groups: Vec::new(),
            max_captures: self.max_captures,
        };

        let ast = state.parse_alternation()?;

        // `parse_alternation` only stops at the end of the pattern or at a
        // closing parenthesis. In the latter case it doesn't have a
        // matching opening one.
        match state.peek() {
            None => Ok(ast),
            Some(_) => Err(ParseError::new(
                ParseErrorKind::UnmatchedCloseParen,
                state.pos,
            )),
        }
    }
}

/// Result of parsing an escape sequence.
enum Escape {
    Char(char),
    BackReference(u32),
}

struct State {
    chars: Vec<char>,
    pos: usize,
    /// Number of capture groups opened so far.
    captures: u32,
    /// Indexes of the capture groups that enclose the current position.
    open_groups: Vec<u32>,
    max_captures: u32,
}

impl State {
    #[inline]
    fn peek(&self) -> Option<char> {
        self.peek_nth(0)
    }

    #[inline]
    fn peek_nth(&self, n: usize) -> Option<char> {
        self.chars.get(self.pos + n).copied()
    }

    #[inline]
    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error<T>(&self, kind: ParseErrorKind) -> Result<T, ParseError> {
        Err(ParseError::new(kind, self.pos))
    }

    fn parse_alternation(&mut self) -> Result<Ast, ParseError> {
        let mut options = vec![self.parse_sequence()?];

        while self.eat('|') {
            options.push(self.parse_sequence()?);
        }

        if options.len() == 1 {
            Ok(options.swap_remove(0))
        } else {
            Ok(Ast::Alternation(options))
        }
    }

    fn parse_sequence(&mut self) -> Result<Ast, ParseError> {
        let mut items = Vec::new();

        while let Some(c) = self.peek() {
            let atom = match c {
                '|' | ')' => break,
                '^' => {
                    self.pos += 1;
                    Ast::AssertStart
                }
                '$' => {
                    self.pos += 1;
                    Ast::AssertEnd
                }
                '.' => {
                    self.pos += 1;
                    Ast::AnyExceptNewline
                }
                '\\' => match self.parse_escape(false)? {
                    Escape::Char(c) => Ast::Literal(c.to_string()),
                    Escape::BackReference(index) => Ast::BackReference(index),
                },
                '[' => self.parse_class()?,
                '(' => self.parse_group()?,
                '*' | '+' | '?' | '{' | '}' | ']' => {
                    return self.error(ParseErrorKind::UnexpectedMetaChar(c))
                }
                c => {
                    self.pos += 1;
                    Ast::Literal(c.to_string())
                }
            };
            items.push(self.parse_quantifier(atom)?);
        }

        if items.len() == 1 {
            Ok(items.swap_remove(0))
        } else {
            Ok(Ast::Sequence(items))
        }
    }

    fn parse_group(&mut self) -> Result<Ast, ParseError> {
        let start = self.pos;
        self.pos += 1; // skip `(`

        let index = if self.eat('?') {
            if !self.eat(':') {
                return self.error(ParseErrorKind::UnknownGroupSyntax);
            }
            None
        } else {
            if self.captures == self.max_captures {
                return Err(ParseError::new(
                    ParseErrorKind::TooManyCaptures(self.max_captures),
                    start,
                ));
            }
            self.captures += 1;
            self.open_groups.push(self.captures);
            Some(self.captures)
        };

        let node = self.parse_alternation()?;

        if !self.eat(')') {
            return Err(ParseError::new(
                ParseErrorKind::UnmatchedOpenParen,
                start,
            ));
        }

        match index {
            Some(index) => {
                self.open_groups.pop();
                Ok(Ast::capture(index, node))
            }
            None => Ok(node),
        }
    }

    fn parse_quantifier(&mut self, atom: Ast) -> Result<Ast, ParseError> {
        let (min, max) = match self.peek() {
            Some('*') => (0, None),
            Some('+') => (1, None),
            Some('?') => (0, Some(1)),
            Some('{') => return self.parse_repetition(atom),
            _ => return Ok(atom),
        };
        self.pos += 1;
        Ok(Ast::repeat(atom, min, max))
    }

    /// Parses `{m}`, `{m,}` and `{m,n}`.
    fn parse_repetition(&mut self, atom: Ast) -> Result<Ast, ParseError> {
        let start = self.pos;
        self.pos += 1; // skip `{`

        let malformed =
            || Err(ParseError::new(ParseErrorKind::MalformedRepetition, start));

        let min = match self.parse_int() {
            Some(min) => min,
            None => return malformed(),
        };

        let max = if self.eat(',') {
            if self.peek() == Some('}') {
                None
            } else {
                match self.parse_int() {
                    Some(max) => Some(max),
                    None => return malformed(),
                }
            }
        } else {
            Some(min)
        };

        if !self.eat('}') {
            return malformed();
        }

        if let Some(max) = max {
            if min > max {
                return Err(ParseError::new(
                    ParseErrorKind::InvalidRepetitionRange(min, max),
                    start,
                ));
            }
        }

        Ok(Ast::repeat(atom, min, max))
    }

    /// Parses a decimal integer. Returns [`None`] if there are no digits at
    /// the current position or if the number doesn't fit in a `u32`.
    fn parse_int(&mut self) -> Option<u32> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        if start == self.pos {
            return None;
        }
        self.chars[start..self.pos].iter().collect::<String>().parse().ok()
    }

    fn parse_escape(&mut self, in_class: bool) -> Result<Escape, ParseError> {
        let start = self.pos;
        self.pos += 1; // skip `\`

        let c = match self.bump() {
            Some(c) => c,
            None => {
                return Err(ParseError::new(
                    ParseErrorKind::DanglingBackslash,
                    start,
                ))
            }
        };

        let escaped = match c {
            ' ' | '!' | '"' | '#' | '$' | '%' | '&' | '\'' | '(' | ')'
            | '*' | '+' | ',' | '-' | '.' | '/' | ':' | ';' | '<' | '='
            | '>' | '?' | '@' | '[' | '\\' | ']' | '^' | '_' | '`' | '{'
            | '|' | '}' | '~' => c,
            't' => '\t',
            'n' => '\n',
            'r' => '\r',
            'f' => '\x0C',
            'v' => '\x0B',
            '0'..='9' => return self.parse_numeric_escape(c, start, in_class),
            c => {
                return Err(ParseError::new(
                    ParseErrorKind::UnknownEscape(c),
                    start,
                ))
            }
        };

        Ok(Escape::Char(escaped))
    }

    /// Parses the escape sequences that start with a digit: `\0`, the
    /// back-references `\1` to `\9`, and octal escapes like `\101`. The
    /// first digit has been consumed already.
    fn parse_numeric_escape(
        &mut self,
        first: char,
        start: usize,
        in_class: bool,
    ) -> Result<Escape, ParseError> {
        let err = |kind| Err(ParseError::new(kind, start));

        if !matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            if first == '0' {
                return Ok(Escape::Char('\0'));
            }
            if in_class {
                return err(ParseErrorKind::BackReferenceInClass);
            }
            let index = first as u32 - '0' as u32;
            if self.open_groups.contains(&index) {
                return err(ParseErrorKind::BackReferenceToOpenGroup(index));
            }
            return Ok(Escape::BackReference(index));
        }

        let digits = [Some(first), self.peek_nth(0), self.peek_nth(1)];
        let mut value = 0_u32;

        for digit in digits {
            match digit.and_then(|c| c.to_digit(8)) {
                Some(d) => value = value * 8 + d,
                None => return err(ParseErrorKind::MalformedOctal),
            }
        }

        if value > 0o377 {
            return err(ParseErrorKind::MalformedOctal);
        }

        self.pos += 2;

        // Values up to 0o377 are always valid code points.
        match char::from_u32(value) {
            Some(c) => Ok(Escape::Char(c)),
            None => err(ParseErrorKind::MalformedOctal),
        }
    }

    /// Parses `[...]` and `[^...]`.
    fn parse_class(&mut self) -> Result<Ast, ParseError> {
        let start = self.pos;
        self.pos += 1; // skip `[`

        let negated = self.eat('^');
        let mut members = Vec::new();

        let unterminated =
            || Err(ParseError::new(ParseErrorKind::UnterminatedClass, start));

        // A `]` or `-` at the beginning of the class is a literal.
        if let Some(c @ (']' | '-')) = self.peek() {
            self.pos += 1;
            members.push(RangeSet::from_chars(c, c));
        }

        loop {
            let from = match self.peek() {
                None => return unterminated(),
                Some(']') => {
                    self.pos += 1;
                    break;
                }
                Some(_) => self.parse_class_char()?,
            };

            if self.peek() != Some('-') {
                members.push(RangeSet::from_chars(from, from));
                continue;
            }

            match self.peek_nth(1) {
                None => return unterminated(),
                // A `-` right before the closing `]` is a literal.
                Some(']') => {
                    self.pos += 2;
                    members.push(RangeSet::from_chars(from, from));
                    members.push(RangeSet::from_chars('-', '-'));
                    break;
                }
                Some(_) => {
                    self.pos += 1;
                    let range_start = self.pos;
                    let to = self.parse_class_char()?;
                    if to < from {
                        return Err(ParseError::new(
                            ParseErrorKind::ReversedClassRange(from, to),
                            range_start,
                        ));
                    }
                    members.push(RangeSet::from_chars(from, to));
                }
            }
        }

        let mut class =
            CharClass::merge(members.into_iter().map(CharClass::Ranges))
                .narrow_to_ascii();

        if negated {
            class = class.negate();
        }

        Ok(Ast::CharacterClass(class))
    }

    /// Parses a single character inside a class, which can be escaped.
    fn parse_class_char(&mut self) -> Result<char, ParseError> {
        match self.peek() {
            Some('\\') => match self.parse_escape(true)? {
                Escape::Char(c) => Ok(c),
                // `parse_escape` never returns back-references in classes.
                Escape::BackReference(_) => {
                    self.error(ParseErrorKind::BackReferenceInClass)
                }
            },
            Some(c) => {
                self.pos += 1;
                Ok(c)
            }
            None => self.error(ParseErrorKind::UnterminatedClass),
        }
    }
}
