//! Escape-aware line lexer for commented JSON documents.
//!
//! Scans one line at a time, carrying block-comment state and nesting depth
//! across lines. Strings never span lines; an unterminated string is closed
//! at the end of its line and flagged.

/// Scanner position relative to quoting and comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    #[default]
    Code,
    InString,
    /// Just saw a backslash inside a string.
    Escape,
    BlockComment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    String { terminated: bool },
    Punct(char),
    /// Numbers, `true`, `false`, `null`, or stray text.
    Bare,
    LineComment,
    BlockComment,
}

/// A token with byte offsets relative to its line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
    /// Object/array nesting depth at the token. A closing bracket carries
    /// the depth of its opener.
    pub depth: usize,
}

impl Token {
    pub fn is_comment(&self) -> bool {
        matches!(self.kind, TokenKind::LineComment | TokenKind::BlockComment)
    }

    pub fn is_punct(&self, c: char) -> bool {
        self.kind == TokenKind::Punct(c)
    }

    pub fn is_string(&self) -> bool {
        matches!(self.kind, TokenKind::String { .. })
    }

    pub fn text<'a>(&self, line: &'a str) -> &'a str {
        &line[self.start..self.end]
    }
}

/// Classification of a raw source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Carries at least one `"key":` pair.
    Structural,
    /// Nothing but comments.
    Comment,
    /// Braces, blank lines, values continued from a previous line.
    Other,
}

/// One line of the original text with its tokens.
#[derive(Debug, Clone)]
pub struct RawLine<'a> {
    /// Line text without the `\n` terminator (a `\r` stays in place).
    pub text: &'a str,
    pub tokens: Vec<Token>,
    pub kind: LineKind,
}

impl<'a> RawLine<'a> {
    /// Leading whitespace.
    pub fn indent(&self) -> &'a str {
        let trimmed = self.text.trim_start();
        &self.text[..self.text.len() - trimmed.len()]
    }

    /// The trailing comment, if the line ends in one after code.
    pub fn trailing_comment(&self) -> Option<&'a str> {
        let first = self.tokens.iter().position(Token::is_comment)?;
        if self.tokens[first..].iter().all(Token::is_comment) && first > 0 {
            Some(&self.text[self.tokens[first].start..])
        } else {
            None
        }
    }
}

/// Line-at-a-time lexer. Create one per document.
#[derive(Debug, Default)]
pub struct Lexer {
    state: ScanState,
    depth: usize,
}

impl Lexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Tokenize one line, updating the carried state.
    pub fn scan_line(&mut self, line: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut chars = line.char_indices().peekable();
        let mut token_start = 0;

        while let Some((i, c)) = chars.next() {
            match self.state {
                ScanState::BlockComment => {
                    if c == '*' && matches!(chars.peek(), Some(&(_, '/'))) {
                        chars.next();
                        tokens.push(self.token(TokenKind::BlockComment, token_start, i + 2));
                        self.state = ScanState::Code;
                    }
                }
                ScanState::InString => match c {
                    '\\' => self.state = ScanState::Escape,
                    '"' => {
                        tokens.push(self.token(
                            TokenKind::String { terminated: true },
                            token_start,
                            i + 1,
                        ));
                        self.state = ScanState::Code;
                    }
                    _ => {}
                },
                ScanState::Escape => self.state = ScanState::InString,
                ScanState::Code => match c {
                    c if c.is_whitespace() => {}
                    '"' => {
                        token_start = i;
                        self.state = ScanState::InString;
                    }
                    '/' if matches!(chars.peek(), Some(&(_, '/'))) => {
                        tokens.push(self.token(TokenKind::LineComment, i, line.len()));
                        return tokens;
                    }
                    '/' if matches!(chars.peek(), Some(&(_, '*'))) => {
                        chars.next();
                        token_start = i;
                        self.state = ScanState::BlockComment;
                    }
                    '{' | '[' => {
                        tokens.push(self.token(TokenKind::Punct(c), i, i + 1));
                        self.depth += 1;
                    }
                    '}' | ']' => {
                        self.depth = self.depth.saturating_sub(1);
                        tokens.push(self.token(TokenKind::Punct(c), i, i + 1));
                    }
                    ':' | ',' => tokens.push(self.token(TokenKind::Punct(c), i, i + 1)),
                    _ => {
                        let mut end = i + c.len_utf8();
                        while let Some(&(j, n)) = chars.peek() {
                            if !is_bare_char(n) {
                                break;
                            }
                            end = j + n.len_utf8();
                            chars.next();
                        }
                        tokens.push(self.token(TokenKind::Bare, i, end));
                    }
                },
            }
        }

        match self.state {
            ScanState::InString | ScanState::Escape => {
                tokens.push(self.token(
                    TokenKind::String { terminated: false },
                    token_start,
                    line.len(),
                ));
                self.state = ScanState::Code;
            }
            ScanState::BlockComment => {
                tokens.push(self.token(TokenKind::BlockComment, token_start, line.len()));
            }
            ScanState::Code => {}
        }
        tokens
    }

    fn token(&self, kind: TokenKind, start: usize, end: usize) -> Token {
        Token {
            kind,
            start,
            end,
            depth: self.depth,
        }
    }
}

fn is_bare_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '{' | '}' | '[' | ']' | ':' | ',' | '"' | '/')
}

/// Split `text` on `\n` and tokenize every line.
pub fn scan_lines(text: &str) -> Vec<RawLine<'_>> {
    let mut lexer = Lexer::new();
    text.split('\n')
        .map(|line| {
            let tokens = lexer.scan_line(line);
            let kind = classify(&tokens);
            RawLine {
                text: line,
                tokens,
                kind,
            }
        })
        .collect()
}

fn classify(tokens: &[Token]) -> LineKind {
    if tokens.is_empty() {
        return LineKind::Other;
    }
    let code: Vec<&Token> = tokens.iter().filter(|t| !t.is_comment()).collect();
    if code.is_empty() {
        return LineKind::Comment;
    }
    let has_pair = code
        .windows(2)
        .any(|w| w[0].is_string() && w[1].is_punct(':'));
    if has_pair {
        LineKind::Structural
    } else {
        LineKind::Other
    }
}
