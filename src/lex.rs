/// Splits a method name into words. Both `findByFirstNameAndAge` and
///  `find_by_first_name_and_age` produce the same word sequence; the [Style]
///  records which spelling was used so field names can be rebuilt in kind.
///
/// #Notes
/// Runs of capitals are treated as an acronym: `findByHTTPStatus` yields
///  `find`, `By`, `HTTP`, `Status`. Digits stick to the word they follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Camel,
    Snake,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    // Byte indexes into the source
    start: usize,
    end: usize,
}

impl Token {
    pub fn text<'input>(&self, source: &'input str) -> &'input str {
        &source[self.start..self.end]
    }

    pub fn start(&self) -> usize {
        self.start
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unexpected character at {0}")]
    UnexpectedCharacter(usize),
    #[error("Method name is empty")]
    Empty,
}

/// This type simply holds a reference to the source bytes and an index, so it's
///  cheap to copy, making lookahead in the parser very easy.
#[derive(Clone)]
pub struct Lexer<'input> {
    source: &'input [u8],
    current: usize,
}

impl<'input> Lexer<'input> {
    pub fn new(source: &'input str) -> Self {
        Self {
            source: source.as_bytes(),
            current: 0,
        }
    }

    pub fn style(&self) -> Style {
        if self.source.contains(&b'_') {
            Style::Snake
        } else {
            Style::Camel
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.current >= self.source.len()
    }

    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.source.get(self.current).copied()
    }

    #[inline]
    pub fn peek_at(&self, at: usize) -> Option<u8> {
        self.source.get(self.current + at).copied()
    }

    fn consume_while(&mut self, p: impl Fn(u8) -> bool) {
        while let Some(c) = self.peek()
            && p(c)
        {
            self.current += 1;
        }
    }

    pub fn next_token(&mut self) -> Result<Option<Token>, Error> {
        self.consume_while(|c| c == b'_');
        let Some(c) = self.peek() else {
            return Ok(None);
        };
        if !c.is_ascii_alphanumeric() {
            return Err(Error::UnexpectedCharacter(self.current));
        }

        let start = self.current;
        self.current += 1;
        if c.is_ascii_uppercase() {
            // Acronym: take capitals, but leave the last one if it starts a
            //  lowercase word ("HTTPStatus" -> "HTTP", "Status")
            while let Some(next) = self.peek()
                && next.is_ascii_uppercase()
                && !self.peek_at(1).is_some_and(|c| c.is_ascii_lowercase())
            {
                self.current += 1;
            }
        }
        self.consume_while(|c| c.is_ascii_lowercase() || c.is_ascii_digit());

        Ok(Some(Token {
            start,
            end: self.current,
        }))
    }

    /// Lexes the whole name.
    pub fn tokens(mut self) -> Result<Vec<Token>, Error> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        if tokens.is_empty() {
            return Err(Error::Empty);
        }
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(source: &str) -> Vec<&str> {
        Lexer::new(source)
            .tokens()
            .expect("a valid name")
            .iter()
            .map(|t| t.text(source))
            .collect()
    }

    #[test]
    fn camel_case() {
        assert_eq!(
            words("findByFirstNameAndAgeGreaterThan"),
            ["find", "By", "First", "Name", "And", "Age", "Greater", "Than"]
        );
        assert_eq!(Lexer::new("findByName").style(), Style::Camel);
    }

    #[test]
    fn snake_case() {
        assert_eq!(
            words("find_by_first_name__and_age"),
            ["find", "by", "first", "name", "and", "age"]
        );
        assert_eq!(Lexer::new("find_by_name").style(), Style::Snake);
    }

    #[test]
    fn acronyms_and_digits() {
        assert_eq!(
            words("findByHTTPStatusAndAddress2"),
            ["find", "By", "HTTP", "Status", "And", "Address2"]
        );
        assert_eq!(words("countByURL"), ["count", "By", "URL"]);
    }

    #[test]
    fn errors() {
        assert_eq!(
            Lexer::new("findBy-Name").tokens(),
            Err(Error::UnexpectedCharacter(6))
        );
        assert_eq!(Lexer::new("__").tokens(), Err(Error::Empty));
    }
}
