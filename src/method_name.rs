//! Parses derived-query method names such as `findByNameAndAgeGreaterThan`
//!  into a [PredicatePlan]. A plan depends only on the name, so it can be
//!  built once and instantiated against many argument lists.

use crate::{
    condition::{Condition, Junction, Operand, Operator},
    error::BindingError,
    lex::{self, Lexer, Style, Token},
    translate,
    value::Value,
    wildcard::StringMatch,
};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] lex::Error),
    #[error("Unknown query prefix `{0}`")]
    UnknownPrefix(String),
    #[error("Expected `By` after the query prefix")]
    MissingBy,
    #[error("Empty predicate segment at {0}")]
    EmptySegment(usize),
    #[error("Operator `{0}` is missing a field name")]
    MissingField(&'static str),
}

/// What the query is asked to produce, from the name's leading verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    Find,
    Count,
    Exists,
}

/// The operator keyword trailing a field in a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Equal,
    Not,
    GreaterThan,
    GreaterEqual,
    LessThan,
    LessEqual,
    Between,
    In,
    NotIn,
    Like,
    NotLike,
    Matching(StringMatch),
}

impl Keyword {
    pub fn arity(&self) -> usize {
        match self {
            Keyword::Between => 2,
            _ => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub field: String,
    pub keyword: Keyword,
}

/// OR of ANDs: `findByAOrBAndC` has disjuncts `[[A], [B, C]]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredicatePlan {
    pub subject: Subject,
    pub disjuncts: Vec<Vec<Segment>>,
}

// Longest sequences first so `GreaterThanEqual` wins over `GreaterThan`.
const KEYWORDS: &[(&[&str], Keyword)] = &[
    (&["greater", "than", "equal"], Keyword::GreaterEqual),
    (&["less", "than", "equal"], Keyword::LessEqual),
    (&["greater", "than"], Keyword::GreaterThan),
    (&["less", "than"], Keyword::LessThan),
    (&["not", "in"], Keyword::NotIn),
    (&["not", "like"], Keyword::NotLike),
    (&["starting", "with"], Keyword::Matching(StringMatch::StartsWith)),
    (&["starts", "with"], Keyword::Matching(StringMatch::StartsWith)),
    (&["ending", "with"], Keyword::Matching(StringMatch::EndsWith)),
    (&["ends", "with"], Keyword::Matching(StringMatch::EndsWith)),
    (&["containing"], Keyword::Matching(StringMatch::Contains)),
    (&["contains"], Keyword::Matching(StringMatch::Contains)),
    (&["between"], Keyword::Between),
    (&["after"], Keyword::GreaterThan),
    (&["before"], Keyword::LessThan),
    (&["like"], Keyword::Like),
    (&["in"], Keyword::In),
    (&["not"], Keyword::Not),
    (&["equals"], Keyword::Equal),
    (&["is"], Keyword::Equal),
];

const PREFIXES: &[(&str, Subject)] = &[
    ("find", Subject::Find),
    ("read", Subject::Find),
    ("get", Subject::Find),
    ("query", Subject::Find),
    ("search", Subject::Find),
    ("stream", Subject::Find),
    ("count", Subject::Count),
    ("exists", Subject::Exists),
];

/// Splits a name into lowercase-comparable words, keeping the original text.
pub(crate) fn words(name: &str) -> Result<(Vec<Token>, Style), lex::Error> {
    let lexer = Lexer::new(name);
    let style = lexer.style();
    Ok((lexer.tokens()?, style))
}

pub fn parse(name: &str) -> Result<PredicatePlan, Error> {
    let (tokens, style) = words(name)?;
    let word = |t: &Token| t.text(name);

    let prefix = word(&tokens[0]);
    let subject = PREFIXES
        .iter()
        .find(|(p, _)| prefix.eq_ignore_ascii_case(p))
        .map(|(_, s)| *s)
        .ok_or_else(|| Error::UnknownPrefix(prefix.to_string()))?;

    // Anything between the prefix and `By` names the subject (`findAllPeopleBy`)
    //  and carries no meaning here.
    let by = tokens
        .iter()
        .position(|t| word(t).eq_ignore_ascii_case("by"))
        .ok_or(Error::MissingBy)?;
    let predicate = &tokens[by + 1..];
    if predicate.is_empty() {
        return Err(Error::EmptySegment(name.len()));
    }

    let mut disjuncts = Vec::new();
    for or_group in split_on(predicate, name, "or") {
        let mut segments = Vec::new();
        for and_group in split_on(or_group, name, "and") {
            segments.push(parse_segment(and_group, name, style)?);
        }
        disjuncts.push(segments);
    }

    Ok(PredicatePlan { subject, disjuncts })
}

fn split_on<'t>(tokens: &'t [Token], source: &str, separator: &str) -> Vec<&'t [Token]> {
    tokens
        .split(|t| t.text(source).eq_ignore_ascii_case(separator))
        .collect()
}

fn parse_segment(tokens: &[Token], source: &str, style: Style) -> Result<Segment, Error> {
    if tokens.is_empty() {
        return Err(Error::EmptySegment(source.len()));
    }

    let (field_len, keyword) = KEYWORDS
        .iter()
        .find_map(|(pattern, keyword)| {
            let n = pattern.len();
            let tail = tokens.len().checked_sub(n)?;
            let matches = tokens[tail..]
                .iter()
                .zip(pattern.iter())
                .all(|(t, p)| t.text(source).eq_ignore_ascii_case(p));
            matches.then_some((tail, *keyword))
        })
        .unwrap_or((tokens.len(), Keyword::Equal));

    if field_len == 0 {
        return Err(Error::MissingField(
            KEYWORDS
                .iter()
                .find(|(_, k)| *k == keyword)
                .and_then(|(p, _)| p.first().copied())
                .unwrap_or("?"),
        ));
    }
    Ok(Segment {
        field: field_name(&tokens[..field_len], source, style),
        keyword,
    })
}

/// `First`, `Name` -> `firstName` for camel names, `first_name` for snake.
fn field_name(tokens: &[Token], source: &str, style: Style) -> String {
    match style {
        Style::Snake => tokens
            .iter()
            .map(|t| t.text(source))
            .collect::<Vec<_>>()
            .join("_"),
        Style::Camel => {
            let mut out = String::new();
            for (i, token) in tokens.iter().enumerate() {
                let word = token.text(source);
                if i > 0 {
                    out.push_str(word);
                } else if word.chars().all(|c| !c.is_ascii_lowercase()) {
                    // A leading acronym is lowercased whole: `HTTPStatus` -> `httpStatus`
                    out.push_str(&word.to_ascii_lowercase());
                } else {
                    let mut chars = word.chars();
                    if let Some(c) = chars.next() {
                        out.push(c.to_ascii_lowercase());
                        out.push_str(chars.as_str());
                    }
                }
            }
            out
        }
    }
}

impl PredicatePlan {
    /// Number of arguments an invocation must supply.
    pub fn arity(&self) -> usize {
        self.segments().map(|s| s.keyword.arity()).sum()
    }

    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.disjuncts.iter().flatten()
    }

    /// Builds the condition tree for one invocation, consuming arguments in
    ///  declaration order.
    pub fn instantiate(&self, args: &[Value]) -> crate::Result<Condition> {
        let expected = self.arity();
        if args.len() != expected {
            return Err(BindingError::ArgumentCount {
                expected,
                actual: args.len(),
            }
            .into());
        }

        let mut args = args.iter();
        let mut next = || args.next().cloned().unwrap_or(Value::Null);
        let mut disjuncts = Vec::with_capacity(self.disjuncts.len());
        for segments in &self.disjuncts {
            let mut conjuncts = Vec::with_capacity(segments.len());
            for segment in segments {
                conjuncts.push(segment.instantiate(&mut next)?);
            }
            disjuncts.push(Condition::join(Junction::And, conjuncts));
        }
        Ok(Condition::join(Junction::Or, disjuncts))
    }
}

impl Segment {
    fn instantiate(&self, next: &mut impl FnMut() -> Value) -> crate::Result<Condition> {
        let field = self.field.clone();
        let cmp = |op, value| Condition::Comparison {
            field: field.clone(),
            op,
            operand: Operand::Value(value),
        };

        let condition = match self.keyword {
            Keyword::Equal => cmp(Operator::Equal, next()),
            Keyword::Not => Condition::not(cmp(Operator::Equal, next())),
            Keyword::GreaterThan => cmp(Operator::GreaterThan, next()),
            Keyword::GreaterEqual => cmp(Operator::GreaterEqual, next()),
            Keyword::LessThan => cmp(Operator::LessThan, next()),
            Keyword::LessEqual => cmp(Operator::LessEqual, next()),
            Keyword::Between => {
                let low = next();
                let high = next();
                Condition::Comparison {
                    field: field.clone(),
                    op: Operator::Between,
                    operand: Operand::Range(low, high),
                }
            }
            Keyword::In => cmp(Operator::In, next()),
            Keyword::NotIn => Condition::not(cmp(Operator::In, next())),
            Keyword::Like => cmp(Operator::Like, next()),
            Keyword::NotLike => Condition::not(cmp(Operator::Like, next())),
            Keyword::Matching(kind) => {
                let value = next();
                let wrapped = match &value {
                    Value::Str(s) => kind.wrap(Some(s))?,
                    Value::Null => kind.wrap(None)?,
                    other => {
                        return Err(translate::Error::OperandType {
                            operator: Operator::Like,
                            field: self.field.clone(),
                            expected: "string",
                            found: other.type_name(),
                        }
                        .into());
                    }
                };
                cmp(Operator::Like, Value::Str(wrapped))
            }
        };
        Ok(condition)
    }
}
