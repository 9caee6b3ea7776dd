use std::{
    collections::HashSet,
    fmt::{Display, Formatter},
};

use indexmap::IndexMap;

use crate::{
    condition::{Condition, Junction, Operand, Operator},
    value::Value,
    wildcard::{StringMatch, WildcardPolicy},
};

pub mod aql;
pub mod cql;
pub mod cypher;
pub mod gremlin;
pub mod item_expression;
pub mod partiql;
pub mod relational;
pub mod search;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RelationalBinding {
    /// `:name`
    #[default]
    Named,
    /// `?`
    Positional,
}

/// The native query form of one backend family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum_macros::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Dialect {
    /// `@name` placeholders, name -> value map (AQL-like).
    #[default]
    AtNamed,
    /// `$name` placeholders, name -> value map (Cypher-like).
    DollarNamed,
    /// Driver-bound `?`, ordered value list (CQL-like).
    DriverPositional,
    /// `?` in expression text, ordered value array (PartiQL-like).
    ExpressionPositional,
    /// Structured filter with `#alias` names and `:token` values.
    ItemExpression,
    Relational(RelationalBinding),
    /// Inline `@name` tokens with the values supplied alongside.
    SearchIndex,
    /// Traversal steps referring to script bindings.
    GremlinScript,
}

impl Display for Dialect {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Dialect::AtNamed => write!(f, "at-named"),
            Dialect::DollarNamed => write!(f, "dollar-named"),
            Dialect::DriverPositional => write!(f, "driver-positional"),
            Dialect::ExpressionPositional => write!(f, "expression-positional"),
            Dialect::ItemExpression => write!(f, "item-expression"),
            Dialect::Relational(RelationalBinding::Named) => write!(f, "relational-named"),
            Dialect::Relational(RelationalBinding::Positional) => {
                write!(f, "relational-positional")
            }
            Dialect::SearchIndex => write!(f, "search-index"),
            Dialect::GremlinScript => write!(f, "gremlin-script"),
        }
    }
}

impl Dialect {
    /// Whether this dialect consumes arguments by position rather than name.
    pub fn is_positional(&self) -> bool {
        matches!(
            self,
            Dialect::DriverPositional
                | Dialect::ExpressionPositional
                | Dialect::Relational(RelationalBinding::Positional)
        )
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Operator {operator} is not supported by the {dialect} dialect")]
    UnsupportedOperator { operator: String, dialect: Dialect },
    #[error("{0} match requires a non-null value")]
    NullMatchValue(StringMatch),
    #[error("{operator} on `{field}` expects a {expected} operand, got {found}")]
    OperandType {
        operator: Operator,
        field: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl Error {
    pub fn unsupported(operator: impl Display, dialect: Dialect) -> Self {
        Error::UnsupportedOperator {
            operator: operator.to_string(),
            dialect,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq)]
pub enum Params {
    Named(IndexMap<String, Value>),
    Positional(Vec<Value>),
}

impl Params {
    pub fn len(&self) -> usize {
        match self {
            Params::Named(map) => map.len(),
            Params::Positional(list) => list.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn named(&self, name: &str) -> Option<&Value> {
        match self {
            Params::Named(map) => map.get(name),
            Params::Positional(_) => None,
        }
    }

    /// Replaces `@name` tokens in `text` with the bound value written in
    ///  query-string syntax (see [search::literal]); a token between `/`
    ///  delimiters is spliced in as a bare regex body. The map is
    ///  authoritative: tokens without an entry are left as they are, and the
    ///  map is still what gets sent alongside the text.
    pub fn render_inline(&self, text: &str) -> String {
        let Params::Named(map) = self else {
            return text.to_string();
        };
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(at) = rest.find('@') {
            out.push_str(&rest[..at]);
            let after = &rest[at + 1..];
            let len = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            let name = &after[..len];
            let in_regex = out.ends_with('/') && after[len..].starts_with('/');
            match map.get(name) {
                Some(value) if len > 0 => out.push_str(&search::literal(value, in_regex)),
                _ => {
                    out.push('@');
                    out.push_str(name);
                }
            }
            rest = &after[len..];
        }
        out.push_str(rest);
        out
    }
}

/// A structured filter for item stores. Every column is referenced through an
///  alias so that reserved words never collide with the expression grammar.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemFilter {
    pub filter: String,
    pub names: IndexMap<String, String>,
    pub values: IndexMap<String, Value>,
    /// `None` selects every attribute.
    pub projection: Option<String>,
}

/// This is the output type of translation: a [Condition] goes in, the
///  backend's native filter comes out.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeFilter {
    Text { query: String, params: Params },
    Item(ItemFilter),
}

impl NativeFilter {
    /// The filter text, used for logging and error context.
    pub fn query_text(&self) -> &str {
        match self {
            NativeFilter::Text { query, .. } => query,
            NativeFilter::Item(item) => &item.filter,
        }
    }
}

impl Display for NativeFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            NativeFilter::Text { query, params } => {
                write!(f, "{query}")?;
                match params {
                    Params::Named(map) => {
                        for (name, value) in map {
                            write!(f, " [{name}={value}]")?;
                        }
                    }
                    Params::Positional(list) => {
                        for (i, value) in list.iter().enumerate() {
                            write!(f, " [{i}={value}]")?;
                        }
                    }
                }
                Ok(())
            }
            NativeFilter::Item(item) => {
                write!(f, "{}", item.filter)?;
                if let Some(projection) = &item.projection {
                    write!(f, " PROJECT {projection}")?;
                }
                for (alias, column) in &item.names {
                    write!(f, " [{alias}={column}]")?;
                }
                for (token, value) in &item.values {
                    write!(f, " [{token}={value}]")?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Parenthesize {
    #[default]
    Yes,
    No,
}

impl Parenthesize {
    pub fn wrap(&self, inner: String) -> String {
        match self {
            Parenthesize::Yes => format!("({inner})"),
            Parenthesize::No => inner,
        }
    }
}

/// Hands out placeholder names derived from field names. A name is never
///  handed out twice within one translation: `age`, `age_1`, `age_2`...
#[derive(Debug, Default)]
pub struct Placeholders {
    used: HashSet<String>,
}

impl Placeholders {
    pub fn unique(&mut self, base: &str) -> String {
        let base = sanitize(base);
        if self.used.insert(base.clone()) {
            return base;
        }
        let mut n = 1;
        loop {
            let candidate = format!("{base}_{n}");
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Placeholder names must be identifiers: `address.city` becomes `address_city`.
pub fn sanitize(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, 'p');
    }
    out
}

/// This trait lets each dialect control translation. A new dialect only has to
///  say how values are bound and how columns are referenced; everything else
///  falls back to the defaults below, which produce SQL-shaped text:
///
/// ```rust
/// # use repo_query::{condition::{Condition, Operator}, translate::{self, Dialect, NativeFilter, Params, TranslationContext}, value::Value};
/// #[derive(Default)]
/// struct Numbered {
///     values: Vec<Value>,
/// }
///
/// impl TranslationContext for Numbered {
///     fn dialect(&self) -> Dialect {
///         Dialect::ExpressionPositional
///     }
///
///     fn bind(&mut self, _base: &str, value: Value) -> String {
///         self.values.push(value);
///         format!("${}", self.values.len())
///     }
///
///     fn finish(self, query: String, _projection: &[String]) -> NativeFilter {
///         NativeFilter::Text { query, params: Params::Positional(self.values) }
///     }
/// }
///
/// let filter = translate::run(
///     Numbered::default(),
///     &Condition::compare("age", Operator::GreaterThan, 30),
///     &[],
/// ).unwrap();
/// assert_eq!(filter.query_text(), "age > $1");
/// ```
pub trait TranslationContext {
    fn dialect(&self) -> Dialect;

    /// Registers a bound value and returns the text that refers to it.
    ///   `base`: a name hint derived from the field
    fn bind(&mut self, base: &str, value: Value) -> String;

    /// Wraps up a translation into the dialect's native filter.
    fn finish(self, query: String, projection: &[String]) -> NativeFilter
    where
        Self: Sized;

    fn wildcard(&self) -> WildcardPolicy {
        WildcardPolicy::Native
    }

    fn supports(&self, _op: Operator) -> bool {
        true
    }

    fn supports_junction(&self, _junction: Junction) -> bool {
        true
    }

    fn supports_negation(&self) -> bool {
        true
    }

    /// Called to render a column reference.
    fn field(&mut self, name: &str) -> String {
        name.to_string()
    }

    fn symbol(&self, op: Operator) -> &'static str {
        sql_symbol(op)
    }

    /// Called to translate a single comparison.
    fn translate_comparison(
        &mut self,
        field: &str,
        op: Operator,
        operand: &Operand,
    ) -> Result<String>
    where
        Self: Sized,
    {
        translate_comparison(self, field, op, operand)
    }

    fn join(&self, junction: Junction, parts: Vec<String>, paren: Parenthesize) -> String {
        paren.wrap(parts.join(&format!(" {junction} ")))
    }

    fn negate(&self, inner: String) -> String {
        format!("NOT ({inner})")
    }
}

pub fn sql_symbol(op: Operator) -> &'static str {
    match op {
        Operator::Equal => "=",
        Operator::Like => "LIKE",
        Operator::GreaterThan => ">",
        Operator::GreaterEqual => ">=",
        Operator::LessThan => "<",
        Operator::LessEqual => "<=",
        Operator::Between => "BETWEEN",
        Operator::In => "IN",
    }
}

/// Translates `condition` with `cx` and finishes it into a [NativeFilter].
pub fn run<C: TranslationContext>(
    mut cx: C,
    condition: &Condition,
    projection: &[String],
) -> Result<NativeFilter> {
    let query = translate_condition(condition, &mut cx, Parenthesize::No)?;
    Ok(cx.finish(query, projection))
}

/// Depth-first walk of the condition tree. Nested joins are parenthesized,
///  the root is not.
pub fn translate_condition<C: TranslationContext>(
    source: &Condition,
    cx: &mut C,
    paren: Parenthesize,
) -> Result<String> {
    match source {
        Condition::Comparison { field, op, operand } => {
            if !cx.supports(*op) {
                return Err(Error::unsupported(op, cx.dialect()));
            }
            cx.translate_comparison(field, *op, operand)
        }
        Condition::And(children) => translate_junction(Junction::And, children, cx, paren),
        Condition::Or(children) => translate_junction(Junction::Or, children, cx, paren),
        Condition::Not(child) => {
            if !cx.supports_negation() {
                return Err(Error::unsupported("NOT", cx.dialect()));
            }
            let inner = translate_condition(child, cx, Parenthesize::No)?;
            Ok(cx.negate(inner))
        }
    }
}

fn translate_junction<C: TranslationContext>(
    junction: Junction,
    children: &[Condition],
    cx: &mut C,
    paren: Parenthesize,
) -> Result<String> {
    if !cx.supports_junction(junction) {
        return Err(Error::unsupported(junction, cx.dialect()));
    }
    let parts = children
        .iter()
        .map(|child| translate_condition(child, cx, Parenthesize::Yes))
        .collect::<Result<Vec<_>>>()?;
    Ok(cx.join(junction, parts, paren))
}

/// Default SQL-shaped comparison: `field <op> <placeholder>`.
pub fn translate_comparison<C: TranslationContext>(
    cx: &mut C,
    field: &str,
    op: Operator,
    operand: &Operand,
) -> Result<String> {
    let column = cx.field(field);
    match (op, operand) {
        (Operator::Between, Operand::Range(low, high)) => {
            let low = cx.bind(&format!("{field}_lo"), low.clone());
            let high = cx.bind(&format!("{field}_hi"), high.clone());
            Ok(format!("{column} BETWEEN {low} AND {high}"))
        }
        (Operator::Like, Operand::Value(value)) => {
            let pattern = like_pattern(cx.wildcard(), field, value)?;
            let placeholder = cx.bind(field, Value::Str(pattern));
            Ok(format!("{column} {} {placeholder}", cx.symbol(op)))
        }
        (Operator::In, Operand::Value(value)) => {
            require_list(field, value)?;
            let placeholder = cx.bind(field, value.clone());
            Ok(format!("{column} IN {placeholder}"))
        }
        (Operator::Between, Operand::Value(value)) => Err(operand_type(op, field, "range", value)),
        (_, Operand::Range(..)) => Err(Error::OperandType {
            operator: op,
            field: field.to_string(),
            expected: "single value",
            found: "range",
        }),
        (op, Operand::Value(value)) => {
            let placeholder = cx.bind(field, value.clone());
            Ok(format!("{column} {} {placeholder}", cx.symbol(op)))
        }
    }
}

/// Runs a LIKE operand through the dialect's wildcard policy. Null is allowed
///  and translated according to the policy.
pub fn like_pattern(policy: WildcardPolicy, field: &str, value: &Value) -> Result<String> {
    match value {
        Value::Str(s) => Ok(policy.translate(Some(s))),
        Value::Null => Ok(policy.translate(None)),
        other => Err(operand_type(Operator::Like, field, "string", other)),
    }
}

pub fn require_list<'v>(field: &str, value: &'v Value) -> Result<&'v [Value]> {
    value
        .as_list()
        .ok_or_else(|| operand_type(Operator::In, field, "list", value))
}

/// Like [require_list], for dialects that expand the list in the query text
///  where `IN ()` would be a syntax error.
pub fn require_non_empty_list<'v>(field: &str, value: &'v Value) -> Result<&'v [Value]> {
    let items = require_list(field, value)?;
    if items.is_empty() {
        return Err(Error::OperandType {
            operator: Operator::In,
            field: field.to_string(),
            expected: "non-empty list",
            found: "empty list",
        });
    }
    Ok(items)
}

pub(crate) fn operand_type(
    operator: Operator,
    field: &str,
    expected: &'static str,
    found: &Value,
) -> Error {
    Error::OperandType {
        operator,
        field: field.to_string(),
        expected,
        found: found.type_name(),
    }
}

/// Translates `condition` into `dialect`'s native filter. `projection` is only
///  meaningful to dialects with a projection clause.
pub fn translate(
    dialect: Dialect,
    condition: &Condition,
    projection: &[String],
) -> Result<NativeFilter> {
    match dialect {
        Dialect::AtNamed => run(aql::Translator::default(), condition, projection),
        Dialect::DollarNamed => run(cypher::Translator::default(), condition, projection),
        Dialect::DriverPositional => run(cql::Translator::default(), condition, projection),
        Dialect::ExpressionPositional => {
            run(partiql::Translator::default(), condition, projection)
        }
        Dialect::ItemExpression => {
            run(item_expression::Translator::default(), condition, projection)
        }
        Dialect::Relational(binding) => {
            run(relational::Translator::new(binding), condition, projection)
        }
        Dialect::SearchIndex => run(search::Translator::default(), condition, projection),
        Dialect::GremlinScript => run(gremlin::Translator::default(), condition, projection),
    }
}
