use indexmap::IndexMap;

use crate::{
    condition::{Operand, Operator},
    translate::{
        Dialect, NativeFilter, Params, Placeholders, Result, TranslationContext, like_pattern,
        operand_type, require_non_empty_list,
    },
    value::Value,
    wildcard::WildcardPolicy,
};

/// Query-string syntax for search indexes: `name:@name AND age:{@age TO *}`.
///
/// The `@name` tokens stay in the text and the values travel in the map; see
///  [Params::render_inline] for ports that need the values spliced in.
#[derive(Default)]
pub struct Translator {
    names: Placeholders,
    params: IndexMap<String, Value>,
}

impl TranslationContext for Translator {
    fn dialect(&self) -> Dialect {
        Dialect::SearchIndex
    }

    fn bind(&mut self, base: &str, value: Value) -> String {
        let name = self.names.unique(base);
        self.params.insert(name.clone(), value);
        format!("@{name}")
    }

    fn finish(self, query: String, _projection: &[String]) -> NativeFilter {
        NativeFilter::Text {
            query,
            params: Params::Named(self.params),
        }
    }

    fn wildcard(&self) -> WildcardPolicy {
        WildcardPolicy::Unanchored
    }

    fn translate_comparison(
        &mut self,
        field: &str,
        op: Operator,
        operand: &Operand,
    ) -> Result<String> {
        Ok(match (op, operand) {
            (Operator::Between, Operand::Range(low, high)) => {
                let low = self.bind(&format!("{field}_lo"), low.clone());
                let high = self.bind(&format!("{field}_hi"), high.clone());
                format!("{field}:[{low} TO {high}]")
            }
            (Operator::Between, Operand::Value(value)) => {
                return Err(operand_type(op, field, "range", value));
            }
            (_, Operand::Range(low, _)) => {
                return Err(operand_type(op, field, "single value", low));
            }
            (Operator::Equal, Operand::Value(value)) => {
                format!("{field}:{}", self.bind(field, value.clone()))
            }
            (Operator::GreaterThan, Operand::Value(value)) => {
                format!("{field}:{{{} TO *}}", self.bind(field, value.clone()))
            }
            (Operator::GreaterEqual, Operand::Value(value)) => {
                format!("{field}:[{} TO *]", self.bind(field, value.clone()))
            }
            (Operator::LessThan, Operand::Value(value)) => {
                format!("{field}:{{* TO {}}}", self.bind(field, value.clone()))
            }
            (Operator::LessEqual, Operand::Value(value)) => {
                format!("{field}:[* TO {}]", self.bind(field, value.clone()))
            }
            (Operator::In, Operand::Value(value)) => {
                let tokens = require_non_empty_list(field, value)?
                    .iter()
                    .map(|item| self.bind(field, item.clone()))
                    .collect::<Vec<_>>();
                format!("{field}:({})", tokens.join(" OR "))
            }
            (Operator::Like, Operand::Value(value)) => {
                let pattern = like_pattern(self.wildcard(), field, value)?;
                format!("{field}:/{}/", self.bind(field, Value::Str(pattern)))
            }
        })
    }
}

/// Writes a value the way query-string syntax expects it. Strings and dates
///  become double-quoted phrases with `"` and `\` escaped; a regex body is
///  written bare with its `/` delimiter escaped.
pub fn literal(value: &Value, regex: bool) -> String {
    match value {
        Value::Str(s) if regex => s.replace('/', r"\/"),
        Value::Str(s) => quote(s),
        Value::Date(d) => quote(&d.format("%Y-%m-%d").to_string()),
        Value::List(items) => {
            let items = items
                .iter()
                .map(|item| literal(item, false))
                .collect::<Vec<_>>();
            format!("({})", items.join(" OR "))
        }
        Value::Map(_) => quote(&value.to_string()),
        Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_) => value.to_string(),
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{condition::Condition, translate};

    fn text(condition: &Condition) -> (String, Params) {
        match translate::run(Translator::default(), condition, &[]).expect("a filter") {
            NativeFilter::Text { query, params } => (query, params),
            other => panic!("Expected a text filter, got {other:?}"),
        }
    }

    #[test]
    fn ranges() {
        let (query, _) = text(&Condition::And(vec![
            Condition::compare("age", Operator::GreaterThan, 18),
            Condition::compare("age", Operator::LessEqual, 65),
            Condition::between("score", 1, 5),
        ]));
        assert_eq!(
            query,
            "age:{@age TO *} AND age:[* TO @age_1] AND score:[@score_lo TO @score_hi]"
        );
    }

    #[test]
    fn like_and_in() {
        let (query, params) = text(&Condition::Or(vec![
            Condition::compare("name", Operator::Like, "%Ota%"),
            Condition::compare("tag", Operator::In, vec!["a", "b"]),
        ]));
        assert_eq!(query, "name:/@name/ OR tag:(@tag OR @tag_1)");
        assert_eq!(params.named("name"), Some(&Value::from(".*Ota.*")));
        assert_eq!(
            params.render_inline(&query),
            r#"name:/.*Ota.*/ OR tag:("a" OR "b")"#
        );
    }

    #[test]
    fn inline_literals_use_query_string_quoting() {
        let (query, params) = text(&Condition::And(vec![
            Condition::eq("path", r"C:\dir\"),
            Condition::compare("name", Operator::Like, "%Ota%"),
            Condition::eq("city", "Oslo"),
            Condition::eq("age", 36),
        ]));
        assert_eq!(
            params.render_inline(&query),
            r#"path:"C:\\dir\\" AND name:/.*Ota.*/ AND city:"Oslo" AND age:36"#
        );
        assert_eq!(literal(&Value::from(r#"say "hi""#), false), r#""say \"hi\"""#);
        assert_eq!(literal(&Value::from("a/b"), true), r"a\/b");
    }

    #[test]
    fn empty_in_list_is_rejected() {
        let condition = Condition::compare("tag", Operator::In, Vec::<&str>::new());
        assert!(matches!(
            translate::run(Translator::default(), &condition, &[]),
            Err(translate::Error::OperandType {
                expected: "non-empty list",
                ..
            })
        ));
    }
}
