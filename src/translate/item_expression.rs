use std::collections::HashMap;

use indexmap::IndexMap;

use crate::{
    condition::{Operand, Operator},
    translate::{
        self, Dialect, Error, ItemFilter, NativeFilter, Placeholders, Result, TranslationContext,
        like_pattern, require_non_empty_list,
    },
    value::Value,
    wildcard::WildcardPolicy,
};

/// Structured filters for item stores: `#name = :name` with a separate alias
///  table (`#name -> name`) and value table (`:name -> value`).
///
/// Every column is aliased, whether or not it is a reserved word. Nested
///  attribute paths alias each segment: `address.city` -> `#address.#city`.
#[derive(Default)]
pub struct Translator {
    aliases: Placeholders,
    by_column: HashMap<String, String>,
    names: IndexMap<String, String>,
    tokens: Placeholders,
    values: IndexMap<String, Value>,
}

impl Translator {
    fn alias(&mut self, column: &str) -> String {
        if let Some(alias) = self.by_column.get(column) {
            return alias.clone();
        }
        let alias = format!("#{}", self.aliases.unique(column));
        self.by_column.insert(column.to_string(), alias.clone());
        self.names.insert(alias.clone(), column.to_string());
        alias
    }
}

impl TranslationContext for Translator {
    fn dialect(&self) -> Dialect {
        Dialect::ItemExpression
    }

    fn bind(&mut self, base: &str, value: Value) -> String {
        let token = format!(":{}", self.tokens.unique(base));
        self.values.insert(token.clone(), value);
        token
    }

    fn finish(mut self, query: String, projection: &[String]) -> NativeFilter {
        let projection = if projection.is_empty() {
            None
        } else {
            let columns = projection
                .iter()
                .map(|column| self.field(column))
                .collect::<Vec<_>>();
            Some(columns.join(", "))
        };
        NativeFilter::Item(ItemFilter {
            filter: query,
            names: self.names,
            values: self.values,
            projection,
        })
    }

    fn field(&mut self, name: &str) -> String {
        name.split('.')
            .map(|segment| self.alias(segment))
            .collect::<Vec<_>>()
            .join(".")
    }

    fn translate_comparison(
        &mut self,
        field: &str,
        op: Operator,
        operand: &Operand,
    ) -> Result<String> {
        match (op, operand) {
            (Operator::In, Operand::Value(value)) => {
                let items = require_non_empty_list(field, value)?;
                let column = self.field(field);
                let tokens = items
                    .iter()
                    .map(|item| self.bind(field, item.clone()))
                    .collect::<Vec<_>>();
                Ok(format!("{column} IN ({})", tokens.join(", ")))
            }
            (Operator::Like, Operand::Value(value)) => {
                let pattern = like_pattern(WildcardPolicy::Native, field, value)?;
                let (function, needle) = match string_function(&pattern) {
                    Some(found) => found,
                    None => return Err(Error::unsupported(op, self.dialect())),
                };
                let column = self.field(field);
                let token = self.bind(field, Value::Str(needle.to_string()));
                Ok(match function {
                    StringFunction::Equals => format!("{column} = {token}"),
                    StringFunction::BeginsWith => format!("begins_with({column}, {token})"),
                    StringFunction::Contains => format!("contains({column}, {token})"),
                })
            }
            _ => translate::translate_comparison(self, field, op, operand),
        }
    }
}

enum StringFunction {
    Equals,
    BeginsWith,
    Contains,
}

/// The store only has prefix and substring functions, so only `abc`, `abc%`
///  and `%abc%` are expressible.
fn string_function(pattern: &str) -> Option<(StringFunction, &str)> {
    let is_plain = |s: &str| !s.contains(['%', '_']);
    if is_plain(pattern) {
        return Some((StringFunction::Equals, pattern));
    }
    if let Some(inner) = pattern
        .strip_prefix('%')
        .and_then(|rest| rest.strip_suffix('%'))
        && !inner.is_empty()
        && is_plain(inner)
    {
        return Some((StringFunction::Contains, inner));
    }
    match pattern.strip_suffix('%') {
        Some(prefix) if !prefix.is_empty() && is_plain(prefix) => {
            Some((StringFunction::BeginsWith, prefix))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;

    fn item(condition: &Condition, projection: &[String]) -> ItemFilter {
        match translate::run(Translator::default(), condition, projection).expect("a filter") {
            NativeFilter::Item(item) => item,
            other => panic!("Expected an item filter, got {other:?}"),
        }
    }

    #[test]
    fn every_column_is_aliased() {
        let condition = Condition::And(vec![
            Condition::eq("status", "open"),
            Condition::compare("size", Operator::GreaterThan, 3),
            Condition::compare("status", Operator::In, vec!["a", "b"]),
        ]);
        let filter = item(&condition, &[]);
        assert_eq!(
            filter.filter,
            "#status = :status AND #size > :size AND #status IN (:status_1, :status_2)"
        );
        assert_eq!(filter.names.get("#status").map(String::as_str), Some("status"));
        assert_eq!(filter.names.get("#size").map(String::as_str), Some("size"));
        assert_eq!(filter.names.len(), 2);
        assert_eq!(filter.values.get(":status_2"), Some(&Value::from("b")));
        assert_eq!(filter.projection, None);
    }

    #[test]
    fn projection_and_nested_paths() {
        let condition = Condition::between("address.zip", 1000, 2000);
        let filter = item(&condition, &["name".into(), "address.city".into()]);
        assert_eq!(
            filter.filter,
            "#address.#zip BETWEEN :address_zip_lo AND :address_zip_hi"
        );
        assert_eq!(
            filter.projection.as_deref(),
            Some("#name, #address.#city")
        );
        assert_eq!(
            filter.names.keys().collect::<Vec<_>>(),
            ["#address", "#zip", "#name", "#city"]
        );
    }

    #[test]
    fn like_maps_to_string_functions() {
        let filter = item(&Condition::compare("name", Operator::Like, "Ad%"), &[]);
        assert_eq!(filter.filter, "begins_with(#name, :name)");
        assert_eq!(filter.values.get(":name"), Some(&Value::from("Ad")));

        let filter = item(&Condition::compare("name", Operator::Like, "%da%"), &[]);
        assert_eq!(filter.filter, "contains(#name, :name)");

        let unsupported = translate::run(
            Translator::default(),
            &Condition::compare("name", Operator::Like, "A_a"),
            &[],
        );
        assert_eq!(
            unsupported,
            Err(Error::unsupported(Operator::Like, Dialect::ItemExpression))
        );
    }
}
