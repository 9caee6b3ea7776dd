use indexmap::IndexMap;

use crate::{
    condition::{Operand, Operator},
    translate::{
        self, Dialect, NativeFilter, Params, Placeholders, Result, TranslationContext, sql_symbol,
    },
    value::Value,
};

/// `@name` placeholders over a document variable: `e.age > @age`.
pub struct Translator {
    pub variable: String,
    names: Placeholders,
    params: IndexMap<String, Value>,
}

impl Default for Translator {
    fn default() -> Self {
        Self::with_variable("e")
    }
}

impl Translator {
    pub fn with_variable(variable: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            names: Placeholders::default(),
            params: IndexMap::new(),
        }
    }
}

impl TranslationContext for Translator {
    fn dialect(&self) -> Dialect {
        Dialect::AtNamed
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

    fn field(&mut self, name: &str) -> String {
        format!("{}.{name}", self.variable)
    }

    fn symbol(&self, op: Operator) -> &'static str {
        match op {
            Operator::Equal => "==",
            other => sql_symbol(other),
        }
    }

    fn translate_comparison(
        &mut self,
        field: &str,
        op: Operator,
        operand: &Operand,
    ) -> Result<String> {
        // No BETWEEN in this grammar
        match (op, operand) {
            (Operator::Between, Operand::Range(low, high)) => {
                let column = self.field(field);
                let low = self.bind(&format!("{field}_lo"), low.clone());
                let high = self.bind(&format!("{field}_hi"), high.clone());
                Ok(format!("({column} >= {low} AND {column} <= {high})"))
            }
            _ => translate::translate_comparison(self, field, op, operand),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{Condition, Junction};

    #[test]
    fn named_placeholders() {
        let condition = Condition::join(
            Junction::And,
            vec![
                Condition::eq("name", "Ada"),
                Condition::join(
                    Junction::Or,
                    vec![
                        Condition::compare("age", Operator::GreaterThan, 30),
                        Condition::between("age", 1, 5),
                    ],
                ),
            ],
        );
        let filter = translate::run(Translator::default(), &condition, &[]).expect("a filter");
        let NativeFilter::Text { query, params } = filter else {
            panic!("Expected a text filter");
        };
        assert_eq!(
            query,
            "e.name == @name AND (e.age > @age OR (e.age >= @age_lo AND e.age <= @age_hi))"
        );
        assert_eq!(params.named("name"), Some(&Value::from("Ada")));
        assert_eq!(params.named("age_hi"), Some(&Value::from(5)));
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn like_is_native() {
        let condition = Condition::compare("name", Operator::Like, "Ad_%");
        let filter = translate::run(Translator::with_variable("p"), &condition, &[])
            .expect("a filter");
        let NativeFilter::Text { query, params } = filter else {
            panic!("Expected a text filter");
        };
        assert_eq!(query, "p.name LIKE @name");
        assert_eq!(params.named("name"), Some(&Value::from("Ad_%")));
    }
}
