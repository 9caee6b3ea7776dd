use crate::{
    condition::{Junction, Operand, Operator},
    translate::{self, Dialect, NativeFilter, Params, Result, TranslationContext},
    value::Value,
};

/// Driver-bound `?` markers with an ordered value list. The grammar has no OR
///  and no NOT, and ranges are spelled as two bounds.
#[derive(Default)]
pub struct Translator {
    values: Vec<Value>,
}

impl TranslationContext for Translator {
    fn dialect(&self) -> Dialect {
        Dialect::DriverPositional
    }

    fn bind(&mut self, _base: &str, value: Value) -> String {
        self.values.push(value);
        "?".to_string()
    }

    fn finish(self, query: String, _projection: &[String]) -> NativeFilter {
        NativeFilter::Text {
            query,
            params: Params::Positional(self.values),
        }
    }

    fn supports_junction(&self, junction: Junction) -> bool {
        junction == Junction::And
    }

    fn supports_negation(&self) -> bool {
        false
    }

    fn translate_comparison(
        &mut self,
        field: &str,
        op: Operator,
        operand: &Operand,
    ) -> Result<String> {
        match (op, operand) {
            (Operator::Between, Operand::Range(low, high)) => {
                let low = self.bind(field, low.clone());
                let high = self.bind(field, high.clone());
                Ok(format!("{field} >= {low} AND {field} <= {high}"))
            }
            _ => translate::translate_comparison(self, field, op, operand),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;

    #[test]
    fn positional_values_in_order() {
        let condition = Condition::And(vec![
            Condition::between("age", 18, 30),
            Condition::eq("name", "Ada"),
            Condition::compare("city", Operator::In, vec!["Oslo", "Rome"]),
        ]);
        let filter = translate::run(Translator::default(), &condition, &[]).expect("a filter");
        assert_eq!(
            filter,
            NativeFilter::Text {
                query: "age >= ? AND age <= ? AND name = ? AND city IN ?".into(),
                params: Params::Positional(vec![
                    18.into(),
                    30.into(),
                    "Ada".into(),
                    vec!["Oslo", "Rome"].into(),
                ]),
            }
        );
    }

    #[test]
    fn or_and_not_are_rejected() {
        let or = Condition::Or(vec![Condition::eq("a", 1), Condition::eq("b", 2)]);
        assert_eq!(
            translate::run(Translator::default(), &or, &[]),
            Err(translate::Error::unsupported("OR", Dialect::DriverPositional))
        );
        let not = Condition::not(Condition::eq("a", 1));
        assert_eq!(
            translate::run(Translator::default(), &not, &[]),
            Err(translate::Error::unsupported("NOT", Dialect::DriverPositional))
        );
    }
}
