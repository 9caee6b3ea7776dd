use crate::{
    condition::{Operand, Operator},
    translate::{self, Dialect, NativeFilter, Params, Result, TranslationContext, require_list},
    value::Value,
};

/// `?` markers inside statement text with an ordered value array. Attribute
///  names are double quoted; there is no LIKE.
#[derive(Default)]
pub struct Translator {
    values: Vec<Value>,
}

impl TranslationContext for Translator {
    fn dialect(&self) -> Dialect {
        Dialect::ExpressionPositional
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

    fn supports(&self, op: Operator) -> bool {
        op != Operator::Like
    }

    fn field(&mut self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    fn translate_comparison(
        &mut self,
        field: &str,
        op: Operator,
        operand: &Operand,
    ) -> Result<String> {
        match (op, operand) {
            (Operator::In, Operand::Value(value)) => {
                let items = require_list(field, value)?;
                let column = self.field(field);
                let markers = items
                    .iter()
                    .map(|item| self.bind(field, item.clone()))
                    .collect::<Vec<_>>();
                Ok(format!("{column} IN [{}]", markers.join(", ")))
            }
            _ => translate::translate_comparison(self, field, op, operand),
        }
    }
}
