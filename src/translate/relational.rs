use indexmap::IndexMap;

use crate::{
    condition::{Operand, Operator},
    translate::{
        self, Dialect, NativeFilter, Params, Placeholders, RelationalBinding, Result,
        TranslationContext, require_non_empty_list,
    },
    value::Value,
};

/// SQL-like text with either `:name` or `?` parameters.
pub struct Translator {
    binding: RelationalBinding,
    names: Placeholders,
    named: IndexMap<String, Value>,
    positional: Vec<Value>,
}

impl Translator {
    pub fn new(binding: RelationalBinding) -> Self {
        Self {
            binding,
            names: Placeholders::default(),
            named: IndexMap::new(),
            positional: Vec::new(),
        }
    }
}

impl TranslationContext for Translator {
    fn dialect(&self) -> Dialect {
        Dialect::Relational(self.binding)
    }

    fn bind(&mut self, base: &str, value: Value) -> String {
        match self.binding {
            RelationalBinding::Named => {
                let name = self.names.unique(base);
                self.named.insert(name.clone(), value);
                format!(":{name}")
            }
            RelationalBinding::Positional => {
                self.positional.push(value);
                "?".to_string()
            }
        }
    }

    fn finish(self, query: String, _projection: &[String]) -> NativeFilter {
        let params = match self.binding {
            RelationalBinding::Named => Params::Named(self.named),
            RelationalBinding::Positional => Params::Positional(self.positional),
        };
        NativeFilter::Text { query, params }
    }

    fn translate_comparison(
        &mut self,
        field: &str,
        op: Operator,
        operand: &Operand,
    ) -> Result<String> {
        match (op, self.binding, operand) {
            // A named list parameter is expanded by the driver; positional
            //  markers need one `?` per element.
            (Operator::In, RelationalBinding::Positional, Operand::Value(value)) => {
                let items = require_non_empty_list(field, value)?;
                let markers = items
                    .iter()
                    .map(|item| self.bind(field, item.clone()))
                    .collect::<Vec<_>>();
                Ok(format!("{field} IN ({})", markers.join(", ")))
            }
            (Operator::In, RelationalBinding::Named, Operand::Value(value)) => {
                require_non_empty_list(field, value)?;
                let placeholder = self.bind(field, value.clone());
                Ok(format!("{field} IN ({placeholder})"))
            }
            _ => translate::translate_comparison(self, field, op, operand),
        }
    }
}
