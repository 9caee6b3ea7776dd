use indexmap::IndexMap;

use crate::{
    condition::{Operand, Operator},
    translate::{
        self, Dialect, NativeFilter, Params, Placeholders, Result, TranslationContext, sql_symbol,
    },
    value::Value,
    wildcard::WildcardPolicy,
};

/// `$name` placeholders over a node variable: `n.age > $age`. LIKE becomes a
///  whole-string regex match (`=~`).
pub struct Translator {
    pub variable: String,
    names: Placeholders,
    params: IndexMap<String, Value>,
}

impl Default for Translator {
    fn default() -> Self {
        Self {
            variable: "n".to_string(),
            names: Placeholders::default(),
            params: IndexMap::new(),
        }
    }
}

impl TranslationContext for Translator {
    fn dialect(&self) -> Dialect {
        Dialect::DollarNamed
    }

    fn bind(&mut self, base: &str, value: Value) -> String {
        let name = self.names.unique(base);
        self.params.insert(name.clone(), value);
        format!("${name}")
    }

    fn finish(self, query: String, _projection: &[String]) -> NativeFilter {
        NativeFilter::Text {
            query,
            params: Params::Named(self.params),
        }
    }

    fn wildcard(&self) -> WildcardPolicy {
        WildcardPolicy::Anchored
    }

    fn field(&mut self, name: &str) -> String {
        format!("{}.{name}", self.variable)
    }

    fn symbol(&self, op: Operator) -> &'static str {
        match op {
            Operator::Like => "=~",
            other => sql_symbol(other),
        }
    }

    fn translate_comparison(
        &mut self,
        field: &str,
        op: Operator,
        operand: &Operand,
    ) -> Result<String> {
        match (op, operand) {
            (Operator::Between, Operand::Range(low, high)) => {
                let column = self.field(field);
                let low = self.bind(&format!("{field}_lo"), low.clone());
                let high = self.bind(&format!("{field}_hi"), high.clone());
                Ok(format!("{low} <= {column} <= {high}"))
            }
            _ => translate::translate_comparison(self, field, op, operand),
        }
    }
}
