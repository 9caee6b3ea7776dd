use indexmap::IndexMap;

use crate::{
    condition::{Junction, Operand, Operator},
    translate::{
        Dialect, NativeFilter, Params, Parenthesize, Placeholders, Result, TranslationContext,
        like_pattern, operand_type, require_list,
    },
    value::{Value, escape_single_quotes},
    wildcard::WildcardPolicy,
};

/// Traversal steps over script bindings: `has('age', gt(age))`. Junctions
///  become `and(__.x, __.y)` steps instead of infix operators.
#[derive(Default)]
pub struct Translator {
    names: Placeholders,
    params: IndexMap<String, Value>,
}

impl TranslationContext for Translator {
    fn dialect(&self) -> Dialect {
        Dialect::GremlinScript
    }

    fn bind(&mut self, base: &str, value: Value) -> String {
        let name = self.names.unique(base);
        self.params.insert(name.clone(), value);
        name
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
        format!("'{}'", escape_single_quotes(name))
    }

    fn translate_comparison(
        &mut self,
        field: &str,
        op: Operator,
        operand: &Operand,
    ) -> Result<String> {
        let key = self.field(field);
        let predicate = match (op, operand) {
            (Operator::Between, Operand::Range(low, high)) => {
                let low = self.bind(&format!("{field}_lo"), low.clone());
                let high = self.bind(&format!("{field}_hi"), high.clone());
                // `between` excludes its upper bound
                format!("gte({low}).and(lte({high}))")
            }
            (Operator::Between, Operand::Value(value)) => {
                return Err(operand_type(op, field, "range", value));
            }
            (_, Operand::Range(low, _)) => {
                return Err(operand_type(op, field, "single value", low));
            }
            (Operator::Equal, Operand::Value(value)) => self.bind(field, value.clone()),
            (Operator::GreaterThan, Operand::Value(value)) => {
                format!("gt({})", self.bind(field, value.clone()))
            }
            (Operator::GreaterEqual, Operand::Value(value)) => {
                format!("gte({})", self.bind(field, value.clone()))
            }
            (Operator::LessThan, Operand::Value(value)) => {
                format!("lt({})", self.bind(field, value.clone()))
            }
            (Operator::LessEqual, Operand::Value(value)) => {
                format!("lte({})", self.bind(field, value.clone()))
            }
            (Operator::In, Operand::Value(value)) => {
                require_list(field, value)?;
                format!("within({})", self.bind(field, value.clone()))
            }
            (Operator::Like, Operand::Value(value)) => {
                let pattern = like_pattern(self.wildcard(), field, value)?;
                format!("regex({})", self.bind(field, Value::Str(pattern)))
            }
        };
        Ok(format!("has({key}, {predicate})"))
    }

    fn join(&self, junction: Junction, parts: Vec<String>, _paren: Parenthesize) -> String {
        let step = match junction {
            Junction::And => "and",
            Junction::Or => "or",
        };
        let parts = parts
            .iter()
            .map(|part| format!("__.{part}"))
            .collect::<Vec<_>>();
        format!("{step}({})", parts.join(", "))
    }

    fn negate(&self, inner: String) -> String {
        format!("not(__.{inner})")
    }
}
