use crate::value::Value;

/// Comparison operators a derived query can express.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display, strum_macros::EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    Equal,
    Like,
    GreaterThan,
    GreaterEqual,
    LessThan,
    LessEqual,
    Between,
    In,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Junction {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Value(Value),
    /// Inclusive bounds, only meaningful for [Operator::Between].
    Range(Value, Value),
}

/// A filter tree built from one invocation. It owns its operands, so it never
///  borrows from the argument slice it was built from.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Comparison {
        field: String,
        op: Operator,
        operand: Operand,
    },
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    pub fn compare(field: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        Condition::Comparison {
            field: field.into(),
            op,
            operand: Operand::Value(value.into()),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, Operator::Equal, value)
    }

    pub fn between(
        field: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        Condition::Comparison {
            field: field.into(),
            op: Operator::Between,
            operand: Operand::Range(low.into(), high.into()),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: Condition) -> Self {
        Condition::Not(Box::new(inner))
    }

    /// Joins children with `junction`, flattening nested nodes of the same
    ///  kind and collapsing single-child joins. `a AND (b AND c)` becomes
    ///  `AND[a, b, c]`, which keeps dialects without grouping (CQL) happy.
    pub fn join(junction: Junction, children: Vec<Condition>) -> Self {
        let mut flat = Vec::with_capacity(children.len());
        for child in children {
            match (junction, child) {
                (Junction::And, Condition::And(inner)) | (Junction::Or, Condition::Or(inner)) => {
                    flat.extend(inner)
                }
                (_, other) => flat.push(other),
            }
        }
        if flat.len() == 1 {
            return flat.remove(0);
        }
        match junction {
            Junction::And => Condition::And(flat),
            Junction::Or => Condition::Or(flat),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_names() {
        assert_eq!(Operator::GreaterEqual.to_string(), "GREATER_EQUAL");
        assert_eq!(Operator::In.to_string(), "IN");
        assert_eq!(Junction::Or.to_string(), "OR");
    }

    #[test]
    fn join_flattens_and_collapses() {
        let a = Condition::eq("a", 1);
        let b = Condition::eq("b", 2);
        let c = Condition::eq("c", 3);

        let nested = Condition::join(
            Junction::And,
            vec![a.clone(), Condition::And(vec![b.clone(), c.clone()])],
        );
        assert_eq!(nested, Condition::And(vec![a.clone(), b.clone(), c]));

        assert_eq!(Condition::join(Junction::Or, vec![a.clone()]), a);

        // An OR under an AND is a different junction and stays grouped
        let mixed = Condition::join(
            Junction::And,
            vec![a.clone(), Condition::Or(vec![b.clone(), a.clone()])],
        );
        let Condition::And(children) = mixed else {
            panic!("Expected an And");
        };
        assert!(matches!(children[1], Condition::Or(_)));
    }
}
