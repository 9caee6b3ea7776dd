//! Decides where an invocation's query comes from: a builtin store primitive,
//!  literal text on the descriptor, or the method name itself.

use crate::{
    descriptor::{MethodDescriptor, ReturnShape},
    error::ConfigError,
    method_name::{self, PredicatePlan, Subject},
    port::CrudOp,
};

#[derive(Debug, Clone, PartialEq)]
pub enum QueryOrigin {
    BuiltinCrud(CrudOp),
    LiteralQuery(String),
    DerivedQuery(PredicatePlan),
}

impl QueryOrigin {
    pub fn kind(&self) -> &'static str {
        match self {
            QueryOrigin::BuiltinCrud(_) => "builtin",
            QueryOrigin::LiteralQuery(_) => "literal",
            QueryOrigin::DerivedQuery(_) => "derived",
        }
    }
}

// Lowercase words, so `deleteById` and `delete_by_id` look the same
const BUILTINS: &[(&[&str], CrudOp)] = &[
    (&["save"], CrudOp::Save),
    (&["delete", "by", "id"], CrudOp::DeleteById),
    (&["delete"], CrudOp::Delete),
    (&["delete", "all"], CrudOp::DeleteAll),
    (&["find", "by", "id"], CrudOp::FindById),
    (&["find", "all"], CrudOp::FindAll),
    (&["exists", "by", "id"], CrudOp::ExistsById),
    (&["count"], CrudOp::Count),
];

/// A builtin name only counts when the declared arity matches the primitive's;
///  `count(x)` is not the builtin `count()`.
fn builtin(descriptor: &MethodDescriptor) -> Option<CrudOp> {
    let name = descriptor.name.as_str();
    let (tokens, _) = method_name::words(name).ok()?;
    BUILTINS
        .iter()
        .find(|(words, op)| {
            op.arity() == descriptor.params.len()
                && words.len() == tokens.len()
                && tokens
                    .iter()
                    .zip(words.iter())
                    .all(|(t, w)| t.text(name).eq_ignore_ascii_case(w))
        })
        .map(|(_, op)| *op)
}

pub fn classify(descriptor: &MethodDescriptor) -> Result<QueryOrigin, ConfigError> {
    if let Some(op) = builtin(descriptor) {
        return Ok(QueryOrigin::BuiltinCrud(op));
    }
    if let Some(query) = &descriptor.query {
        return Ok(QueryOrigin::LiteralQuery(query.clone()));
    }

    let plan =
        method_name::parse(&descriptor.name).map_err(|source| ConfigError::UnrecognizedMethod {
            method: descriptor.name.clone(),
            source,
        })?;

    let required = match plan.subject {
        Subject::Find => None,
        Subject::Count => Some(("count", ReturnShape::Count)),
        Subject::Exists => Some(("exists", ReturnShape::Exists)),
    };
    if let Some((subject, shape)) = required
        && descriptor.returns != shape
    {
        return Err(ConfigError::ShapeMismatch {
            method: descriptor.name.clone(),
            subject,
            declared: descriptor.returns,
        });
    }

    Ok(QueryOrigin::DerivedQuery(plan))
}
