use strum::IntoEnumIterator;

use crate::{
    classify::{QueryOrigin, classify},
    descriptor::{MethodDescriptor, ReturnShape},
    translate::{self, Dialect, RelationalBinding},
    value::Value,
    wildcard::WildcardPolicy,
};

fn dialects() -> impl Iterator<Item = Dialect> {
    Dialect::iter().chain([Dialect::Relational(RelationalBinding::Positional)])
}

/// Classifies `name` and, when it is a derived query, translates it for every
///  dialect with `args`. Errors are fine; panics are not.
pub fn translate_method(name: &str, args: &[Value]) {
    let descriptor = MethodDescriptor::new(name, ReturnShape::OrderedList);
    let Ok(QueryOrigin::DerivedQuery(plan)) = classify(&descriptor) else {
        return;
    };
    let Ok(condition) = plan.instantiate(args) else {
        return;
    };
    for dialect in dialects() {
        _ = translate::translate(dialect, &condition, &[]);
    }
}

/// Every policy must produce a valid regex (or pass-through text) for any
///  pattern.
pub fn convert_pattern(pattern: &str) {
    for policy in [WildcardPolicy::Anchored, WildcardPolicy::Unanchored] {
        let out = policy.translate(Some(pattern));
        assert!(
            regex::Regex::new(&out).is_ok(),
            "{policy:?} produced an invalid regex for {pattern:?}: {out}"
        );
    }
    _ = WildcardPolicy::Native.translate(Some(pattern));
}
