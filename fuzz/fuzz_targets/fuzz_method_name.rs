#![no_main]
use libfuzzer_sys::fuzz_target;

use arbitrary::Arbitrary;
use repo_query::value::Value;

#[derive(Debug)]
pub struct MethodInput {
    pub name: String,
    pub args: Vec<Value>,
}

const MAX_NAME_LENGTH: usize = 256;

fn random_value(u: &mut arbitrary::Unstructured) -> arbitrary::Result<Value> {
    Ok(match u.int_in_range(0..=5)? {
        0 => Value::Null,
        1 => Value::Bool(u.arbitrary()?),
        2 => Value::Int(u.arbitrary()?),
        3 => Value::Float(u.arbitrary()?),
        4 => Value::Str(u.arbitrary()?),
        _ => {
            let items: Vec<String> = u.arbitrary()?;
            Value::List(items.into_iter().take(8).map(Value::Str).collect())
        }
    })
}

impl<'a> Arbitrary<'a> for MethodInput {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let name: String = u.arbitrary()?;
        let count = u.int_in_range(0..=6)?;
        let args = (0..count)
            .map(|_| random_value(u))
            .collect::<arbitrary::Result<_>>()?;
        Ok(MethodInput {
            name: name.chars().take(MAX_NAME_LENGTH).collect(),
            args,
        })
    }
}

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = arbitrary::Unstructured::new(data).arbitrary::<MethodInput>() {
        repo_query::fuzz_helper::translate_method(&input.name, &input.args);
    }
});
