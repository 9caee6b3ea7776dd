use indexmap::IndexMap;

use crate::{
    descriptor::MethodDescriptor,
    error::{BindingError, Result},
    translate::Params,
    value::Value,
};

/// Declared binding name -> argument, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings(IndexMap<String, Value>);

impl Bindings {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn into_params(self) -> Params {
        Params::Named(self.0)
    }
}

/// Pairs each named parameter with its argument. Unnamed parameters are left
///  out; positional dialects read the argument slice directly.
pub fn bind(descriptor: &MethodDescriptor, args: &[Value]) -> Result<Bindings> {
    descriptor.validate_bindings()?;
    if args.len() != descriptor.params.len() {
        return Err(BindingError::ArgumentCount {
            expected: descriptor.params.len(),
            actual: args.len(),
        }
        .into());
    }

    let map = descriptor
        .params
        .iter()
        .zip(args)
        .filter_map(|(param, arg)| Some((param.binding.clone()?, arg.clone())))
        .collect();
    Ok(Bindings(map))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        descriptor::ReturnShape,
        error::{ConfigError, Error},
    };

    #[test]
    fn binds_in_declaration_order() {
        let descriptor = MethodDescriptor::new("findPeople", ReturnShape::OrderedList)
            .param("name")
            .param("age")
            .query("FOR p IN Person FILTER p.name == @name AND p.age == @age RETURN p");
        let args = [Value::from("Jane Doe"), Value::from(25)];
        let bindings = bind(&descriptor, &args).expect("bindings");

        assert_eq!(
            bindings.iter().collect::<Vec<_>>(),
            [
                ("name", &Value::from("Jane Doe")),
                ("age", &Value::from(25))
            ]
        );
        // the caller's arguments are untouched
        assert_eq!(args[0], Value::from("Jane Doe"));
    }

    #[test]
    fn unnamed_parameters_are_absent() {
        let descriptor = MethodDescriptor::new("findPeople", ReturnShape::OrderedList)
            .param("name")
            .positional();
        let bindings =
            bind(&descriptor, &[Value::from("Ada"), Value::from(36)]).expect("bindings");
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings.get("name"), Some(&Value::from("Ada")));
    }

    #[test]
    fn argument_count_and_duplicates() {
        let descriptor = MethodDescriptor::new("findPeople", ReturnShape::OrderedList)
            .param("name")
            .param("age");
        assert!(matches!(
            bind(&descriptor, &[Value::from("Ada")]),
            Err(Error::Binding(BindingError::ArgumentCount {
                expected: 2,
                actual: 1
            }))
        ));

        let duplicate = MethodDescriptor::new("findPeople", ReturnShape::OrderedList)
            .param("name")
            .param("name");
        assert!(matches!(
            bind(&duplicate, &[Value::from("a"), Value::from("b")]),
            Err(Error::Configuration(ConfigError::DuplicateBinding { .. }))
        ));
    }
}
