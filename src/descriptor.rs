use std::{collections::HashSet, sync::Arc};

use indexmap::IndexMap;

use crate::error::{ConfigError, Result};

/// How a method's result is handed back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReturnShape {
    Single,
    NullableSingle,
    OrderedList,
    UniqueSet,
    LazySequence,
    Count,
    Exists,
    /// Nothing to return (`delete`, `deleteAll`).
    Unit,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamMeta {
    /// The declared binding name, if any. Unnamed parameters are only
    ///  reachable by position.
    pub binding: Option<String>,
}

/// Everything the engine needs to know about one repository method. Built once
///  by a [MetadataResolver] and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub name: String,
    pub params: Vec<ParamMeta>,
    pub returns: ReturnShape,
    /// Literal query text, passed to the store verbatim.
    pub query: Option<String>,
    /// Explicit attribute projection; empty means "all attributes".
    pub projection: Vec<String>,
}

impl MethodDescriptor {
    pub fn new(name: impl Into<String>, returns: ReturnShape) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            returns,
            query: None,
            projection: Vec::new(),
        }
    }

    /// Appends a parameter bound to `name`.
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(ParamMeta {
            binding: Some(name.into()),
        });
        self
    }

    /// Appends a parameter without a binding name.
    pub fn positional(mut self) -> Self {
        self.params.push(ParamMeta::default());
        self
    }

    pub fn query(mut self, text: impl Into<String>) -> Self {
        self.query = Some(text.into());
        self
    }

    pub fn project<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.projection = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Binding names must be pairwise distinct.
    pub fn validate_bindings(&self) -> std::result::Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for name in self.params.iter().filter_map(|p| p.binding.as_deref()) {
            if !seen.insert(name) {
                return Err(ConfigError::DuplicateBinding {
                    method: self.name.clone(),
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Produces descriptors for repository methods. Resolution happens once, when
///  the repository is built.
pub trait MetadataResolver {
    type Method: ?Sized;

    fn resolve(&self, method: &Self::Method) -> std::result::Result<MethodDescriptor, ConfigError>;
}

/// Resolved descriptors by method name.
#[derive(Debug, Clone, Default)]
pub struct DescriptorCache {
    by_name: IndexMap<String, Arc<MethodDescriptor>>,
}

impl DescriptorCache {
    pub fn build<'m, R>(
        resolver: &R,
        methods: impl IntoIterator<Item = &'m R::Method>,
    ) -> Result<Self>
    where
        R: MetadataResolver,
        R::Method: 'm,
    {
        let mut by_name = IndexMap::new();
        for method in methods {
            let descriptor = resolver.resolve(method)?;
            by_name.insert(descriptor.name.clone(), Arc::new(descriptor));
        }
        Ok(Self { by_name })
    }

    pub fn get(&self, name: &str) -> std::result::Result<Arc<MethodDescriptor>, ConfigError> {
        self.by_name
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownMethod(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &MethodDescriptor> {
        self.by_name.values().map(AsRef::as_ref)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl FromIterator<MethodDescriptor> for DescriptorCache {
    fn from_iter<I: IntoIterator<Item = MethodDescriptor>>(iter: I) -> Self {
        Self {
            by_name: iter
                .into_iter()
                .map(|d| (d.name.clone(), Arc::new(d)))
                .collect(),
        }
    }
}
