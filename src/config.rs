use crate::translate::Dialect;

/// Engine settings. One config is fixed per repository; every invocation reads
///  it and nothing writes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    pub dialect: Dialect,
    /// Replace quoted literals with `'?'` in backend error messages and logs.
    pub redact_literals: bool,
    /// Classify every descriptor when the repository is built rather than on
    ///  first call.
    pub eager_validation: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::AtNamed,
            redact_literals: true,
            eager_validation: true,
        }
    }
}

impl EngineConfig {
    pub fn for_dialect(dialect: Dialect) -> Self {
        Self {
            dialect,
            ..Self::default()
        }
    }
}
