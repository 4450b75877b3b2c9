//! Options of the conversion.

/// Suffix appended to the target path for the backup copy.
pub const DEFAULT_BACKUP_SUFFIX: &str = ".bak";
/// Key of the root object linking to the note collection.
pub const DEFAULT_COLLECTION_KEY: &str = "songTaps";

/// How grid symbols other than tap, hold-start and hold-end are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SymbolPolicy {
    /// Drop them, reporting each with a warning.
    #[default]
    Ignore,
    /// Abort the conversion on the first one.
    Reject,
}

/// Options of the conversion.
///
/// # Example
///
/// ```
/// use steptap::config::{ConvertConfig, SymbolPolicy};
///
/// let config = ConvertConfig::default()
///     .with_symbol_policy(SymbolPolicy::Reject)
///     .with_backup_suffix(".orig");
/// assert_eq!(config.backup_suffix, ".orig");
/// assert_eq!(config.collection_key, "songTaps");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConvertConfig {
    /// Suffix appended to the target path for the backup copy.
    pub backup_suffix: String,
    /// Treatment of unsupported grid symbols.
    pub symbol_policy: SymbolPolicy,
    /// Key of the root object linking to the note collection.
    pub collection_key: String,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            backup_suffix: DEFAULT_BACKUP_SUFFIX.to_owned(),
            symbol_policy: SymbolPolicy::default(),
            collection_key: DEFAULT_COLLECTION_KEY.to_owned(),
        }
    }
}

impl ConvertConfig {
    /// Sets the backup suffix.
    #[must_use]
    pub fn with_backup_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.backup_suffix = suffix.into();
        self
    }

    /// Sets the treatment of unsupported grid symbols.
    #[must_use]
    pub fn with_symbol_policy(mut self, policy: SymbolPolicy) -> Self {
        self.symbol_policy = policy;
        self
    }

    /// Sets the key linking the root object to the note collection.
    #[must_use]
    pub fn with_collection_key(mut self, key: impl Into<String>) -> Self {
        self.collection_key = key.into();
        self
    }
}
