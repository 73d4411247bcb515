use crate::core::error::{EodDataError, Result};
use crate::core::price::ConverterKind;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Maps 2-character commodity symbol prefixes (e.g. `ZC`) to price converters.
///
/// The mapping is read on every price access, so reconfiguring a shared
/// registry changes how quotes already in hand are adjusted from then on.
#[derive(Clone, Default)]
pub struct ConverterRegistry {
    inner: Arc<RwLock<HashMap<String, ConverterKind>>>,
}

fn normalize_prefix(prefix: &str) -> Result<String> {
    let prefix = prefix.trim().to_uppercase();
    if prefix.chars().count() != 2 {
        return Err(EodDataError::InvalidSymbolPrefix(prefix));
    }
    Ok(prefix)
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_mapping(mapping: &HashMap<String, ConverterKind>) -> Result<Self> {
        let registry = Self::new();
        registry.configure(mapping)?;
        Ok(registry)
    }

    /// Replaces the whole mapping.
    pub fn configure(&self, mapping: &HashMap<String, ConverterKind>) -> Result<()> {
        let normalized = mapping
            .iter()
            .map(|(prefix, kind)| Ok((normalize_prefix(prefix)?, *kind)))
            .collect::<Result<HashMap<_, _>>>()?;

        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        debug!(prefixes = normalized.len(), "Converter registry CONFIGURE");
        *inner = normalized;
        Ok(())
    }

    pub fn register(&self, prefix: &str, kind: ConverterKind) -> Result<()> {
        let prefix = normalize_prefix(prefix)?;
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        debug!(%prefix, %kind, "Converter registry PUT");
        inner.insert(prefix, kind);
        Ok(())
    }

    pub fn unregister(&self, prefix: &str) -> Option<ConverterKind> {
        let prefix = prefix.trim().to_uppercase();
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.remove(&prefix)
    }

    pub fn resolve(&self, prefix: &str) -> Result<ConverterKind> {
        let prefix = prefix.trim().to_uppercase();
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .get(&prefix)
            .copied()
            .ok_or(EodDataError::UnregisteredSymbol(prefix))
    }

    /// Resolves the converter for a full symbol such as `ZCH20`.
    pub fn resolve_symbol(&self, symbol: &str) -> Result<ConverterKind> {
        let prefix: String = symbol.trim().chars().take(2).collect();
        self.resolve(&prefix)
    }
}

impl std::fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_map().entries(inner.iter()).finish()
    }
}
