//! One-shot confirmation gates.
//!
//! A gate is a per-key flag that flips on first use. The negotiator shows an
//! explanation the first time a channel is used and skips it afterwards. The
//! store is injected into the engine; its lifetime is the lifetime of the
//! app install, and [`GateStore::reset`] re-arms every gate when the app is
//! reinstalled.

use std::collections::HashSet;

/// Well-known gate keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateKey {
    /// Explanation before launching the manual installer.
    CloneViaInstall,
    /// Explanation before navigating to the first-party market.
    CloneViaGooglePlay,
    /// Explanation before navigating to an alternate built-in market.
    CloneViaBuiltinMarket,
}

impl GateKey {
    /// Store key.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CloneViaInstall => "clone-via-install",
            Self::CloneViaGooglePlay => "clone-via-google-play",
            Self::CloneViaBuiltinMarket => "clone-via-builtin-market",
        }
    }
}

/// Key-value store of one-shot flags.
pub trait GateStore {
    /// Mark a key. Returns `true` only on the first call for the key.
    fn mark(&mut self, key: &str) -> bool;

    /// Whether a key has been marked.
    fn is_marked(&self, key: &str) -> bool;

    /// Forget every mark.
    fn reset(&mut self);
}

/// In-memory gate store.
#[derive(Debug, Clone, Default)]
pub struct MemoryGateStore {
    marked: HashSet<String>,
}

impl MemoryGateStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with keys already marked.
    pub fn with_marked<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        Self { marked: keys.into_iter().map(str::to_owned).collect() }
    }
}

impl GateStore for MemoryGateStore {
    fn mark(&mut self, key: &str) -> bool {
        self.marked.insert(key.to_owned())
    }

    fn is_marked(&self, key: &str) -> bool {
        self.marked.contains(key)
    }

    fn reset(&mut self) {
        self.marked.clear();
    }
}
