use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// String interner for element ids. Interning is a storage detail only:
/// id allocation is per dialog (see `Registry::next_id`).
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Opaque, interned identifier of an element within a dialog.
/// Internally a `Spur` index: 4 bytes, `Copy`, constant-time `Eq` and `Hash`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(Spur);

impl ElementId {
    /// Intern a string as an ElementId, or return the existing one.
    pub fn intern(s: &str) -> Self {
        ElementId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// Build the id for the `serial`-th element carrying `prefix`
    /// (e.g. `button_3`).
    pub fn with_serial(prefix: &str, serial: u64) -> Self {
        Self::intern(&format!("{prefix}_{serial}"))
    }

    /// Numeric suffix of an id produced by `with_serial`, if any.
    pub fn serial(&self) -> Option<u64> {
        let (_, tail) = self.as_str().rsplit_once('_')?;
        tail.parse().ok()
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialOrd for ElementId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ElementId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl Serialize for ElementId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ElementId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ElementId::intern(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = ElementId::intern("button_1");
        let b = ElementId::intern("button_1");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "button_1");
    }

    #[test]
    fn serial_suffix() {
        assert_eq!(ElementId::with_serial("radio", 12).serial(), Some(12));
        assert_eq!(ElementId::intern("loose").serial(), None);
    }
}
