//! Trusted key providers.

use std::borrow::Cow;
use std::fmt;

/// Produces the key clients must present.
///
/// Implementations are built once at startup and shared read-only across
/// every request, so `current_key` must be cheap and must not fail.
pub trait KeySource: Send + Sync + 'static {
    fn current_key(&self) -> Cow<'_, str>;
}

/// A key fixed for the lifetime of the process.
#[derive(Clone)]
pub struct StaticKeySource {
    key: String,
}

impl StaticKeySource {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl KeySource for StaticKeySource {
    fn current_key(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.key)
    }
}

impl fmt::Debug for StaticKeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticKeySource")
            .field("key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_source_is_stable() {
        let source = StaticKeySource::new("abc");
        assert_eq!(source.current_key(), "abc");
        assert_eq!(source.current_key(), source.current_key());
    }

    #[test]
    fn test_debug_redacts_key() {
        let source = StaticKeySource::new("iL0UCJtAwwq8nVjvUJoVkM9CjFhyycLp");
        let printed = format!("{source:?}");
        assert!(!printed.contains("iL0UCJ"));
        assert!(printed.contains("redacted"));
    }
}
