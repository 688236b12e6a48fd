//! registry::resolve
//!
//! Pattern resolution: turning a user-supplied pattern into concrete
//! registered keys.
//!
//! # Resolution order
//!
//! 1. A pattern that exactly names a registered key resolves to it
//!    alone, so a key is never pulled into regex ambiguity by other keys
//!    containing its text.
//! 2. The reserved pattern `"all"` resolves to every registered key.
//! 3. Otherwise the pattern is compiled as a case-insensitive regex and
//!    searched against every registered key, in lexicographic order.
//! 4. A pattern that matched nothing but exactly names a deprecated key
//!    resolves to that key, so redirects keep working after the old key
//!    is retired.
//!
//! Single-key resolution then applies redirect translation: one hop from
//! the resolved key to its declared replacement, never chased further.

use regex::RegexBuilder;

use super::{OptionError, Registry};

impl Registry {
    /// All keys matching `pattern`, in lexicographic order.
    pub(crate) fn select_keys(&self, pattern: &str) -> Result<Vec<String>, OptionError> {
        let exact = pattern.to_ascii_lowercase();

        if self.meta.is_registered(&exact) {
            return Ok(vec![exact]);
        }
        if exact == "all" {
            return Ok(self.meta.registered_keys().map(str::to_string).collect());
        }

        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|err| OptionError::InvalidPattern {
                pattern: pattern.to_string(),
                message: err.to_string(),
            })?;

        let matches: Vec<String> = self
            .meta
            .registered_keys()
            .filter(|key| regex.is_match(key))
            .map(str::to_string)
            .collect();

        if matches.is_empty() && self.meta.is_deprecated(&exact) {
            return Ok(vec![exact]);
        }

        Ok(matches)
    }

    /// Resolve `pattern` to exactly one key and translate redirects.
    ///
    /// Deprecation notices are emitted (unless `silent`) for the
    /// attempted pattern on the zero-match path and for the resolved key
    /// otherwise.
    pub(crate) fn resolve_single(
        &self,
        pattern: &str,
        silent: bool,
    ) -> Result<String, OptionError> {
        let mut keys = self.select_keys(pattern)?;

        if keys.is_empty() {
            if !silent {
                self.warn_if_deprecated(&pattern.to_ascii_lowercase());
            }
            return Err(OptionError::NoSuchOption(pattern.to_string()));
        }
        if keys.len() > 1 {
            return Err(OptionError::AmbiguousPattern(pattern.to_string()));
        }

        let key = keys.swap_remove(0);
        if !silent {
            self.warn_if_deprecated(&key);
        }

        Ok(self.translate_key(key))
    }

    /// Follow a declared redirect one hop; unredirected keys pass
    /// through unchanged.
    pub(crate) fn translate_key(&self, key: String) -> String {
        let redirect = self
            .meta
            .deprecated(&key)
            .and_then(|record| record.redirect_key.clone());
        match redirect {
            Some(target) => target,
            None => key,
        }
    }

    /// Emit a deprecation notice if `key` has a deprecation record.
    ///
    /// Returns whether a notice was emitted.
    pub(crate) fn warn_if_deprecated(&self, key: &str) -> bool {
        let record = match self.meta.deprecated(key) {
            Some(record) => record,
            None => return false,
        };

        let message = match &record.message {
            Some(custom) => custom.clone(),
            None => {
                let mut message = format!("'{}' is deprecated", key);
                if let Some(version) = &record.removal_version {
                    message.push_str(&format!(" and will be removed in {}", version));
                }
                match &record.redirect_key {
                    Some(target) => {
                        message.push_str(&format!(", please use '{}' instead.", target));
                    }
                    None => message.push_str(", please refrain from using it."),
                }
                message
            }
        };

        self.emit_warning(&message);
        true
    }
}
