//! registry::describe
//!
//! Human-readable descriptions of registered options.
//!
//! Descriptions are computed on demand from the metadata store and the
//! current tree values; nothing here is cached or templated.

use super::{OptionError, Registry};

impl Registry {
    /// Build the formatted description of every option matching
    /// `pattern`.
    ///
    /// The empty pattern matches everything. Each block shows the key,
    /// its doc text, default and current values, and a deprecation
    /// annotation where one applies.
    ///
    /// # Errors
    ///
    /// Returns [`OptionError::NoSuchOption`] when nothing matches and
    /// [`OptionError::InvalidPattern`] for an unparseable regex.
    pub fn describe(&self, pattern: &str) -> Result<String, OptionError> {
        let keys = self.select_keys(pattern)?;
        if keys.is_empty() {
            return Err(OptionError::NoSuchOption(pattern.to_string()));
        }

        let mut description = String::new();
        for key in &keys {
            description.push_str(&self.build_description(key)?);
        }
        Ok(description)
    }

    /// Format one option's description block.
    fn build_description(&self, key: &str) -> Result<String, OptionError> {
        let record = self.meta.registered(key);
        let deprecated = self.meta.deprecated(key);

        let mut block = format!("{}: ", key);
        match record {
            Some(record) if !record.doc.trim().is_empty() => block.push_str(record.doc.trim()),
            _ => block.push_str("No description available."),
        }
        block.push('\n');

        if let Some(record) = record {
            let current = self.get(key, true)?;
            block.push_str(&format!(
                "    [default: {}] [currently: {}]\n",
                record.default_value, current
            ));
        }

        if let Some(note) = deprecated {
            match &note.redirect_key {
                Some(target) => {
                    block.push_str(&format!("    (Deprecated, use `{}` instead.)\n", target));
                }
                None => block.push_str("    (Deprecated)\n"),
            }
        }

        Ok(block)
    }

    /// Build a concise listing of registered keys, grouped by namespace.
    ///
    /// Top-level keys come first, then one `- prefix.[leaf, ...]` group
    /// per namespace, wrapped at `width` columns.
    ///
    /// # Example
    ///
    /// ```
    /// use knobwork::core::metadata::OptionSpec;
    /// use knobwork::registry::Registry;
    ///
    /// let mut registry = Registry::new();
    /// registry.register(OptionSpec::new("verbose", false)).unwrap();
    /// registry.register(OptionSpec::new("display.width", 80)).unwrap();
    /// registry.register(OptionSpec::new("display.height", 25)).unwrap();
    ///
    /// assert_eq!(
    ///     registry.key_listing(80),
    ///     "verbose\n- display.[height, width]"
    /// );
    /// ```
    pub fn key_listing(&self, width: usize) -> String {
        let keys = self.keys();
        let mut lines: Vec<String> = Vec::new();

        let singles: Vec<&str> = keys.iter().copied().filter(|k| !k.contains('.')).collect();
        if !singles.is_empty() {
            lines.extend(wrap_items("", &singles, width));
        }

        // keys are sorted, so one pass groups by shared namespace prefix
        let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
        for key in keys.iter().copied().filter(|k| k.contains('.')) {
            let (prefix, leaf) = match key.rfind('.') {
                Some(idx) => (&key[..idx], &key[idx + 1..]),
                None => continue,
            };
            match groups.last_mut() {
                Some((current, leaves)) if *current == prefix => leaves.push(leaf),
                _ => groups.push((prefix, vec![leaf])),
            }
        }

        for (prefix, leaves) in groups {
            let mut group = wrap_items(&format!("- {}.[", prefix), &leaves, width);
            if let Some(last) = group.last_mut() {
                last.push(']');
            }
            lines.extend(group);
        }

        lines.join("\n")
    }
}

/// Greedy comma-separated wrap with a two-space continuation indent.
fn wrap_items(head: &str, items: &[&str], width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::from(head);

    for (i, item) in items.iter().enumerate() {
        if i == 0 {
            line.push_str(item);
            continue;
        }
        if line.len() + item.len() + 2 > width {
            line.push(',');
            lines.push(line);
            line = format!("  {}", item);
        } else {
            line.push_str(", ");
            line.push_str(item);
        }
    }

    lines.push(line);
    lines
}

#[cfg(test)]
mod tests {
    use super::super::Registry;
    use crate::core::metadata::{Deprecation, OptionSpec};
    use crate::registry::OptionError;

    #[test]
    fn describe_shows_doc_default_and_current() {
        let mut registry = Registry::new();
        registry
            .register(OptionSpec::new("display.width", 80).doc("Frame width in columns."))
            .unwrap();
        registry.set_one("display.width", 120, false).unwrap();

        let description = registry.describe("display.width").unwrap();
        assert_eq!(
            description,
            "display.width: Frame width in columns.\n    [default: 80] [currently: 120]\n"
        );
    }

    #[test]
    fn describe_without_doc_uses_marker() {
        let mut registry = Registry::new();
        registry.register(OptionSpec::new("a", 1)).unwrap();

        let description = registry.describe("a").unwrap();
        assert!(description.starts_with("a: No description available.\n"));
    }

    #[test]
    fn describe_annotates_deprecation() {
        let mut registry = Registry::new();
        registry.register(OptionSpec::new("new.key", 1)).unwrap();
        registry.register(OptionSpec::new("old.key", 2)).unwrap();
        registry
            .deprecate("old.key", Deprecation::new().redirect_to("new.key"))
            .unwrap();

        let description = registry.describe("old.key").unwrap();
        assert!(description.contains("    (Deprecated, use `new.key` instead.)\n"));
    }

    #[test]
    fn describe_empty_pattern_lists_everything() {
        let mut registry = Registry::new();
        registry.register(OptionSpec::new("a", 1)).unwrap();
        registry.register(OptionSpec::new("b", 2)).unwrap();

        let description = registry.describe("").unwrap();
        assert!(description.contains("a: "));
        assert!(description.contains("b: "));
    }

    #[test]
    fn describe_unknown_pattern_fails() {
        let registry = Registry::new();
        assert_eq!(
            registry.describe("anything"),
            Err(OptionError::NoSuchOption("anything".into()))
        );
    }

    #[test]
    fn describe_quotes_string_values() {
        let mut registry = Registry::new();
        registry.register(OptionSpec::new("color", "red")).unwrap();

        let description = registry.describe("color").unwrap();
        assert!(description.contains("[default: \"red\"] [currently: \"red\"]"));
    }

    #[test]
    fn key_listing_groups_by_namespace() {
        let mut registry = Registry::new();
        registry.register(OptionSpec::new("verbose", false)).unwrap();
        registry.register(OptionSpec::new("display.width", 80)).unwrap();
        registry.register(OptionSpec::new("display.height", 25)).unwrap();
        registry.register(OptionSpec::new("sound.volume", 5)).unwrap();

        assert_eq!(
            registry.key_listing(80),
            "verbose\n- display.[height, width]\n- sound.[volume]"
        );
    }

    #[test]
    fn key_listing_wraps_long_groups() {
        let mut registry = Registry::new();
        for leaf in ["alpha", "bravo", "charlie", "delta", "echo"] {
            registry
                .register(OptionSpec::new(format!("group.{}", leaf), 0))
                .unwrap();
        }

        let listing = registry.key_listing(30);
        let lines: Vec<&str> = listing.lines().collect();
        assert!(lines.len() > 1);
        assert!(lines[0].starts_with("- group.["));
        assert!(lines[1].starts_with("  "));
        assert!(lines.last().unwrap().ends_with(']'));
    }

    #[test]
    fn key_listing_empty_registry() {
        let registry = Registry::new();
        assert_eq!(registry.key_listing(80), "");
    }
}
