//! Convenience validator factories for common value shapes.
//!
//! Pass these to [`OptionSpec::validator`](crate::core::metadata::OptionSpec::validator):
//!
//! ```
//! use knobwork::core::metadata::OptionSpec;
//! use knobwork::registry::Registry;
//! use knobwork::validators;
//!
//! let mut registry = Registry::new();
//! registry
//!     .register(OptionSpec::new("display.width", 80).validator(validators::is_i64))
//!     .unwrap();
//! assert!(registry.set_one("display.width", "wide", false).is_err());
//! ```

use serde_json::Value;

/// Accept only booleans.
pub fn is_bool(value: &Value) -> Result<(), String> {
    if value.is_boolean() {
        Ok(())
    } else {
        Err("value must be a boolean".to_string())
    }
}

/// Accept only integers.
pub fn is_i64(value: &Value) -> Result<(), String> {
    if value.is_i64() || value.is_u64() {
        Ok(())
    } else {
        Err("value must be an integer".to_string())
    }
}

/// Accept only floating-point numbers.
pub fn is_f64(value: &Value) -> Result<(), String> {
    if value.is_f64() {
        Ok(())
    } else {
        Err("value must be a float".to_string())
    }
}

/// Accept any numeric value, integer or float.
pub fn is_number(value: &Value) -> Result<(), String> {
    if value.is_number() {
        Ok(())
    } else {
        Err("value must be a number".to_string())
    }
}

/// Accept only strings.
pub fn is_str(value: &Value) -> Result<(), String> {
    if value.is_string() {
        Ok(())
    } else {
        Err("value must be a string".to_string())
    }
}

/// Accept only values from a fixed set.
///
/// # Example
///
/// ```
/// use knobwork::validators::one_of;
/// use serde_json::Value;
///
/// let validator = one_of(vec![Value::from("left"), Value::from("right")]);
/// assert!(validator(&Value::from("left")).is_ok());
/// assert!(validator(&Value::from("center")).is_err());
/// ```
pub fn one_of(allowed: Vec<Value>) -> impl Fn(&Value) -> Result<(), String> + Send + Sync {
    move |value| {
        if allowed.contains(value) {
            Ok(())
        } else {
            let listing = allowed
                .iter()
                .map(Value::to_string)
                .collect::<Vec<_>>()
                .join("|");
            Err(format!("value must be one of {}", listing))
        }
    }
}
