//! Environment variable expansion for configuration strings.

use crate::ConfigError;

/// Expand environment variable references in a string.
///
/// Supports:
/// - `${VAR}` - expands to the value of VAR, errors if unset
/// - `${VAR:-default}` - expands to VAR if set, otherwise uses default
///
/// Strings without a `${` sequence are returned unchanged, so a bare `$`
/// in a path or URL is never touched.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, LookupError> {
        std::env::var(var).map(Some).map_err(|_| LookupError {
            var_name: var.to_owned(),
        })
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{0}}} not set", e.cause.var_name),
    })
}

/// Lookup failure for an unset variable.
struct LookupError {
    var_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_expand_var() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::set_var("DOCTOR_TEST_EXPAND_DIR", "/srv/shortcodes");
        }
        let result = expand_env("${DOCTOR_TEST_EXPAND_DIR}/team", "shortcodes.dir").unwrap();
        assert_eq!(result, "/srv/shortcodes/team");
        unsafe {
            std::env::remove_var("DOCTOR_TEST_EXPAND_DIR");
        }
    }

    #[test]
    fn test_expand_default_when_unset() {
        let result = expand_env(
            "${DOCTOR_TEST_EXPAND_UNSET:-shortcodes}",
            "shortcodes.dir",
        )
        .unwrap();
        assert_eq!(result, "shortcodes");
    }

    #[test]
    fn test_expand_missing_var_error() {
        let err = expand_env("${DOCTOR_TEST_EXPAND_MISSING}", "shortcodes.dir").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert_eq!(
            err.to_string(),
            "Environment variable error in shortcodes.dir: ${DOCTOR_TEST_EXPAND_MISSING} not set"
        );
    }

    #[test]
    fn test_bare_dollar_unchanged() {
        let result = expand_env("./plugins/$old", "shortcodes.dir").unwrap();
        assert_eq!(result, "./plugins/$old");
    }
}
