//! `${VAR}` expansion for string settings.

use crate::ConfigError;

/// Unset variable reported by the lookup closure.
struct MissingVar(String);

/// Expand `${VAR}` and `${VAR:-fallback}` references in `value`.
///
/// Bare `$VAR` is left alone so that URLs containing a dollar sign survive.
/// `field` names the setting in error messages.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let lookup = |name: &str| -> Result<Option<String>, MissingVar> {
        std::env::var(name)
            .map(Some)
            .map_err(|_| MissingVar(name.to_owned()))
    };

    match shellexpand::env_with_context(value, lookup) {
        Ok(expanded) => Ok(expanded.into_owned()),
        Err(err) => Err(ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} is not set", err.cause.0),
        }),
    }
}
