//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod new;
pub(crate) mod serve;
pub(crate) mod validate;

pub(crate) use build::BuildArgs;
pub(crate) use new::NewArgs;
pub(crate) use serve::ServeArgs;
pub(crate) use validate::ValidateArgs;
