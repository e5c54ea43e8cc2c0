//! Interactive source-root resolution.

use std::io::{self, Write};
use std::path::PathBuf;
use x4vro::config::RootResolver;

/// Fills in missing source roots by asking on stdin, standing in for the
/// directory picker a desktop tool would show.
pub struct PromptResolver;

impl RootResolver for PromptResolver {
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        print!("{name} root directory: ");
        io::stdout().flush().ok()?;

        let mut line = String::new();
        io::stdin().read_line(&mut line).ok()?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(PathBuf::from(trimmed))
        }
    }
}

/// Reads roots from `X4VRO_ROOT_<NAME>` environment variables, e.g.
/// `X4VRO_ROOT_VRO_BASE` for the `vro_base` source.
pub struct EnvResolver;

impl RootResolver for EnvResolver {
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        let var = format!("X4VRO_ROOT_{}", name.to_uppercase());
        std::env::var_os(var).map(PathBuf::from)
    }
}

/// Tries the environment first, then asks on stdin.
pub struct EnvThenPrompt;

impl RootResolver for EnvThenPrompt {
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        EnvResolver
            .resolve(name)
            .or_else(|| PromptResolver.resolve(name))
    }
}
