//! Run configuration.
//!
//! Precedence: command line flags, then `HEMLOCK_STDLIB`, then defaults.

use std::path::PathBuf;

use hml_eval::DEFAULT_MAX_CALL_DEPTH;

/// Environment variable naming the stdlib directory.
pub const STDLIB_ENV: &str = "HEMLOCK_STDLIB";

/// Settings for one program run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfig {
    /// Entry source file.
    pub entry: PathBuf,
    /// Stdlib directory, overriding discovery.
    pub stdlib: Option<PathBuf>,
    /// Limit on nested user-function calls.
    pub max_call_depth: usize,
}

impl RunConfig {
    pub fn new(entry: impl Into<PathBuf>) -> Self {
        RunConfig {
            entry: entry.into(),
            stdlib: None,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    /// Build a configuration from the arguments after `run`.
    ///
    /// Accepts `--stdlib=<dir>` and `--max-depth=<n>` in any position; the
    /// first non-flag argument is the entry file. `HEMLOCK_STDLIB` is read
    /// only when no `--stdlib` flag was given.
    pub fn from_args(args: &[String]) -> Result<Self, String> {
        Self::from_args_with_env(args, std::env::var_os(STDLIB_ENV).map(PathBuf::from))
    }

    fn from_args_with_env(args: &[String], env_stdlib: Option<PathBuf>) -> Result<Self, String> {
        let mut entry = None;
        let mut stdlib = None;
        let mut max_call_depth = DEFAULT_MAX_CALL_DEPTH;

        for arg in args {
            if let Some(dir) = arg.strip_prefix("--stdlib=") {
                stdlib = Some(PathBuf::from(dir));
            } else if let Some(depth) = arg.strip_prefix("--max-depth=") {
                max_call_depth = match depth.parse::<usize>() {
                    Ok(depth) if depth > 0 => depth,
                    _ => return Err(format!("invalid --max-depth value '{depth}'")),
                };
            } else if arg.starts_with('-') {
                return Err(format!("unknown option '{arg}'"));
            } else if entry.is_none() {
                entry = Some(PathBuf::from(arg));
            } else {
                return Err(format!("unexpected argument '{arg}'"));
            }
        }

        let Some(entry) = entry else {
            return Err("missing file path".to_string());
        };
        Ok(RunConfig {
            entry,
            stdlib: stdlib.or(env_stdlib),
            max_call_depth,
        })
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_defaults() {
        let config = RunConfig::from_args_with_env(&args(&["main.hml"]), None).unwrap();
        assert_eq!(config, RunConfig::new("main.hml"));
    }

    #[test]
    fn test_flags_in_any_position() {
        let config = RunConfig::from_args_with_env(
            &args(&["--max-depth=20", "main.hml", "--stdlib=/opt/std"]),
            None,
        )
        .unwrap();
        assert_eq!(config.entry, PathBuf::from("main.hml"));
        assert_eq!(config.stdlib, Some(PathBuf::from("/opt/std")));
        assert_eq!(config.max_call_depth, 20);
    }

    #[test]
    fn test_flag_beats_environment() {
        let env = Some(PathBuf::from("/env/std"));
        let config =
            RunConfig::from_args_with_env(&args(&["a.hml", "--stdlib=/flag/std"]), env.clone())
                .unwrap();
        assert_eq!(config.stdlib, Some(PathBuf::from("/flag/std")));

        let config = RunConfig::from_args_with_env(&args(&["a.hml"]), env).unwrap();
        assert_eq!(config.stdlib, Some(PathBuf::from("/env/std")));
    }

    #[test]
    fn test_errors() {
        assert!(RunConfig::from_args_with_env(&args(&[]), None).is_err());
        assert!(RunConfig::from_args_with_env(&args(&["a.hml", "--max-depth=x"]), None).is_err());
        assert!(RunConfig::from_args_with_env(&args(&["a.hml", "--max-depth=0"]), None).is_err());
        assert!(RunConfig::from_args_with_env(&args(&["a.hml", "--fast"]), None).is_err());
        assert!(RunConfig::from_args_with_env(&args(&["a.hml", "b.hml"]), None).is_err());
    }
}
