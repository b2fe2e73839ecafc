//! Session configuration and command-line flags.
//!
//! Flags are parsed by hand, one argument at a time; unknown flags are
//! reported and ignored so a typo never takes the REPL down.

/// What a failed construct leaves behind in the declaration table.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum DeclarationMode {
    /// Names declared before the checker failed stay declared.
    #[default]
    Partial,
    /// The table and type pool are restored to their state before the
    /// construct was submitted.
    Atomic,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionConfig {
    pub declaration_mode: DeclarationMode,
    /// Print the value of every top-level expression statement, calls
    /// included.
    pub calculator_mode: bool,
}

impl SessionConfig {
    /// Pick the session flags out of `args`. Flags that belong to the shell
    /// (`-q`, `-v`, ...) are skipped.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Self {
        let mut config = SessionConfig::default();
        for arg in args {
            match arg.as_ref() {
                "--calc" => config.calculator_mode = true,
                "--atomic" => config.declaration_mode = DeclarationMode::Atomic,
                _ => {}
            }
        }
        config
    }

    /// Apply `GI_CALC` from the environment.
    #[must_use]
    pub fn with_env(mut self) -> Self {
        if std::env::var("GI_CALC").is_ok_and(|v| is_truthy(&v)) {
            self.calculator_mode = true;
        }
        self
    }
}

/// Everything the `gi` binary reads from its arguments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CliOptions {
    pub session: SessionConfig,
    /// Suppress the banner.
    pub quiet: bool,
    pub help: bool,
    pub version: bool,
    /// Number of `-v` flags; `-vv` counts twice.
    pub verbosity: u8,
    /// Arguments that are not flags, in order.
    pub positional: Vec<String>,
    /// Flags nobody recognized.
    pub unknown: Vec<String>,
}

pub fn parse_cli_options(args: &[String]) -> CliOptions {
    let mut options = CliOptions {
        session: SessionConfig::from_args(args),
        ..CliOptions::default()
    };

    for arg in args {
        match arg.as_str() {
            "--calc" | "--atomic" => {}
            "-q" | "--quiet" => options.quiet = true,
            "-h" | "--help" => options.help = true,
            "-V" | "--version" => options.version = true,
            "-v" | "--verbose" => options.verbosity = options.verbosity.saturating_add(1),
            "-vv" => options.verbosity = options.verbosity.saturating_add(2),
            flag if flag.starts_with('-') && flag.len() > 1 => {
                options.unknown.push(flag.to_string());
            }
            _ => options.positional.push(arg.clone()),
        }
    }
    options
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.declaration_mode, DeclarationMode::Partial);
        assert!(!config.calculator_mode);
    }

    #[test]
    fn test_session_flags() {
        let config = SessionConfig::from_args(&["--calc", "-q", "--atomic"]);
        assert!(config.calculator_mode);
        assert_eq!(config.declaration_mode, DeclarationMode::Atomic);
    }

    #[test]
    fn test_cli_options() {
        let options = parse_cli_options(&args(&["translate", "-vv", "main.go", "-q", "--bogus"]));
        assert_eq!(options.positional, args(&["translate", "main.go"]));
        assert_eq!(options.verbosity, 2);
        assert!(options.quiet);
        assert_eq!(options.unknown, args(&["--bogus"]));
        assert_eq!(options.session, SessionConfig::default());
        assert!(!options.help && !options.version);
    }

    #[test]
    fn test_help_and_version_flags() {
        let options = parse_cli_options(&args(&["--version", "-h", "--calc"]));
        assert!(options.version);
        assert!(options.help);
        assert!(options.session.calculator_mode);
        assert!(options.unknown.is_empty());
    }

    #[test]
    fn test_lone_dash_is_positional() {
        let options = parse_cli_options(&args(&["translate", "-"]));
        assert_eq!(options.positional, args(&["translate", "-"]));
    }

    #[test]
    fn test_truthy_values() {
        assert!(is_truthy("1"));
        assert!(is_truthy(" Yes "));
        assert!(!is_truthy("0"));
        assert!(!is_truthy(""));
    }
}
