//! Command-line argument parsing and processing.
//!
//! Hand-rolled parser supporting the standard help, version and debug flags
//! plus a custom configuration directory, gracefully handling unknown
//! options.

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run the engine with these settings
    Run {
        debug_enabled: bool,
        config_dir: Option<String>,
    },
    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to unknown arguments and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

impl ParsedArgs {
    /// Parse command-line arguments into a structured result.
    ///
    /// # Arguments
    /// * `args` - Iterator over command-line arguments (typically from std::env::args())
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut debug_enabled = false;
        let mut display_help = false;
        let mut display_version = false;
        let mut unknown_arg_found = false;
        let mut config_dir: Option<String> = None;

        let args_vec: Vec<String> = args
            .into_iter()
            .skip(1)
            .map(|s| s.as_ref().to_string())
            .collect();

        let mut i = 0;
        while i < args_vec.len() {
            match args_vec[i].as_str() {
                "-d" | "--debug" => debug_enabled = true,
                "-h" | "--help" => display_help = true,
                "-V" | "--version" => display_version = true,
                "-c" | "--config" => {
                    if i + 1 < args_vec.len() {
                        config_dir = Some(args_vec[i + 1].clone());
                        i += 1;
                    } else {
                        unknown_arg_found = true;
                    }
                }
                _ => unknown_arg_found = true,
            }
            i += 1;
        }

        let action = if display_help {
            CliAction::ShowHelp
        } else if display_version {
            CliAction::ShowVersion
        } else if unknown_arg_found {
            CliAction::ShowHelpDueToError
        } else {
            CliAction::Run {
                debug_enabled,
                config_dir,
            }
        };

        ParsedArgs { action }
    }
}

pub fn display_version_info() {
    log_version!();
    println!("┗ {}", env!("CARGO_PKG_DESCRIPTION"));
}

pub fn display_help() {
    log_version!();
    log_block_start!(env!("CARGO_PKG_DESCRIPTION"));
    log_block_start!("Usage:");
    log_indented!("luxr [OPTIONS]");
    log_block_start!("Options:");
    log_indented!("-c, --config <dir>     Use custom configuration directory");
    log_indented!("-d, --debug            Enable detailed debug output");
    log_indented!("-h, --help             Print help information");
    log_indented!("-V, --version          Print version information");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_invocation_runs_with_defaults() {
        let parsed = ParsedArgs::parse(["luxr"]);
        assert_eq!(
            parsed.action,
            CliAction::Run {
                debug_enabled: false,
                config_dir: None,
            }
        );
    }

    #[test]
    fn debug_and_config_flags() {
        let parsed = ParsedArgs::parse(["luxr", "--debug", "--config", "/tmp/luxr"]);
        assert_eq!(
            parsed.action,
            CliAction::Run {
                debug_enabled: true,
                config_dir: Some("/tmp/luxr".to_string()),
            }
        );
    }

    #[test]
    fn help_takes_precedence() {
        let parsed = ParsedArgs::parse(["luxr", "--debug", "--help"]);
        assert_eq!(parsed.action, CliAction::ShowHelp);
    }

    #[test]
    fn unknown_flag_shows_help() {
        let parsed = ParsedArgs::parse(["luxr", "--bogus"]);
        assert_eq!(parsed.action, CliAction::ShowHelpDueToError);
    }

    #[test]
    fn config_without_value_is_an_error() {
        let parsed = ParsedArgs::parse(["luxr", "--config"]);
        assert_eq!(parsed.action, CliAction::ShowHelpDueToError);
    }
}
