//! Binary entry point: argument parsing and dispatch.

use anyhow::Result;

use luxr::Luxr;
use luxr::args::{self, CliAction, ParsedArgs};
use luxr::config;

fn main() -> Result<()> {
    let parsed_args = ParsedArgs::parse(std::env::args());

    match parsed_args.action {
        CliAction::ShowVersion => {
            args::display_version_info();
            Ok(())
        }
        CliAction::ShowHelp | CliAction::ShowHelpDueToError => {
            args::display_help();
            Ok(())
        }
        CliAction::Run {
            debug_enabled,
            config_dir,
        } => {
            config::set_config_dir(config_dir)?;
            Luxr::new(debug_enabled).run()
        }
    }
}
