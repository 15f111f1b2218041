//! CLI dispatch. Application logic lives in the library crate.

use anyhow::Result;

use waqtbar::args::{CliAction, ParsedArgs};
use waqtbar::common::constants::EXIT_FAILURE;
use waqtbar::{Waqtbar, args, commands, config, log_error_exit, time_source};

fn main() {
    if let Err(e) = run() {
        log_error_exit!("{e}");
        for cause in e.chain().skip(1) {
            eprintln!("  caused by: {cause}");
        }
        std::process::exit(EXIT_FAILURE);
    }
}

fn run() -> Result<()> {
    match ParsedArgs::from_env().action {
        CliAction::ShowVersion => {
            args::display_version_info();
            Ok(())
        }
        CliAction::ShowHelp => {
            args::display_help();
            Ok(())
        }
        CliAction::ShowHelpDueToError(command) => {
            match command {
                Some(command) => commands::help::show_command_usage(&command),
                None => args::display_help(),
            }
            std::process::exit(EXIT_FAILURE);
        }
        CliAction::Help(command) => commands::help::run_help_command(command.as_deref()),
        CliAction::Run {
            debug_enabled,
            config_dir,
        } => {
            config::set_config_dir(config_dir)?;
            let result = Waqtbar::new(debug_enabled).run();
            if result.is_ok() {
                waqtbar::log_end!();
            }
            result
        }
        CliAction::Status {
            json,
            debug_enabled,
            config_dir,
        } => {
            config::set_config_dir(config_dir)?;
            commands::status::handle_status_command(json, debug_enabled)
        }
        CliAction::City {
            selection,
            no_verify,
            config_dir,
        } => {
            config::set_config_dir(config_dir)?;
            commands::city::handle_city_command(&selection, no_verify)
        }
        CliAction::Simulate {
            start_time,
            end_time,
            multiplier,
            log_to_file,
            debug_enabled,
            config_dir,
        } => {
            config::set_config_dir(config_dir)?;
            let mut guard = commands::simulate::handle_simulate_command(
                &start_time,
                &end_time,
                multiplier,
                debug_enabled,
                log_to_file,
            )?;

            Waqtbar::new(debug_enabled)
                .without_lock()
                .without_headers()
                .simulated()
                .run()?;

            if time_source::simulation_ended() {
                guard.complete_simulation();
            }
            Ok(())
        }
    }
}
