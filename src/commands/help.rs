//! `waqtbar help [COMMAND]`

use anyhow::Result;

/// Brief usage line for a command, shown after a parse error.
pub fn show_command_usage(command: &str) {
    match command {
        "status" | "st" => log_block_start!("Usage: waqtbar status [--json]"),
        "city" | "c" => log_block_start!("Usage: waqtbar city \"City, Country\" [--no-verify]"),
        "simulate" | "S" => {
            log_block_start!("Usage: waqtbar simulate <start> <end> [multiplier] [--log]")
        }
        "help" | "h" => log_block_start!("Usage: waqtbar help [COMMAND]"),
        _ => log_block_start!("Usage: waqtbar [OPTIONS] [COMMAND]"),
    }
}

pub fn run_help_command(command: Option<&str>) -> Result<()> {
    match command {
        None => display_general_help(),
        Some("status") | Some("st") => super::status::display_help(),
        Some("city") | Some("c") => super::city::display_help(),
        Some("simulate") | Some("S") => super::simulate::display_help(),
        Some("help") | Some("h") => display_help_help(),
        Some(unknown) => {
            log_warning!("Unknown command: {unknown}");
            display_general_help();
        }
    }
    Ok(())
}

pub fn display_general_help() {
    log_version!();
    log_block_start!("Available Commands:");
    log_indented!("status, st [--json]         Show today's prayer schedule");
    log_indented!("city, c <City, Country>     Choose the location for prayer times");
    log_indented!("simulate, S <start> <end>   Run against a simulated clock");
    log_indented!("help, h [COMMAND]           Show detailed help for a command");
    log_pipe!();
    log_info!("Use 'waqtbar help <command>' to see detailed help for a specific command.");
    log_indented!("Use 'waqtbar --help' to see all options and general usage.");
    log_end!();
}

fn display_help_help() {
    log_version!();
    log_block_start!("help - Display help information");
    log_block_start!("Usage: waqtbar help [COMMAND]");
    log_block_start!("Arguments:");
    log_indented!("COMMAND  Optional command to get help for");
    log_indented!("         If omitted, shows general help");
    log_block_start!("Examples:");
    log_indented!("waqtbar help");
    log_indented!("waqtbar help city");
    log_end!();
}
