//! Command-line argument parsing.
//!
//! Global flags (`--debug`, `--config`) may appear anywhere. The first bare
//! word selects a subcommand and the remaining words are its arguments.

/// What the binary should do after parsing.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run the status-line widget.
    Run {
        debug_enabled: bool,
        config_dir: Option<String>,
    },
    /// Print today's schedule once.
    Status {
        json: bool,
        debug_enabled: bool,
        config_dir: Option<String>,
    },
    /// Store a new location in the configuration.
    City {
        selection: String,
        no_verify: bool,
        config_dir: Option<String>,
    },
    /// Run the loop against a simulated clock.
    Simulate {
        start_time: String,
        end_time: String,
        multiplier: f64,
        log_to_file: bool,
        debug_enabled: bool,
        config_dir: Option<String>,
    },
    /// `help [COMMAND]`
    Help(Option<String>),
    ShowHelp,
    ShowVersion,
    /// Unknown or malformed arguments; carries the usage key to print.
    ShowHelpDueToError(Option<String>),
}

pub struct ParsedArgs {
    pub action: CliAction,
}

impl ParsedArgs {
    /// Parse `args`, whose first element is the program name.
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args_vec: Vec<String> = args
            .into_iter()
            .skip(1)
            .map(|s| s.as_ref().to_string())
            .collect();

        ParsedArgs {
            action: parse_action(&args_vec),
        }
    }

    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }
}

fn parse_action(args: &[String]) -> CliAction {
    let mut debug_enabled = false;
    let mut config_dir: Option<String> = None;
    let mut flags: Vec<&str> = Vec::new();
    let mut words: Vec<&str> = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--debug" | "-d" => debug_enabled = true,
            "--config" | "-c" => match iter.next() {
                Some(dir) => config_dir = Some(dir.clone()),
                None => return CliAction::ShowHelpDueToError(None),
            },
            flag if flag.starts_with('-') && flag.len() > 1 && !is_number(flag) => {
                flags.push(flag)
            }
            word => words.push(word),
        }
    }

    // Help and version win over everything else.
    if flags.iter().any(|f| matches!(*f, "--version" | "-V" | "-v")) {
        return CliAction::ShowVersion;
    }
    if flags.iter().any(|f| matches!(*f, "--help" | "-h")) {
        return CliAction::ShowHelp;
    }

    let Some((&command, rest)) = words.split_first() else {
        if !flags.is_empty() {
            log_warning!("Unknown option: {}", flags[0]);
            return CliAction::ShowHelpDueToError(None);
        }
        return CliAction::Run {
            debug_enabled,
            config_dir,
        };
    };

    let unexpected = |allowed: &[&str]| flags.iter().find(|f| !allowed.contains(*f)).copied();

    match command {
        "status" | "st" => {
            if let Some(flag) = unexpected(&["--json", "-j"]) {
                log_warning!("Unknown option for status: {flag}");
                return CliAction::ShowHelpDueToError(Some("status".into()));
            }
            if !rest.is_empty() {
                return CliAction::ShowHelpDueToError(Some("status".into()));
            }
            CliAction::Status {
                json: !flags.is_empty(),
                debug_enabled,
                config_dir,
            }
        }
        "city" | "c" => {
            if let Some(flag) = unexpected(&["--no-verify"]) {
                log_warning!("Unknown option for city: {flag}");
                return CliAction::ShowHelpDueToError(Some("city".into()));
            }
            if rest.is_empty() {
                return CliAction::ShowHelpDueToError(Some("city".into()));
            }
            CliAction::City {
                // Unquoted "waqtbar city Cairo, Egypt" arrives as two words.
                selection: rest.join(" "),
                no_verify: !flags.is_empty(),
                config_dir,
            }
        }
        "simulate" | "S" => {
            if let Some(flag) = unexpected(&["--log"]) {
                log_warning!("Unknown option for simulate: {flag}");
                return CliAction::ShowHelpDueToError(Some("simulate".into()));
            }
            let (start_time, end_time, multiplier) = match rest {
                [start, end] => (start, end, 0.0),
                [start, end, multiplier] => match multiplier.parse::<f64>() {
                    Ok(m) if m.is_finite() && m >= 0.0 => (start, end, m),
                    _ => {
                        log_warning!("Invalid multiplier: {multiplier}");
                        return CliAction::ShowHelpDueToError(Some("simulate".into()));
                    }
                },
                _ => return CliAction::ShowHelpDueToError(Some("simulate".into())),
            };
            CliAction::Simulate {
                start_time: start_time.to_string(),
                end_time: end_time.to_string(),
                multiplier,
                log_to_file: !flags.is_empty(),
                debug_enabled,
                config_dir,
            }
        }
        "help" | "h" => match rest {
            [] => CliAction::Help(None),
            [topic] => CliAction::Help(Some(topic.to_string())),
            _ => CliAction::ShowHelpDueToError(Some("help".into())),
        },
        unknown => {
            log_warning!("Unknown command: {unknown}");
            CliAction::ShowHelpDueToError(None)
        }
    }
}

fn is_number(arg: &str) -> bool {
    arg.parse::<f64>().is_ok()
}

pub fn display_version_info() {
    log_version!();
    log_pipe!();
    println!("┗ {}", env!("CARGO_PKG_DESCRIPTION"));
}

pub fn display_help() {
    log_version!();
    log_block_start!(env!("CARGO_PKG_DESCRIPTION"));
    log_block_start!("Usage:");
    log_indented!("waqtbar [OPTIONS] [COMMAND]");
    log_block_start!("Options:");
    log_indented!("-c, --config <dir>     Use custom configuration directory");
    log_indented!("-d, --debug            Enable detailed debug output");
    log_indented!("-h, --help             Print help information");
    log_indented!("-V, --version          Print version information");
    log_block_start!("Commands:");
    log_indented!("status, st [--json]    Show today's prayer schedule");
    log_indented!("city, c <City, Country> Choose the location");
    log_indented!("simulate, S <start> <end> [multiplier] [--log]");
    log_indented!("                       Run against a simulated clock");
    log_indented!("help, h [COMMAND]      Show detailed help for a command");
    log_end!();
}
