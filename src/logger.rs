//! Structured logging with box-drawing output.
//!
//! Every macro funnels into [`emit`], which applies the simulated-time prefix,
//! clears a drawn status line and routes the text either to stdout or to the
//! file sink started by [`Log::start_file_logging`].
//!
//! ## Conventions
//!
//! - `log_version!` opens a session with `┏ waqtbar vX.Y.Z ━━╸`, `log_end!` closes it with `╹`.
//! - `log_block_start!` starts a new conceptual block (`┃` spacer, then `┣ message`).
//! - `log_decorated!` continues a block, `log_indented!` lists details under it.
//! - `log_pipe!` adds a bare `┃` spacer before a semantic-level message.
//! - `log_info!`, `log_warning!`, `log_error!`, `log_debug!`, `log_critical!` carry a `[LEVEL]` tag.
//! - `log_error_exit!` terminates a flow with `┗[ERROR]`.

use std::fmt;
use std::io::Write;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Sender, channel};

static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);

// Set while the terminal holds an unterminated status line.
static STATUS_LINE_DRAWN: AtomicBool = AtomicBool::new(false);

// Routes output to a file when `simulate --log` is active.
static LOG_CHANNEL: OnceLock<Sender<LogMessage>> = OnceLock::new();

enum LogMessage {
    Formatted(String),
    Shutdown,
}

/// Visual shape of one log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Version,
    End,
    Pipe,
    Block,
    Decorated,
    Indented,
    Level(Level),
    Exit,
}

/// Semantic level tag with its ANSI color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Debug,
    Warning,
    Error,
    Critical,
}

impl Level {
    fn tag(self) -> &'static str {
        match self {
            Level::Info => "\x1b[32mINFO\x1b[0m",
            Level::Debug => "\x1b[32mDEBUG\x1b[0m",
            Level::Warning => "\x1b[33mWARNING\x1b[0m",
            Level::Error => "\x1b[31mERROR\x1b[0m",
            Level::Critical => "\x1b[31mCRITICAL\x1b[0m",
        }
    }
}

pub struct Log;

impl Log {
    /// Enable or disable logging, e.g. for quiet tests.
    pub fn set_enabled(enabled: bool) {
        LOGGING_ENABLED.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled() -> bool {
        LOGGING_ENABLED.load(Ordering::SeqCst)
    }

    /// Mirror all further output into `file_path` instead of stdout.
    pub fn start_file_logging(file_path: String) -> anyhow::Result<LoggerGuard> {
        let (tx, rx) = channel();

        LOG_CHANNEL
            .set(tx.clone())
            .map_err(|_| anyhow::anyhow!("Logger channel already initialized"))?;

        let handle = std::thread::spawn(move || {
            let mut file = std::fs::File::create(&file_path)?;
            while let Ok(LogMessage::Formatted(text)) = rx.recv() {
                file.write_all(text.as_bytes())?;
            }
            file.flush()?;
            Ok::<(), anyhow::Error>(())
        });

        Ok(LoggerGuard {
            tx,
            handle: Some(handle),
        })
    }

    /// `[MM-DD HH:MM:SS] ` while a simulated clock is installed, empty otherwise.
    pub fn get_timestamp_prefix() -> String {
        if crate::time_source::is_initialized() && crate::time_source::is_simulated() {
            format!("[{}] ", crate::time_source::now().format("%m-%d %H:%M:%S"))
        } else {
            String::new()
        }
    }

    /// Record whether a status line is currently drawn without a trailing newline.
    pub fn set_status_line_drawn(drawn: bool) {
        STATUS_LINE_DRAWN.store(drawn, Ordering::SeqCst);
    }

    pub fn is_status_line_drawn() -> bool {
        STATUS_LINE_DRAWN.load(Ordering::SeqCst)
    }
}

/// Flushes and joins the file sink on drop.
pub struct LoggerGuard {
    tx: Sender<LogMessage>,
    handle: Option<std::thread::JoinHandle<anyhow::Result<()>>>,
}

impl Drop for LoggerGuard {
    fn drop(&mut self) {
        let _ = self.tx.send(LogMessage::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == 'm' {
                    break;
                }
            }
        } else {
            result.push(ch);
        }
    }

    result
}

/// Render one record in `style`. Used by the logging macros.
pub fn render(style: Style, prefix: &str, message: fmt::Arguments<'_>) -> String {
    match style {
        Style::Version => format!(
            "{prefix}┏ waqtbar v{} ━━╸\n",
            env!("CARGO_PKG_VERSION")
        ),
        Style::End => format!("{prefix}╹\n"),
        Style::Pipe => format!("{prefix}┃\n"),
        Style::Block => format!("{prefix}┃\n{prefix}┣ {message}\n"),
        Style::Decorated => format!("{prefix}┣ {message}\n"),
        Style::Indented => format!("{prefix}┃   {message}\n"),
        Style::Level(level) => format!("{prefix}┣[{}] {message}\n", level.tag()),
        Style::Exit => format!("{prefix}┃\n{prefix}┗[{}] {message}\n", Level::Error.tag()),
    }
}

/// Format and write one record. Used by the logging macros.
pub fn emit(style: Style, message: fmt::Arguments<'_>) {
    if !Log::is_enabled() {
        return;
    }
    let prefix = Log::get_timestamp_prefix();
    write_output(&render(style, &prefix, message));
}

pub fn write_output(text: &str) {
    if let Some(tx) = LOG_CHANNEL.get() {
        let _ = tx.send(LogMessage::Formatted(strip_ansi_codes(text)));
        return;
    }

    let mut stdout = std::io::stdout().lock();
    if STATUS_LINE_DRAWN.swap(false, Ordering::SeqCst) {
        let _ = write!(stdout, "\r\x1b[2K");
    }
    let _ = write!(stdout, "{text}");
    let _ = stdout.flush();
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log_with_style {
    ($style:expr; $fmt:literal $($arg:tt)*) => {
        $crate::logger::emit($style, format_args!($fmt $($arg)*))
    };
    ($style:expr; $expr:expr) => {
        $crate::logger::emit($style, format_args!("{}", $expr))
    };
}

/// Log a decorated message, typically continuing a block.
#[macro_export]
macro_rules! log_decorated {
    ($($arg:tt)+) => {
        $crate::__log_with_style!($crate::logger::Style::Decorated; $($arg)+)
    };
}

/// Log an indented detail line within a block.
#[macro_export]
macro_rules! log_indented {
    ($($arg:tt)+) => {
        $crate::__log_with_style!($crate::logger::Style::Indented; $($arg)+)
    };
}

/// Log a bare pipe for vertical spacing.
#[macro_export]
macro_rules! log_pipe {
    () => {
        $crate::logger::emit($crate::logger::Style::Pipe, format_args!(""))
    };
}

/// Start a new conceptual block.
#[macro_export]
macro_rules! log_block_start {
    ($($arg:tt)+) => {
        $crate::__log_with_style!($crate::logger::Style::Block; $($arg)+)
    };
}

/// Log the application version header.
#[macro_export]
macro_rules! log_version {
    () => {
        $crate::logger::emit($crate::logger::Style::Version, format_args!(""))
    };
}

/// Log the final termination marker.
#[macro_export]
macro_rules! log_end {
    () => {
        $crate::logger::emit($crate::logger::Style::End, format_args!(""))
    };
}

#[macro_export]
macro_rules! log_warning {
    ($($arg:tt)+) => {
        $crate::__log_with_style!(
            $crate::logger::Style::Level($crate::logger::Level::Warning); $($arg)+
        )
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)+) => {
        $crate::__log_with_style!(
            $crate::logger::Style::Level($crate::logger::Level::Error); $($arg)+
        )
    };
}

/// Log an error that ends the current flow.
#[macro_export]
macro_rules! log_error_exit {
    ($($arg:tt)+) => {
        $crate::__log_with_style!($crate::logger::Style::Exit; $($arg)+)
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)+) => {
        $crate::__log_with_style!(
            $crate::logger::Style::Level($crate::logger::Level::Info); $($arg)+
        )
    };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)+) => {
        $crate::__log_with_style!(
            $crate::logger::Style::Level($crate::logger::Level::Debug); $($arg)+
        )
    };
}

#[macro_export]
macro_rules! log_critical {
    ($($arg:tt)+) => {
        $crate::__log_with_style!(
            $crate::logger::Style::Level($crate::logger::Level::Critical); $($arg)+
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_ansi_codes() {
        assert_eq!(
            strip_ansi_codes("┣[\x1b[33mWARNING\x1b[0m] late"),
            "┣[WARNING] late"
        );
        assert_eq!(strip_ansi_codes("plain \x1b text"), "plain \x1b text");
    }

    #[test]
    fn test_render_shapes() {
        assert_eq!(render(Style::Pipe, "", format_args!("")), "┃\n");
        assert_eq!(
            render(Style::Block, "", format_args!("Commencing {}", "ASR")),
            "┃\n┣ Commencing ASR\n"
        );
        assert_eq!(
            render(Style::Indented, "[01-01 05:00:00] ", format_args!("x")),
            "[01-01 05:00:00] ┃   x\n"
        );
        assert!(
            render(Style::Version, "", format_args!(""))
                .starts_with("┏ waqtbar v")
        );
        assert_eq!(
            strip_ansi_codes(&render(Style::Exit, "", format_args!("boom"))),
            "┃\n┗[ERROR] boom\n"
        );
    }
}
