// Process-level I/O: signals, the instance lock, notifications and the terminal
pub mod lock;
pub mod notify;
pub mod signals;
pub mod status_line;
