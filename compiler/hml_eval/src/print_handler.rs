//! Destination for `print` output.
//!
//! Programs normally print to stdout. Tests and embedders capture output in
//! a buffer instead, and the silent handler drops it. Dispatch is a plain
//! enum match.

use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;

/// Where `print` writes.
pub enum PrintHandlerImpl {
    /// Writes to stdout (default).
    Stdout,
    /// Captures to an in-memory buffer.
    Buffer(Mutex<String>),
    /// Discards all output.
    Silent,
}

impl PrintHandlerImpl {
    /// Print a line (with newline).
    pub fn println(&self, msg: &str) {
        match self {
            Self::Stdout => {
                let mut out = std::io::stdout().lock();
                // A closed stdout is not a program error.
                let _ = writeln!(out, "{msg}");
            }
            Self::Buffer(buf) => {
                let mut buf = buf.lock();
                buf.push_str(msg);
                buf.push('\n');
            }
            Self::Silent => {}
        }
    }

    /// Print without newline.
    pub fn print(&self, msg: &str) {
        match self {
            Self::Stdout => {
                let mut out = std::io::stdout().lock();
                let _ = write!(out, "{msg}");
                let _ = out.flush();
            }
            Self::Buffer(buf) => buf.lock().push_str(msg),
            Self::Silent => {}
        }
    }

    /// Captured output. Empty for handlers that don't capture.
    pub fn get_output(&self) -> String {
        match self {
            Self::Buffer(buf) => buf.lock().clone(),
            Self::Stdout | Self::Silent => String::new(),
        }
    }

    /// Clear captured output.
    pub fn clear(&self) {
        if let Self::Buffer(buf) = self {
            buf.lock().clear();
        }
    }
}

/// Shared print handler that can be passed around.
pub type SharedPrintHandler = Arc<PrintHandlerImpl>;

/// Create a default stdout print handler.
pub fn stdout_handler() -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Stdout)
}

/// Create a buffer print handler for capturing output.
pub fn buffer_handler() -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Buffer(Mutex::new(String::new())))
}

/// Create a silent print handler that discards all output.
pub fn silent_handler() -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Silent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_handler_println_captures_with_newline() {
        let handler = buffer_handler();
        handler.println("hello");
        assert_eq!(handler.get_output(), "hello\n");
    }

    #[test]
    fn buffer_handler_mixes_print_and_println() {
        let handler = buffer_handler();
        handler.print("hello");
        handler.print(" ");
        handler.println("world");
        assert_eq!(handler.get_output(), "hello world\n");
    }

    #[test]
    fn buffer_handler_clear_empties_buffer() {
        let handler = buffer_handler();
        handler.println("hello");
        handler.clear();
        assert!(handler.get_output().is_empty());
    }

    #[test]
    fn non_capturing_handlers_report_empty_output() {
        let silent = silent_handler();
        silent.println("dropped");
        assert_eq!(silent.get_output(), "");
        assert_eq!(stdout_handler().get_output(), "");
    }

    #[test]
    fn shared_handler_sees_all_writers() {
        let handler = buffer_handler();
        let other = Arc::clone(&handler);
        handler.println("a");
        other.println("b");
        assert_eq!(handler.get_output(), "a\nb\n");
    }
}
