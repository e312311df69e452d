//! `tracing` output routed to the browser console.

use std::io;
use tracing::Level;

pub const LOG_PREFIX: &str = "[HesabeApplePay]";

/// Buffers one formatted event and emits it as a single `console.log` line
#[derive(Debug, Default)]
pub struct ConsoleWriter {
    buffer: Vec<u8>,
}

impl ConsoleWriter {
    fn emit(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let line = format_line(&String::from_utf8_lossy(&self.buffer));
        self.buffer.clear();
        log_to_console(&line);
    }
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.emit();
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        self.emit();
    }
}

pub(crate) fn format_line(raw: &str) -> String {
    format!("{} {}", LOG_PREFIX, raw.trim_end())
}

#[cfg(target_arch = "wasm32")]
fn log_to_console(line: &str) {
    web_sys::console::log_1(&wasm_bindgen::JsValue::from_str(line));
}

#[cfg(not(target_arch = "wasm32"))]
fn log_to_console(line: &str) {
    eprintln!("{}", line);
}

/// Install the console subscriber when `debug` is set.
///
/// Safe to call more than once; only the first installation wins.
pub fn init_console_logging(debug: bool) {
    if !debug {
        return;
    }

    let installed = tracing_subscriber::fmt()
        .with_writer(ConsoleWriter::default)
        .with_max_level(Level::DEBUG)
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!("Console logging enabled");
    }
}
