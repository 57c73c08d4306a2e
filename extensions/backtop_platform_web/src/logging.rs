//! `tracing` output to the browser console.
//!
//! A reloadable level filter follows the persisted `logLevel` setting, so a
//! settings change (or the automatic downgrade) takes effect without
//! reinstalling the subscriber.

use std::cell::RefCell;
use std::io;

use backtop_control::LogLevel;
use tracing::{Level, Metadata};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, Registry};
use wasm_bindgen::JsValue;

type LevelHandle = reload::Handle<LevelFilter, Registry>;

thread_local! {
    static LEVEL: RefCell<Option<LevelHandle>> = const { RefCell::new(None) };
}

/// Install the console subscriber, or adjust its level if already installed
pub fn init(level: LogLevel) {
    if set_level(level) {
        return;
    }

    let (filter, handle) = reload::Layer::new(level.level_filter());
    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .without_time()
                .with_ansi(false)
                .with_target(false)
                .with_writer(ConsoleMakeWriter),
        )
        .try_init();

    match installed {
        Ok(()) => LEVEL.with(|slot| *slot.borrow_mut() = Some(handle)),
        Err(err) => web_sys::console::warn_1(&JsValue::from_str(&format!(
            "backtop: logging not installed: {}",
            err
        ))),
    }
}

/// Change the active level. Returns false when no subscriber is installed.
pub fn set_level(level: LogLevel) -> bool {
    LEVEL.with(|slot| match slot.borrow().as_ref() {
        Some(handle) => {
            if let Err(err) = handle.modify(|filter| *filter = level.level_filter()) {
                web_sys::console::warn_1(&JsValue::from_str(&format!(
                    "backtop: failed to change log level: {}",
                    err
                )));
            }
            true
        }
        None => false,
    })
}

struct ConsoleMakeWriter;

/// Buffers one formatted event and hands it to the console on drop
struct ConsoleWriter {
    level: Level,
    buffer: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.buffer);
        let text = text.trim_end();
        if text.is_empty() {
            return;
        }

        let message = JsValue::from_str(text);
        if self.level == Level::ERROR {
            web_sys::console::error_1(&message);
        } else if self.level == Level::WARN {
            web_sys::console::warn_1(&message);
        } else if self.level == Level::INFO {
            web_sys::console::info_1(&message);
        } else {
            web_sys::console::debug_1(&message);
        }
    }
}

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter {
            level: Level::INFO,
            buffer: Vec::new(),
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter {
            level: *meta.level(),
            buffer: Vec::new(),
        }
    }
}
