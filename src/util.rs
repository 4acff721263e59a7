// Platform helpers: console logging, DOM listeners, clock and randomness.

use log::{Level, Log, Metadata, Record, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Event, EventTarget};

/// `log` backend writing to the browser console.
pub struct ConsoleLogger {
    level: Level,
}

static LOGGER: ConsoleLogger = ConsoleLogger {
    level: if cfg!(debug_assertions) {
        Level::Debug
    } else {
        Level::Info
    },
};

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg = JsValue::from_str(&format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            Level::Error => web_sys::console::error_1(&msg),
            Level::Warn => web_sys::console::warn_1(&msg),
            Level::Info => web_sys::console::info_1(&msg),
            Level::Debug | Level::Trace => web_sys::console::debug_1(&msg),
        }
    }

    fn flush(&self) {}
}

pub fn init_logging() {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(LOGGER.level.to_level_filter());
    }
}

/// Milliseconds since the epoch, as the browser sees it.
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// DOM listeners attached to one target; all removed again on drop.
pub struct EventListeners {
    target: EventTarget,
    attached: Vec<(&'static str, Closure<dyn FnMut(Event)>)>,
}

impl EventListeners {
    pub fn new(target: impl Into<EventTarget>) -> Self {
        Self {
            target: target.into(),
            attached: Vec::new(),
        }
    }

    pub fn listen(&mut self, event: &'static str, handler: impl FnMut(Event) + 'static) {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        if let Err(err) = self
            .target
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        {
            warn!("could not listen for {event}: {err:?}");
            return;
        }
        self.attached.push((event, closure));
    }
}

impl Drop for EventListeners {
    fn drop(&mut self) {
        for (event, closure) in &self.attached {
            let _ = self
                .target
                .remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        }
    }
}

/// Uniform samples in `[0, 1)`.
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;

    /// Uniform integer in `lo..=hi`; `lo` when the range is empty.
    fn range_u32(&mut self, lo: u32, hi: u32) -> u32 {
        if hi <= lo {
            return lo;
        }
        let span = (hi - lo + 1) as f64;
        let pick = (self.next_f64() * span).floor() as u32;
        lo + pick.min(hi - lo)
    }
}

/// Browser randomness via `Math.random()`.
#[derive(Default, Debug, Clone, Copy)]
pub struct JsRandom;

impl RandomSource for JsRandom {
    fn next_f64(&mut self) -> f64 {
        js_sys::Math::random()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::SequenceRandom;
    use super::RandomSource;

    #[test]
    fn range_covers_both_ends() {
        let mut rng = SequenceRandom::new(&[0.0, 0.999_999]);
        assert_eq!(rng.range_u32(15, 30), 15);
        assert_eq!(rng.range_u32(15, 30), 30);
    }

    #[test]
    fn empty_range_returns_low() {
        let mut rng = SequenceRandom::new(&[0.7]);
        assert_eq!(rng.range_u32(1500, 1500), 1500);
        assert_eq!(rng.range_u32(9, 3), 9);
    }
}
