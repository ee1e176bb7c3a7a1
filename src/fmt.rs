//! Compact formatting helpers for log output.

use std::cell::Cell;
use std::fmt;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use crate::types::Time;

thread_local! {
    static SIM_CLOCK: Cell<Option<Time>> = const { Cell::new(None) };
}

/// Current simulated clock of the run on this thread, if one is active.
pub fn sim_clock() -> Option<Time> {
    SIM_CLOCK.with(|c| c.get())
}

/// Publish the simulated clock for the log formatter. Called by the engine
/// before logging; `None` once the run is over.
pub fn set_sim_clock(t: Option<Time>) {
    SIM_CLOCK.with(|c| c.set(t));
}

/// Fixed-width simulated timestamp: `[    12.500]`, or `[         -]`
/// outside a run.
pub struct FmtTime(pub Option<Time>);

impl fmt::Display for FmtTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(t) => write!(f, "[{t:>10.3}]"),
            None => write!(f, "[{:>10}]", "-"),
        }
    }
}

/// Custom event formatter that shows simulated time instead of wall-clock
/// time and uses plain colored text (no italic/background).
pub struct SimFormat;

impl<S, N> FormatEvent<S, N> for SimFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        // Simulated clock, or a dash between runs
        write!(writer, "{} ", FmtTime(sim_clock()))?;

        let level = *event.metadata().level();
        if writer.has_ansi_escapes() {
            let color = match level {
                Level::ERROR => "\x1b[31m",
                Level::WARN => "\x1b[33m",
                Level::INFO => "\x1b[32m",
                Level::DEBUG => "\x1b[34m",
                Level::TRACE => "\x1b[35m",
            };
            write!(writer, "{color}{level:>5}\x1b[0m ")?;
        } else {
            write!(writer, "{level:>5} ")?;
        }

        let mut fields = FieldCollector::default();
        event.record(&mut fields);
        fields.write_to(&mut writer)?;
        writeln!(writer)
    }
}

/// Message plus `key=value` pairs of one event. Floats are printed with
/// three decimals so times, frequencies and energies line up with the
/// clock column.
#[derive(Default)]
struct FieldCollector {
    message: String,
    fields: Vec<(&'static str, String)>,
}

impl FieldCollector {
    fn push(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = value;
        } else {
            self.fields.push((field.name(), value));
        }
    }

    fn write_to(&self, writer: &mut Writer<'_>) -> fmt::Result {
        write!(writer, "{}", self.message)?;
        for (key, value) in &self.fields {
            write!(writer, " {key}={value}")?;
        }
        Ok(())
    }
}

impl Visit for FieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.push(field, format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field, value.to_string());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.push(field, format!("{value:.3}"));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push(field, value.to_string());
    }
}

/// Install the `RUST_LOG`-filtered subscriber with [`SimFormat`]. Safe to
/// call more than once; later calls are ignored.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .event_format(SimFormat)
        .try_init();
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn test_fmt_time() {
        assert_eq!(FmtTime(Some(0.0)).to_string(), "[     0.000]");
        assert_eq!(FmtTime(Some(12.5)).to_string(), "[    12.500]");
        assert_eq!(FmtTime(None).to_string(), "[         -]");
    }

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_event_line_layout() {
        let capture = Capture::default();
        let sink = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .event_format(SimFormat)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            set_sim_clock(Some(2.5));
            tracing::info!(task = 3i64, freq = 2.0, late = false, "run");
            set_sim_clock(None);
            tracing::warn!(left = 2u64, "deadlock");
        });

        let out = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        assert_eq!(
            out,
            "[     2.500]  INFO run task=3 freq=2.000 late=false\n\
             [         -]  WARN deadlock left=2\n"
        );
    }

    #[test]
    fn test_sim_clock_is_thread_local() {
        set_sim_clock(Some(3.0));
        assert_eq!(sim_clock(), Some(3.0));
        std::thread::spawn(|| assert_eq!(sim_clock(), None))
            .join()
            .unwrap();
        set_sim_clock(None);
        assert_eq!(sim_clock(), None);
    }
}
