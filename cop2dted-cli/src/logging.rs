//! Console logging setup.
//!
//! Events are written to stderr as `[LEVEL] message key=value` lines so the
//! summary on stdout stays machine readable. When a progress bar is active it
//! is hidden while each line is written.

use std::fmt;
use std::io::{self, IsTerminal, Write};

use indicatif::ProgressBar;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Event formatter producing `[INFO] ...` style lines.
pub struct BracketedLevel;

impl<S, N> FormatEvent<S, N> for BracketedLevel
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(writer, "[{}] ", event.metadata().level())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Writer that suspends a progress bar around every write.
pub struct SuspendingWriter<W> {
    bar: Option<ProgressBar>,
    inner: W,
}

impl<W: Write> SuspendingWriter<W> {
    pub fn new(bar: Option<ProgressBar>, inner: W) -> Self {
        Self { bar, inner }
    }
}

impl<W: Write> Write for SuspendingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &self.bar {
            Some(bar) => bar.suspend(|| self.inner.write(buf)),
            None => self.inner.write(buf),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match &self.bar {
            Some(bar) => bar.suspend(|| self.inner.write_all(buf)),
            None => self.inner.write_all(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Stderr sink for the fmt layer, aware of the progress bar.
#[derive(Clone, Default)]
pub struct ConsoleWriter {
    bar: Option<ProgressBar>,
}

impl<'a> MakeWriter<'a> for ConsoleWriter {
    type Writer = SuspendingWriter<io::Stderr>;

    fn make_writer(&'a self) -> Self::Writer {
        SuspendingWriter::new(self.bar.clone(), io::stderr())
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the default `info`.
///
/// Colours are only used when stderr is a terminal.
pub fn init(bar: Option<ProgressBar>) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(BracketedLevel)
                .with_ansi(io::stderr().is_terminal())
                .with_writer(ConsoleWriter { bar }),
        )
        .init();
}
