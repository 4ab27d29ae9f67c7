//! Tracing subscriber setup, custom formatters, dynamic log level reload.

use tracing_subscriber::{reload, EnvFilter};

// Global reload handle for dynamic log level changes
pub type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;
pub static RELOAD_HANDLE: std::sync::OnceLock<ReloadHandle> = std::sync::OnceLock::new();

/// Map a user-facing level name to an EnvFilter directive.
/// CRITICAL maps to ERROR (most severe tracing level).
pub fn filter_for_level(level: &str) -> Option<&'static str> {
    match level.trim().to_lowercase().as_str() {
        "critical" => Some("error"),
        "error" => Some("error"),
        "warn" | "warning" => Some("warn"),
        "info" => Some("info"),
        "debug" => Some("debug"),
        "trace" => Some("trace"),
        _ => None,
    }
}

/// Swap the active filter of the global subscriber.
pub fn reload_level(level: &str) -> anyhow::Result<&'static str> {
    let handle = RELOAD_HANDLE
        .get()
        .ok_or_else(|| anyhow::anyhow!("tracing not initialized"))?;
    reload_with(handle, level)
}

/// Swap the filter behind `handle`. An unknown level leaves it untouched.
pub fn reload_with(handle: &ReloadHandle, level: &str) -> anyhow::Result<&'static str> {
    let filter = filter_for_level(level)
        .ok_or_else(|| anyhow::anyhow!("invalid log level '{}'", level))?;
    handle.reload(EnvFilter::new(filter))?;
    Ok(filter)
}

// Custom time formatter for logs: "YYYY-MM-DD HH:MM:SS" (local time)
pub struct LocalTimeFormatter;

impl tracing_subscriber::fmt::time::FormatTime for LocalTimeFormatter {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        #[cfg(unix)]
        unsafe {
            let now = libc::time(std::ptr::null_mut());
            let mut tm: libc::tm = std::mem::zeroed();
            libc::localtime_r(&now, &mut tm);

            write!(w, "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                tm.tm_year + 1900,
                tm.tm_mon + 1,
                tm.tm_mday,
                tm.tm_hour,
                tm.tm_min,
                tm.tm_sec)
        }

        #[cfg(not(unix))]
        {
            write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"))
        }
    }
}

// "YYYY-MM-DD HH:MM:SS [LEVEL] message key=value"
pub struct CustomEventFormat;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for CustomEventFormat
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        use tracing_subscriber::fmt::time::FormatTime;

        LocalTimeFormatter.format_time(&mut writer)?;
        write!(writer, " ")?;

        let level = event.metadata().level();
        if writer.has_ansi_escapes() {
            let level_color = match *level {
                tracing::Level::TRACE => "\x1b[2m",  // Dim/gray
                tracing::Level::DEBUG => "\x1b[34m", // Blue
                tracing::Level::INFO => "\x1b[32m",  // Green
                tracing::Level::WARN => "\x1b[33m",  // Yellow
                tracing::Level::ERROR => "\x1b[31m", // Red
            };
            write!(writer, "{}[{}]\x1b[0m ", level_color, level)?;
        } else {
            write!(writer, "[{}] ", level)?;
        }

        // message plus structured fields (from=Manual to=Degraded ...)
        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

/// Initialize the tracing subscriber with reload capability.
/// Colors only when stdout is a terminal; journald gets plain text.
pub fn init_tracing(filter: &str) {
    use std::io::IsTerminal;
    use tracing_subscriber::prelude::*;

    let env_filter = EnvFilter::new(filter);
    let (filter_layer, reload_handle) = reload::Layer::new(env_filter);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(std::io::stdout().is_terminal())
                .with_timer(LocalTimeFormatter)
                .with_target(false)
                .with_level(true)
                .fmt_fields(tracing_subscriber::fmt::format::DefaultFields::new())
                .event_format(CustomEventFormat)
        )
        .init();

    let _ = RELOAD_HANDLE.set(reload_handle);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn maps_level_names() {
        assert_eq!(filter_for_level("INFO"), Some("info"));
        assert_eq!(filter_for_level("Debug"), Some("debug"));
        assert_eq!(filter_for_level("trace"), Some("trace"));
        assert_eq!(filter_for_level(" WARN "), Some("warn"));
        assert_eq!(filter_for_level("ERROR"), Some("error"));
    }

    #[test]
    fn critical_is_error() {
        assert_eq!(filter_for_level("CRITICAL"), Some("error"));
    }

    #[test]
    fn unknown_level_is_rejected() {
        assert_eq!(filter_for_level("verbose"), None);
        assert_eq!(filter_for_level(""), None);
    }

    fn handle_at(level: &str) -> (impl tracing::Subscriber, ReloadHandle) {
        use tracing_subscriber::prelude::*;
        let (layer, handle) = reload::Layer::new(EnvFilter::new(level));
        (tracing_subscriber::registry().with(layer), handle)
    }

    fn active_level(handle: &ReloadHandle) -> Option<LevelFilter> {
        handle.with_current(|f| f.max_level_hint()).ok().flatten()
    }

    #[test]
    fn reload_swaps_active_filter() {
        let (_subscriber, handle) = handle_at("info");

        assert_eq!(reload_with(&handle, "DEBUG").unwrap(), "debug");
        assert_eq!(active_level(&handle), Some(LevelFilter::DEBUG));

        assert_eq!(reload_with(&handle, "critical").unwrap(), "error");
        assert_eq!(active_level(&handle), Some(LevelFilter::ERROR));
    }

    #[test]
    fn reload_rejects_bad_level_and_keeps_filter() {
        let (_subscriber, handle) = handle_at("warn");

        assert!(reload_with(&handle, "loud").is_err());
        assert_eq!(active_level(&handle), Some(LevelFilter::WARN));
    }
}
