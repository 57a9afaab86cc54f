use std::fmt;
use std::fmt::Write;
use std::path::PathBuf;

use tracing_appender::non_blocking::{NonBlocking, NonBlockingBuilder, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{format::FmtSpan, time::FormatTime, Layer as FmtLayer};
use tracing_subscriber::layer::Layered;
use tracing_subscriber::{prelude::*, registry::Registry, EnvFilter};

mod fanout;

use super::app_config::config;
use super::error::Result;
use fanout::Fanout;

pub mod prelude {
    pub use tracing::{debug, error, info, trace, warn};
    pub use tracing::{debug_span, error_span, info_span, trace_span, warn_span};
    pub use tracing::{event, field::Empty, instrument, span};
}

/// Subscriber the output layers sit on: the registry behind the global filter
type Filtered = Layered<EnvFilter, Registry>;

/// Install the global subscriber as described by the `logging` config section.
///
/// `produces_output` tells whether the command prints results to stdout, in
/// which case terminal outputs with `auto_switch` move to stderr.
pub fn setup(produces_output: bool) -> Result<LoggingGuard> {
    let cfg: LoggingConfig = config().get("logging")?;
    LoggingGuard::install(&cfg, produces_output)
}

/// Flushes the non-blocking writers on drop, keep it alive in main
pub struct LoggingGuard {
    _worker_guards: Vec<WorkerGuard>,
}

impl LoggingGuard {
    fn install(cfg: &LoggingConfig, produces_output: bool) -> Result<Self> {
        let mut worker_guards = vec![];
        let mut outputs = Fanout::<Filtered>::new();

        for output in cfg.outputs.iter().filter(|o| o.enabled) {
            let span_events = output
                .span_events
                .iter()
                .fold(FmtSpan::NONE, |f, e| f | (*e).into());

            let (writer, guard) = output.target.to_writer(produces_output);
            worker_guards.push(guard);

            outputs.push(
                FmtLayer::default()
                    .with_ansi(output.target.supports_color())
                    .with_target(false)
                    .with_span_events(span_events)
                    .with_timer(ISOTimeFormat)
                    .with_writer(writer),
            );
        }

        Registry::default()
            .with(cfg.filter.to_env_filter())
            .with(outputs)
            .try_init()?;

        Ok(Self {
            _worker_guards: worker_guards,
        })
    }
}

struct ISOTimeFormat;

impl FormatTime for ISOTimeFormat {
    fn format_time(&self, w: &mut dyn Write) -> fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

// ====== Config to Layer ======

impl FilterConfig {
    pub fn to_env_filter(&self) -> EnvFilter {
        let filter = match &self.from_env {
            Some(env) => EnvFilter::from_env(env),
            None => EnvFilter::default(),
        };

        match &self.directives {
            Some(dirs) => dirs
                .split(',')
                .filter_map(|s| match s.parse() {
                    Ok(d) => Some(d),
                    Err(err) => {
                        eprintln!("ignoring `{}`: {}", s, err);
                        None
                    }
                })
                .fold(filter, |f, dir| f.add_directive(dir)),
            None => filter,
        }
    }
}

impl LoggingTarget {
    pub fn supports_color(&self) -> bool {
        match self {
            LoggingTarget::Term(_) => true,
            LoggingTarget::File(_) => false,
        }
    }

    pub fn to_writer(&self, produces_output: bool) -> (NonBlocking, WorkerGuard) {
        let builder = NonBlockingBuilder::default().lossy(false);
        match self {
            LoggingTarget::Term(term) => match term.name {
                TermTarget::Stdout if !(term.auto_switch && produces_output) => builder.finish(std::io::stdout()),
                _ => builder.finish(std::io::stderr()),
            },
            LoggingTarget::File(file) => builder.finish(RollingFileAppender::new(
                Rotation::NEVER,
                &file.directory,
                &file.name,
            )),
        }
    }
}

impl From<SpanEvent> for FmtSpan {
    fn from(e: SpanEvent) -> Self {
        match e {
            SpanEvent::New => FmtSpan::NEW,
            SpanEvent::Enter => FmtSpan::ENTER,
            SpanEvent::Exit => FmtSpan::EXIT,
            SpanEvent::Close => FmtSpan::CLOSE,
            SpanEvent::Active => FmtSpan::ACTIVE,
            SpanEvent::Full => FmtSpan::FULL,
        }
    }
}

// ====== Logging Config ======

#[derive(Debug, Default, serde::Deserialize)]
struct LoggingConfig {
    #[serde(default)]
    filter: FilterConfig,
    #[serde(default)]
    outputs: Vec<LoggingOutput>,
}

#[derive(Debug, serde::Deserialize)]
struct FilterConfig {
    #[serde(default)]
    directives: Option<String>,
    #[serde(default, deserialize_with = "deserialize_filter_from_env")]
    from_env: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct LoggingOutput {
    enabled: bool,
    #[serde(default)]
    span_events: Vec<SpanEvent>,
    target: LoggingTarget,
}

#[derive(Copy, Clone, Debug, serde::Deserialize)]
enum SpanEvent {
    New,
    Enter,
    Exit,
    Close,
    Active,
    Full,
}

#[derive(Debug, serde::Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "lowercase")]
enum LoggingTarget {
    Term(TermOutput),
    File(FileOutput),
}

#[derive(Debug, serde::Deserialize)]
struct TermOutput {
    name: TermTarget,
    #[serde(default)]
    auto_switch: bool,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
enum TermTarget {
    Stdout,
    Stderr,
}

#[derive(Debug, serde::Deserialize)]
struct FileOutput {
    directory: PathBuf,
    name: PathBuf,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            directives: Some("INFO".into()),
            from_env: Some("RUST_LOG".into()),
        }
    }
}

// ====== serde helpers ======

/// Deserialize `false` to `None`, `true` to `Some("RUST_LOG")`, and string to `Some(xxx)`
fn deserialize_filter_from_env<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct VisitFromEnv;

    impl<'de> serde::de::Visitor<'de> for VisitFromEnv {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("bool or env variable name")
        }

        fn visit_bool<E>(self, value: bool) -> std::result::Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(if value { Some("RUST_LOG".into()) } else { None })
        }

        fn visit_str<E>(self, value: &str) -> std::result::Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_owned()))
        }
    }

    deserializer.deserialize_any(VisitFromEnv)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_src: &str) -> LoggingConfig {
        let mut cfg = ::config::Config::new();
        cfg.merge(::config::File::from_str(toml_src, ::config::FileFormat::Toml))
            .unwrap();
        cfg.get("logging").unwrap()
    }

    #[test]
    fn from_env_accepts_bool_or_name() {
        let cfg = parse(
            r#"
            [logging.filter]
            directives = "shoesim=debug"
            from_env = false
            "#,
        );
        assert_eq!(cfg.filter.from_env, None);
        assert_eq!(cfg.filter.directives.as_deref(), Some("shoesim=debug"));
        assert!(cfg.outputs.is_empty());

        let cfg = parse(
            r#"
            [logging.filter]
            from_env = "SHOESIM_LOG"
            "#,
        );
        assert_eq!(cfg.filter.from_env.as_deref(), Some("SHOESIM_LOG"));
    }

    #[test]
    fn outputs_and_targets() {
        let cfg = parse(
            r#"
            [[logging.outputs]]
            enabled = true
            span_events = ["Close"]
            target = { type = "term", name = "stdout", auto_switch = true }

            [[logging.outputs]]
            enabled = false
            target = { type = "file", directory = "logs", name = "shoesim.log" }
            "#,
        );
        assert_eq!(cfg.outputs.len(), 2);
        match &cfg.outputs[0].target {
            LoggingTarget::Term(term) => assert!(term.auto_switch),
            other => panic!("unexpected target {:?}", other),
        }
        assert!(cfg.outputs[0].target.supports_color());
        assert!(!cfg.outputs[1].target.supports_color());
        assert!(!cfg.outputs[1].enabled);
    }
}
