use crate::settings::{JaegerSettings, TracingSettings};
use opentelemetry::{
    global,
    sdk::{propagation::TraceContextPropagator, trace},
    trace::TraceError,
};
use std::fmt;
use tracing::error;
use tracing_log::LogTracer;
use tracing_subscriber::{fmt as tracing_fmt, layer::SubscriberExt, EnvFilter};

#[derive(Debug)]
pub enum Error {
    Logger {
        context: String,
        source: tracing_log::log::SetLoggerError,
    },
    Subscriber {
        context: String,
        source: tracing::subscriber::SetGlobalDefaultError,
    },
    Exporter {
        context: String,
        source: TraceError,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Logger { context, source } => {
                write!(fmt, "Log Bridge Error: {context} | {source}")
            }
            Error::Subscriber { context, source } => {
                write!(fmt, "Tracing Subscriber Error: {context} | {source}")
            }
            Error::Exporter { context, source } => {
                write!(fmt, "Trace Exporter Error: {context} | {source}")
            }
        }
    }
}

impl std::error::Error for Error {}

/// Initialize tracing: apply an `EnvFilter` using the `RUST_LOG` environment variable to define the
/// log levels, falling back to the configured level, add a formatter layer writing to stdout, and,
/// when a Jaeger agent is configured, an OpenTelemetry layer exporting trace data.
pub fn init_tracing(settings: TracingSettings) -> Result<(), Error> {
    let TracingSettings { level, jaeger } = settings;

    LogTracer::init().map_err(|err| Error::Logger {
        context: "Could not redirect log records to tracing".to_string(),
        source: err,
    })?;

    let filter_layer = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::Registry::default()
        .with(filter_layer)
        .with(tracing_fmt::Layer::new().with_writer(std::io::stdout));

    let res = match jaeger {
        Some(jaeger) => {
            let tracer = jaeger_tracer(&jaeger)?;
            let telemetry = tracing_opentelemetry::layer().with_tracer(tracer);
            tracing::subscriber::set_global_default(subscriber.with(telemetry))
        }
        None => tracing::subscriber::set_global_default(subscriber),
    };

    res.map_err(|err| Error::Subscriber {
        context: "Could not set the global tracing subscriber".to_string(),
        source: err,
    })
}

fn jaeger_tracer(settings: &JaegerSettings) -> Result<trace::Tracer, Error> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // Ignored when a handler is already installed.
    let _ = global::set_error_handler(|error| error!(error = format!("{error:#}"), "otel error"));

    opentelemetry_jaeger::new_agent_pipeline()
        .with_endpoint(&settings.endpoint)
        .with_service_name(&settings.service_name)
        .install_simple()
        .map_err(|err| Error::Exporter {
            context: format!("Could not install jaeger tracer for {}", settings.endpoint),
            source: err,
        })
}
