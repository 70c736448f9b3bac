//! Telemetry — structured logging and optional OpenTelemetry export.

use opentelemetry::trace::TracerProvider;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::TelemetryConfig;

/// Initialize the process-wide tracing subscriber.
///
/// Sets up an `EnvFilter` (defaulting to `info,a2a_server=debug,a2a_core=debug`,
/// overridable via `RUST_LOG`), a formatting layer (JSON or human-readable
/// per `config.json`), and, when `config.otlp_enabled`, an OTLP span
/// exporter layered on top.
pub fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,a2a_server=debug,a2a_core=debug"));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.otlp_enabled {
        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(&config.otlp_endpoint)
            .build()?;

        let resource = opentelemetry_sdk::Resource::new(vec![
            KeyValue::new("service.name", "a2a-server"),
            KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
        ]);

        let provider = opentelemetry_sdk::trace::TracerProvider::builder()
            .with_simple_exporter(exporter)
            .with_resource(resource)
            .build();

        let tracer = provider.tracer("a2a-server");

        if config.json {
            let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer.clone());
            registry
                .with(tracing_subscriber::fmt::layer().json().with_target(true))
                .with(otel_layer)
                .init();
        } else {
            let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer.clone());
            registry
                .with(tracing_subscriber::fmt::layer().with_target(true))
                .with(otel_layer)
                .init();
        }
    } else if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }

    Ok(())
}
