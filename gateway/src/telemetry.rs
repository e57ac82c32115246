//! Logging, tracing and metrics setup.
//!
//! [`Telemetry::register`] always installs a `tracing` subscriber with an
//! [`EnvFilter`] and a console formatter. With the `telemetry` feature, OTLP
//! trace and metric exporters are added when `OTEL_EXPORTER_OTLP_*` variables
//! are present in the environment.

use std::time::Duration;

use axum::http::{Request, Response};
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultOnRequest, MakeSpan, OnResponse, TraceLayer};
use tracing::Span;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(feature = "telemetry")]
mod otel {
    use std::env;
    use std::time::Duration;

    use opentelemetry::{KeyValue, global};
    use opentelemetry_sdk::{
        Resource,
        metrics::{MeterProviderBuilder, PeriodicReader, SdkMeterProvider},
        trace::{RandomIdGenerator, Sampler, SdkTracerProvider},
    };
    use opentelemetry_semantic_conventions::{
        SCHEMA_URL,
        attribute::{DEPLOYMENT_ENVIRONMENT_NAME, SERVICE_VERSION},
    };

    /// Supported OTLP transport protocols.
    #[derive(Debug, Clone, Copy)]
    pub(super) enum OtlpProtocol {
        Http,
        Grpc,
    }

    /// Detects the OTLP protocol. `None` when OTLP export is not configured.
    pub(super) fn detect_protocol() -> Option<OtlpProtocol> {
        let is_enabled = ["OTEL_EXPORTER_OTLP_ENDPOINT", "OTEL_EXPORTER_OTLP_HEADERS", "OTEL_EXPORTER_OTLP_PROTOCOL"]
            .iter()
            .any(|key| env::var(key).is_ok());
        is_enabled.then(|| match env::var("OTEL_EXPORTER_OTLP_PROTOCOL").as_deref() {
            Ok("grpc") => OtlpProtocol::Grpc,
            _ => OtlpProtocol::Http,
        })
    }

    fn env_or(key: &str, fallback: Option<&str>) -> Option<String> {
        env::var(key)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| fallback.map(str::to_owned))
    }

    pub(super) fn resource(name: Option<&str>, version: Option<&str>) -> Resource {
        let mut builder = Resource::builder();
        if let Some(name) = env_or("OTEL_SERVICE_NAME", name) {
            builder = builder.with_service_name(name);
        }
        let mut attributes = Vec::<KeyValue>::with_capacity(2);
        if let Some(version) = env_or("OTEL_SERVICE_VERSION", version) {
            attributes.push(KeyValue::new(SERVICE_VERSION, version));
        }
        if let Some(deployment) = env_or("OTEL_SERVICE_DEPLOYMENT", None) {
            attributes.push(KeyValue::new(DEPLOYMENT_ENVIRONMENT_NAME, deployment));
        }
        if !attributes.is_empty() {
            builder = builder.with_schema_url(attributes, SCHEMA_URL);
        }
        builder.build()
    }

    pub(super) fn tracer(protocol: OtlpProtocol, resource: Resource) -> Option<SdkTracerProvider> {
        let exporter = match protocol {
            OtlpProtocol::Http => opentelemetry_otlp::SpanExporter::builder().with_http().build(),
            OtlpProtocol::Grpc => opentelemetry_otlp::SpanExporter::builder().with_tonic().build(),
        }
        .ok()?;

        Some(
            SdkTracerProvider::builder()
                .with_sampler(Sampler::ParentBased(Box::new(Sampler::TraceIdRatioBased(1.0))))
                .with_id_generator(RandomIdGenerator::default())
                .with_resource(resource)
                .with_batch_exporter(exporter)
                .build(),
        )
    }

    pub(super) fn meter(protocol: OtlpProtocol, resource: Resource) -> Option<SdkMeterProvider> {
        let exporter = match protocol {
            OtlpProtocol::Http => opentelemetry_otlp::MetricExporter::builder()
                .with_http()
                .build(),
            OtlpProtocol::Grpc => opentelemetry_otlp::MetricExporter::builder()
                .with_tonic()
                .build(),
        }
        .ok()?;

        let reader = PeriodicReader::builder(exporter)
            .with_interval(Duration::from_secs(30))
            .build();
        let provider = MeterProviderBuilder::default()
            .with_resource(resource)
            .with_reader(reader)
            .build();
        global::set_meter_provider(provider.clone());
        Some(provider)
    }
}

/// Service identity and log filter for the process-wide subscriber.
#[derive(Debug, Default)]
pub struct Telemetry {
    name: Option<String>,
    version: Option<String>,
    log_level: Option<String>,
}

impl Telemetry {
    /// Creates a new, empty [`Telemetry`] instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the service name reported to OTLP collectors.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the service version reported to OTLP collectors.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the filter used when `RUST_LOG` is not set (e.g. `"gateway=debug"`).
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = Some(level.into());
        self
    }

    fn filter(&self) -> EnvFilter {
        let fallback = self.log_level.as_deref().unwrap_or("info");
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
    }

    /// Installs the global subscriber.
    ///
    /// Returns a [`TelemetryGuard`] that flushes exporters on drop.
    #[cfg(feature = "telemetry")]
    pub fn register(self) -> TelemetryGuard {
        use opentelemetry::trace::TracerProvider;
        use tracing_opentelemetry::{MetricsLayer, OpenTelemetryLayer};

        let protocol = otel::detect_protocol();
        let (tracer_provider, meter_provider) = protocol.map_or((None, None), |p| {
            let resource = otel::resource(self.name.as_deref(), self.version.as_deref());
            (otel::tracer(p, resource.clone()), otel::meter(p, resource))
        });

        let otel_layer = tracer_provider
            .as_ref()
            .map(|tp| OpenTelemetryLayer::new(tp.tracer("gateway")));
        let metrics_layer = meter_provider
            .as_ref()
            .map(|mp| MetricsLayer::new(mp.clone()));

        tracing_subscriber::registry()
            .with(self.filter())
            .with(tracing_subscriber::fmt::layer())
            .with(metrics_layer)
            .with(otel_layer)
            .init();

        if protocol.is_some() {
            tracing::info!("OpenTelemetry exporters registered");
        } else {
            tracing::debug!("OpenTelemetry is not configured, console logging only");
        }

        TelemetryGuard {
            tracer_provider,
            meter_provider,
        }
    }

    /// Installs the global subscriber.
    #[cfg(not(feature = "telemetry"))]
    pub fn register(self) -> TelemetryGuard {
        tracing_subscriber::registry()
            .with(self.filter())
            .with(tracing_subscriber::fmt::layer())
            .init();
        TelemetryGuard {}
    }
}

/// Owns the exporter providers; shuts them down on drop.
#[derive(Debug)]
pub struct TelemetryGuard {
    #[cfg(feature = "telemetry")]
    tracer_provider: Option<opentelemetry_sdk::trace::SdkTracerProvider>,
    #[cfg(feature = "telemetry")]
    meter_provider: Option<opentelemetry_sdk::metrics::SdkMeterProvider>,
}

#[cfg(feature = "telemetry")]
impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(ref tp) = self.tracer_provider
            && let Err(err) = tp.shutdown()
        {
            tracing::error!(?err, "tracer provider shutdown error");
        }
        if let Some(ref mp) = self.meter_provider
            && let Err(err) = mp.shutdown()
        {
            tracing::error!(?err, "meter provider shutdown error");
        }
    }
}

/// HTTP tracing layer type produced by [`http_trace_layer`].
pub type HttpTraceLayer = TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    HttpMakeSpan,
    DefaultOnRequest,
    HttpOnResponse,
>;

/// One `http_request` span per request, closed with status and latency.
#[must_use]
pub fn http_trace_layer() -> HttpTraceLayer {
    TraceLayer::new_for_http()
        .make_span_with(HttpMakeSpan)
        .on_response(HttpOnResponse)
}

/// Span maker for HTTP requests.
#[derive(Clone, Copy, Debug)]
pub struct HttpMakeSpan;

impl<B> MakeSpan<B> for HttpMakeSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        tracing::info_span!(
            "http_request",
            otel.kind = "server",
            otel.name = %format!("{} {}", request.method(), request.uri().path()),
            method = %request.method(),
            path = %request.uri().path(),
            status = tracing::field::Empty,
        )
    }
}

/// Records the response status on the request span.
#[derive(Clone, Copy, Debug)]
pub struct HttpOnResponse;

impl<B> OnResponse<B> for HttpOnResponse {
    fn on_response(self, response: &Response<B>, latency: Duration, span: &Span) {
        let status = response.status();
        span.record("status", status.as_u16());

        #[cfg(feature = "telemetry")]
        {
            use opentelemetry::trace::Status;
            use tracing_opentelemetry::OpenTelemetrySpanExt;

            if status.is_success() {
                span.set_status(Status::Ok);
            } else {
                span.set_status(Status::error(
                    status.canonical_reason().unwrap_or("unknown").to_owned(),
                ));
            }
        }

        tracing::info!(
            status = status.as_u16(),
            elapsed_ms = latency.as_millis(),
            "request finished"
        );
    }
}
