use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    trace::{DefaultOnBodyChunk, DefaultOnEos, MakeSpan, OnFailure, OnRequest, OnResponse, TraceLayer},
};

pub fn layer() -> TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    RequestSpan,
    RequestEvents,
    RequestEvents,
    DefaultOnBodyChunk,
    DefaultOnEos,
    RequestEvents,
> {
    TraceLayer::new_for_http()
        .make_span_with(RequestSpan)
        .on_request(RequestEvents)
        .on_response(RequestEvents)
        .on_failure(RequestEvents)
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct RequestSpan;

impl<B> MakeSpan<B> for RequestSpan {
    fn make_span(&mut self, req: &http::Request<B>) -> tracing::Span {
        let uri = req.uri();
        let span_name = format!("{} {}", req.method(), uri.path());
        let span = tracing::info_span!(
            parent: None,
            "http.server.request",
            "error.type" = tracing::field::Empty,
            "http.request.method" = %req.method(),
            "http.response.status_code" = tracing::field::Empty,
            "network.protocol.version" = ?req.version(),
            "otel.kind" = "server",
            "otel.name" = span_name,
            "otel.status_code" = tracing::field::Empty,
            "url.path" = uri.path(),
            "url.query" = tracing::field::Empty,
            "user_agent.original" = tracing::field::Empty,
        );
        if let Some(query) = uri.query() {
            span.record("url.query", query);
        }
        if let Some(agent) = req
            .headers()
            .get(http::header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
        {
            span.record("user_agent.original", agent);
        }
        span
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct RequestEvents;

impl<B> OnRequest<B> for RequestEvents {
    fn on_request(&mut self, _req: &http::Request<B>, _span: &tracing::Span) {
        tracing::debug!("request started");
    }
}

impl<B> OnResponse<B> for RequestEvents {
    fn on_response(
        self,
        res: &http::Response<B>,
        latency: std::time::Duration,
        span: &tracing::Span,
    ) {
        let status = res.status();
        span.record("http.response.status_code", status.as_u16());
        if status.is_client_error() {
            span.record("error.type", "client");
        }
        tracing::info!(
            status = status.as_u16(),
            latency_ms = latency.as_millis(),
            "request processed"
        );
    }
}

impl<F> OnFailure<F> for RequestEvents
where
    F: std::fmt::Display,
{
    fn on_failure(
        &mut self,
        failure_classification: F,
        latency: std::time::Duration,
        span: &tracing::Span,
    ) {
        span.record("error.type", "server");
        span.record("otel.status_code", "error");
        tracing::warn!(
            error = %failure_classification,
            latency_ms = latency.as_millis(),
            "request failed",
        );
    }
}
