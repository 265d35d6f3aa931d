//! Prometheus metrics for echowall-server
//!
//! A per-process registry with an HTTP request counter and latency
//! histogram, recorded by middleware and exposed at `GET /metrics`.

mod middleware;

pub use middleware::RequestMetrics;

use actix_web::{web, HttpResponse};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use crate::error::AppError;
use crate::AppState;

pub struct Metrics {
    registry: Registry,
    http_requests_total: IntCounterVec,
    http_request_duration_seconds: HistogramVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests processed"),
            &["path", "method", "status"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request latency in seconds",
            ),
            &["path", "method"],
        )?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
        })
    }

    pub fn observe_request(&self, path: &str, method: &str, status: u16, elapsed_secs: f64) {
        self.http_request_duration_seconds
            .with_label_values(&[path, method])
            .observe(elapsed_secs);
        self.http_requests_total
            .with_label_values(&[path, method, &status.to_string()])
            .inc();
    }

    /// Text exposition format for the scrape endpoint.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

pub async fn metrics_handler(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let body = state.metrics.render()?;
    Ok(HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_and_render() {
        let metrics = Metrics::new().unwrap();

        metrics.observe_request("/posts", "GET", 200, 0.004);
        metrics.observe_request("/posts", "GET", 200, 0.002);
        metrics.observe_request("/login", "POST", 401, 0.050);

        let rendered = metrics.render().unwrap();
        assert!(rendered.contains("http_requests_total"));
        assert!(rendered.contains("http_request_duration_seconds"));
        assert!(rendered.contains(r#"path="/posts""#));
        assert!(rendered.contains(r#"status="401""#));
        // Two GET /posts requests share one counter series.
        assert_eq!(
            metrics
                .http_requests_total
                .with_label_values(&["/posts", "GET", "200"])
                .get(),
            2
        );
    }
}
