//! Pushgatewayクライアント
//!
//! ゲージを1本だけ持つレジストリをテキスト形式にエンコードし、
//! `PUT /metrics/job/<job>[/instance/<instance>]` で送信する。

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use prometheus::{Encoder, Opts, Registry, TextEncoder};
use reqwest::{Client, Url};
use tracing::debug;

use super::MetricPublisher;
use crate::common::error::{ProbeError, ProbeResult};
use crate::common::types::Gauge;

const GAUGE_HELP: &str = "Shares epoch continuity (1 = continuous, 0 = gap detected)";

/// Pushgatewayへのパブリッシャー
#[derive(Clone)]
pub struct PushgatewayPublisher {
    base_url: Url,
    client: Client,
    timeout: Duration,
}

impl PushgatewayPublisher {
    /// 新しいパブリッシャーを作成
    pub fn new(base_url: &str, timeout: Duration) -> ProbeResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ProbeError::Config(format!("invalid pushgateway URL {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ProbeError::Config(format!(
                "pushgateway URL cannot be a base: {base_url}"
            )));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProbeError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url,
            client,
            timeout,
        })
    }

    /// グルーピングキーを含むpush先URL
    pub fn push_url(&self, gauge: &Gauge) -> Url {
        let mut url = self.base_url.clone();
        {
            // cannot_be_a_base は new() で排除済み
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.pop_if_empty().push("metrics");
                push_label(&mut segments, "job", &gauge.job);
                if let Some(instance) = gauge.instance.as_deref() {
                    push_label(&mut segments, "instance", instance);
                }
            }
        }
        url
    }
}

/// ラベル値に `/` が含まれる場合はPushgatewayの `@base64` 形式を使う
fn push_label(segments: &mut url::PathSegmentsMut<'_>, name: &str, value: &str) {
    if value.is_empty() {
        segments.push(&format!("{name}@base64")).push("=");
    } else if value.contains('/') {
        segments
            .push(&format!("{name}@base64"))
            .push(&URL_SAFE_NO_PAD.encode(value));
    } else {
        segments.push(name).push(value);
    }
}

/// ゲージ1本をテキスト形式にエンコード
pub fn encode_gauge(gauge: &Gauge) -> ProbeResult<Vec<u8>> {
    let registry = Registry::new();
    let metric = prometheus::Gauge::with_opts(Opts::new(gauge.name.clone(), GAUGE_HELP))
        .map_err(|e| ProbeError::Publish(format!("invalid gauge {}: {e}", gauge.name)))?;
    metric.set(gauge.value);
    registry
        .register(Box::new(metric))
        .map_err(|e| ProbeError::Publish(format!("failed to register gauge: {e}")))?;

    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&registry.gather(), &mut buffer)
        .map_err(|e| ProbeError::Publish(format!("failed to encode gauge: {e}")))?;
    Ok(buffer)
}

#[async_trait]
impl MetricPublisher for PushgatewayPublisher {
    async fn push(&self, gauge: &Gauge) -> ProbeResult<()> {
        let url = self.push_url(gauge);
        let body = encode_gauge(gauge)?;

        let response = self
            .client
            .put(url.clone())
            .header(reqwest::header::CONTENT_TYPE, TextEncoder::new().format_type())
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProbeError::Timeout {
                        operation: "metric push",
                        after: self.timeout,
                    }
                } else {
                    ProbeError::Publish(format!("{url}: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ProbeError::Publish(format!(
                "{url}: HTTP {status} {}",
                detail.trim()
            )));
        }

        debug!(url = %url, metric = %gauge.name, value = gauge.value, "Metric pushed");
        Ok(())
    }
}
