//! Integration Test: サイクル → Pushgateway
//!
//! フェイクDBと実際のPushgatewayクライアント（wiremock相手）で1サイクルを通す。

use std::sync::Arc;
use std::time::Duration;

use sharewatch::common::types::Project;
use sharewatch::config::{BackoffPolicy, ScheduleConfig};
use sharewatch::db::SharesStore;
use sharewatch::metrics::PushgatewayPublisher;
use sharewatch::probe::{ContinuityProbe, ProbeContext, Step};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::support::{MemoryShares, StaticDistributor};

fn probe(server: &MockServer, instance: Option<&str>) -> ContinuityProbe {
    let distributor = StaticDistributor::default()
        .with_epoch(Project::Aleo, 10)
        .with_epoch(Project::QuaiGarden, 100);
    let aleo: Arc<dyn SharesStore> = Arc::new(MemoryShares(vec![8, 9, 10, 11, 12, 13]));
    let quai: Arc<dyn SharesStore> = Arc::new(MemoryShares(vec![100, 101, 103, 104]));
    let publisher = PushgatewayPublisher::new(&server.uri(), Duration::from_secs(5)).unwrap();

    ContinuityProbe::new(
        ProbeContext {
            distributor: Arc::new(distributor),
            shares: vec![(Project::Aleo, aleo), (Project::QuaiGarden, quai)],
            publisher: Arc::new(publisher),
            instance: instance.map(str::to_string),
        },
        ScheduleConfig {
            interval: Duration::from_secs(300),
            backoff: BackoffPolicy::Fixed(Duration::from_secs(10)),
        },
    )
}

#[tokio::test]
async fn test_cycle_pushes_one_gauge_per_project() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/metrics/job/aleo/instance/oula-jumpserver"))
        .and(body_string_contains("aleo_shares_continuity_status 1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/metrics/job/quai/instance/oula-jumpserver"))
        .and(body_string_contains("quai_shares_continuity_status 0"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let report = probe(&server, Some("oula-jumpserver")).run_cycle().await;

    assert!(report.outcomes.iter().all(|o| o.published));
    assert!(!report.all_healthy());
    assert!(!report.needs_retry());
}

#[tokio::test]
async fn test_cycle_without_instance_label() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/metrics/job/aleo"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/metrics/job/quai"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let report = probe(&server, None).run_cycle().await;

    assert!(report.outcomes.iter().all(|o| o.published));
}

#[tokio::test]
async fn test_aleo_push_rejected_quai_still_published() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/metrics/job/aleo/instance/oula-jumpserver"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/metrics/job/quai/instance/oula-jumpserver"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let report = probe(&server, Some("oula-jumpserver")).run_cycle().await;

    let aleo = report.outcome(Project::Aleo).unwrap();
    assert!(!aleo.published);
    assert_eq!(aleo.failures[0].step, Step::Publish);
    assert_eq!(aleo.failures[0].kind, "publish");
    assert!(report.outcome(Project::QuaiGarden).unwrap().published);
}
