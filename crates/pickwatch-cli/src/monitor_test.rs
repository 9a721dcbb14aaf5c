use std::io;
use std::sync::{Arc, Mutex};

use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pickwatch_core::{parse_tasks, PacingWindow};

use super::*;

const FULFILLMENT: &str = "/shop/fulfillment-messages";
const PART: &str = "MG8H4CH/A";
const PAUSE_LOG: &str = "paused between devices";

fn test_monitor() -> Monitor {
    monitor_with_jitter(Jitter::none())
}

fn monitor_with_jitter(device_jitter: Jitter) -> Monitor {
    let client = StoreClient::new(5, 2, Jitter::none()).expect("client");
    let notifier = Notifier::new(5).expect("notifier");
    Monitor::new(client, notifier, device_jitter)
}

/// `tracing` output of the current thread, collected while the guard lives.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log buffer").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    fn count(&self, needle: &str) -> usize {
        let bytes = self.0.lock().expect("log buffer");
        String::from_utf8_lossy(&bytes).matches(needle).count()
    }
}

fn capture_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    (logs, tracing::subscriber::set_default(subscriber))
}

/// One task against `server`, with Bark pushes going to the same server.
fn task_for(server: &MockServer, devices_yaml: &str) -> MonitorTask {
    let yaml = format!(
        r#"
tasks:
  - name: shanghai
    country: CN
    base_url: "{uri}"
    location: "上海 上海 黄浦区"
    cron: "0 */5 * * * *"
    devices:
{devices_yaml}
"#,
        uri = server.uri()
    );
    parse_tasks(&yaml).expect("tasks parse").tasks.remove(0)
}

fn bark_device(server: &MockServer, code: &str, whitelist: &[&str]) -> String {
    let whitelist = whitelist
        .iter()
        .map(|w| format!("\"{w}\""))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        r#"      - device_code: "{code}"
        store_whitelist: [{whitelist}]
        push:
          - type: bark
            url: "{uri}"
            token: device-key
"#,
        uri = server.uri()
    )
}

fn store(name: &str, status: &str) -> serde_json::Value {
    json!({
        "storeName": name,
        "partsAvailability": {
            (PART): {
                "pickupDisplay": status,
                "pickupSearchQuote": "今天可取货",
                "messageTypes": { "regular": { "storePickupProductTitle": "iPhone 17 Pro" } }
            }
        }
    })
}

fn stores_body(stores: &[serde_json::Value]) -> serde_json::Value {
    json!({ "body": { "content": { "pickupMessage": { "stores": stores } } } })
}

async fn mount_fulfillment(server: &MockServer, part: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(FULFILLMENT))
        .and(query_param("parts.0", part))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn only_available_store_triggers_push() {
    let server = MockServer::start().await;
    mount_fulfillment(
        &server,
        PART,
        ResponseTemplate::new(200).set_body_json(stores_body(&[
            store("StoreA", "available"),
            store("StoreB", "ready-for-pickup"),
        ])),
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/push"))
        .and(body_string_contains("StoreA"))
        .and(body_string_contains("苹果商店监控"))
        .and(body_string_contains("状态:今天可取货"))
        .and(body_string_contains("暂无取货地址"))
        .and(body_string_contains("暂无联系电话"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "code": 200 })))
        .expect(1)
        .mount(&server)
        .await;

    let task = task_for(&server, &bark_device(&server, PART, &[]));
    let (logs, _guard) = capture_logs();
    let report = test_monitor()
        .check_device(&task, &task.devices[0])
        .await
        .expect("check succeeds");

    assert_eq!(logs.count("门店:"), 2, "one status line per store");
    assert_eq!(logs.count("门店:StoreA"), 1);
    assert_eq!(logs.count("门店:StoreB"), 1);
    assert_eq!(
        report,
        DeviceReport {
            stores: 2,
            available: 1,
            delivered: 1,
            failed: 0
        }
    );
}

#[tokio::test]
async fn whitelist_limits_evaluated_stores() {
    let server = MockServer::start().await;
    mount_fulfillment(
        &server,
        PART,
        ResponseTemplate::new(200).set_body_json(stores_body(&[
            store("Apple Oxford St", "unavailable"),
            store("Apple Covent Garden", "available"),
        ])),
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/push"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let task = task_for(&server, &bark_device(&server, PART, &["Oxford St"]));
    let report = test_monitor()
        .check_device(&task, &task.devices[0])
        .await
        .expect("check succeeds");

    assert_eq!(report.stores, 1);
    assert_eq!(report.available, 0);
}

#[tokio::test]
async fn missing_store_list_sends_nothing() {
    let server = MockServer::start().await;
    mount_fulfillment(
        &server,
        PART,
        ResponseTemplate::new(200)
            .set_body_json(json!({ "body": { "content": { "pickupMessage": {} } } })),
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/push"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let task = task_for(&server, &bark_device(&server, PART, &[]));
    let report = test_monitor()
        .check_device(&task, &task.devices[0])
        .await
        .expect("check succeeds");

    assert_eq!(report, DeviceReport::default());
}

#[tokio::test]
async fn empty_store_list_sends_nothing() {
    let server = MockServer::start().await;
    mount_fulfillment(
        &server,
        PART,
        ResponseTemplate::new(200).set_body_json(stores_body(&[])),
    )
    .await;

    let task = task_for(&server, &bark_device(&server, PART, &[]));
    let report = test_monitor()
        .check_device(&task, &task.devices[0])
        .await
        .expect("check succeeds");

    assert_eq!(report, DeviceReport::default());
}

#[tokio::test]
async fn failing_device_does_not_stop_the_next() {
    let server = MockServer::start().await;
    mount_fulfillment(&server, "BROKEN/A", ResponseTemplate::new(500)).await;
    mount_fulfillment(
        &server,
        PART,
        ResponseTemplate::new(200).set_body_json(stores_body(&[store("StoreA", "available")])),
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/push"))
        .and(body_string_contains("StoreA"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let devices = format!(
        "{}{}",
        bark_device(&server, "BROKEN/A", &[]),
        bark_device(&server, PART, &[])
    );
    let task = task_for(&server, &devices);

    test_monitor().run_task(&task).await;
}

#[tokio::test]
async fn invalid_cookie_is_a_device_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(FULFILLMENT))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut task = task_for(&server, &bark_device(&server, PART, &[]));
    task.cookie = Some("bad\ncookie".to_string());

    let result = test_monitor().check_device(&task, &task.devices[0]).await;
    assert!(matches!(result, Err(ScraperError::InvalidHeader { .. })));

    // The pass as a whole still completes.
    test_monitor().run_task(&task).await;
}

#[tokio::test]
async fn pauses_between_devices_but_not_after_the_last() {
    let server = MockServer::start().await;
    for part in ["A1/A", "B2/A", "C3/A"] {
        mount_fulfillment(
            &server,
            part,
            ResponseTemplate::new(200).set_body_json(stores_body(&[])),
        )
        .await;
    }

    let devices = ["A1/A", "B2/A", "C3/A"]
        .iter()
        .map(|part| bark_device(&server, part, &[]))
        .collect::<String>();
    let task = task_for(&server, &devices);

    let (logs, _guard) = capture_logs();
    monitor_with_jitter(Jitter::new(PacingWindow::new(20, 20)))
        .run_task(&task)
        .await;

    assert_eq!(logs.count(PAUSE_LOG), 2, "N - 1 pauses for N devices");
    let received = server.received_requests().await.expect("recording enabled");
    assert_eq!(received.len(), 3);
}

#[tokio::test]
async fn single_device_pass_never_pauses() {
    let server = MockServer::start().await;
    mount_fulfillment(
        &server,
        PART,
        ResponseTemplate::new(200).set_body_json(stores_body(&[])),
    )
    .await;

    let task = task_for(&server, &bark_device(&server, PART, &[]));
    let (logs, _guard) = capture_logs();
    monitor_with_jitter(Jitter::new(PacingWindow::new(20, 20)))
        .run_task(&task)
        .await;

    assert_eq!(logs.count(PAUSE_LOG), 0);
}
