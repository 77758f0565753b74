mod common;

use common::FakeServer;
use netatmo_collector::config::{InfluxSettings, SinkBackend};
use netatmo_collector::models::{FieldValue, MeasurementPoint};
use netatmo_collector::writers::{write_points, SinkConfig};
use netatmo_collector::ProcessingError;
use std::time::Duration;

fn sink_config(port: u16, user: &str) -> SinkConfig {
    SinkConfig {
        backend: SinkBackend::Influxdb,
        influxdb: Some(InfluxSettings {
            host: "127.0.0.1".to_string(),
            port,
            user: user.to_string(),
            password: "pw".to_string(),
            database: "weather".to_string(),
            ssl: false,
        }),
        timeout: Duration::from_secs(5),
    }
}

fn points() -> Vec<MeasurementPoint> {
    let mut temperature = MeasurementPoint::new("u140rwkt", 1_574_079_580_000);
    temperature
        .fields
        .insert("temperature".to_string(), FieldValue::Float(7.7));
    temperature
        .fields
        .insert("humidity".to_string(), FieldValue::Integer(95));

    let mut pressure = MeasurementPoint::new("u140rwkt", 1_574_079_594_000);
    pressure
        .fields
        .insert("pressure".to_string(), FieldValue::Float(1009.5));

    vec![temperature, pressure]
}

#[tokio::test]
async fn test_batch_written_in_one_request() {
    let server = FakeServer::start(|_| (204, String::new())).await;

    let written = write_points(&points(), &sink_config(server.port(), "writer"))
        .await
        .unwrap();

    assert_eq!(written, 2);
    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].path(), "/ping");

    let write = &requests[1];
    assert_eq!(write.method, "POST");
    assert_eq!(write.path(), "/write");
    assert!(write.target.contains("db=weather"));
    assert!(write.target.contains("precision=ms"));
    assert!(write
        .header("authorization")
        .unwrap_or_default()
        .starts_with("Basic "));
    assert_eq!(
        write.body,
        "weather,geohash=u140rwkt humidity=95i,temperature=7.7 1574079580000\n\
         weather,geohash=u140rwkt pressure=1009.5 1574079594000"
    );
}

#[tokio::test]
async fn test_anonymous_write_sends_no_credentials() {
    let server = FakeServer::start(|_| (204, String::new())).await;

    write_points(&points(), &sink_config(server.port(), ""))
        .await
        .unwrap();

    let requests = server.requests();
    assert!(requests[1].header("authorization").is_none());
}

#[tokio::test]
async fn test_rejected_write_is_sink_write_error() {
    let server = FakeServer::start(|request| {
        if request.path() == "/ping" {
            (204, String::new())
        } else {
            (
                400,
                r#"{"error":"field type conflict: input field \"humidity\" is type float"}"#
                    .to_string(),
            )
        }
    })
    .await;

    let err = write_points(&points(), &sink_config(server.port(), "writer"))
        .await
        .unwrap_err();

    assert!(matches!(err, ProcessingError::SinkWrite(ref message) if message.contains("400")));
    assert_eq!(err.category(), "sink");
}

#[tokio::test]
async fn test_failed_ping_is_connection_error() {
    let server = FakeServer::start(|_| (500, "{}".to_string())).await;

    let err = write_points(&points(), &sink_config(server.port(), "writer"))
        .await
        .unwrap_err();

    assert!(matches!(err, ProcessingError::SinkConnection { .. }));
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn test_unencodable_batch_stores_nothing() {
    let server = FakeServer::start(|_| (204, String::new())).await;
    let mut point = MeasurementPoint::new("u140rwkt", 1_574_079_580_000);
    point
        .fields
        .insert("temperature".to_string(), FieldValue::Float(f64::NAN));

    let written = write_points(&[point], &sink_config(server.port(), "writer"))
        .await
        .unwrap();

    assert_eq!(written, 0);
    assert!(server.requests().iter().all(|r| r.path() != "/write"));
}
