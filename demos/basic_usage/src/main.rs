use std::{collections::BTreeMap, sync::Arc, thread, time::Duration};

use rolling_logger::{Level, LoggedError, Logger, LoggerLayer, Options};
use serde::Serialize;
use tracing_subscriber::layer::SubscriberExt;

#[derive(Serialize)]
struct Upstream {
    name: &'static str,
    weight: u32,
}

#[derive(Serialize)]
struct Route {
    path: &'static str,
    timeout_ms: u64,
    headers: BTreeMap<&'static str, &'static str>,
    upstreams: Vec<Upstream>,
}

fn sample_route() -> Route {
    Route {
        path: "/v1/payments",
        timeout_ms: 2500,
        headers: BTreeMap::from([("x-request-id", "abc-123")]),
        upstreams: vec![
            Upstream {
                name: "primary",
                weight: 90,
            },
            Upstream {
                name: "fallback",
                weight: 10,
            },
        ],
    }
}

fn handle_request(logger: &Logger, request: u32) -> Result<(), LoggedError> {
    let _timing = rolling_logger::timed!(logger);
    thread::sleep(Duration::from_millis(5));
    if request % 3 == 0 {
        return Err(rolling_logger::errorf!(logger, "request {request} failed"));
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logger = Arc::new(Logger::open(
        "demo.log",
        Options {
            log_level: Level::Trace,
            file_size_limit_mb: 1,
            max_backups: 3,
            ..Options::default()
        }
        .with_env_overrides()?,
    )?);

    let subscriber = tracing_subscriber::registry().with(LoggerLayer::new(Arc::clone(&logger)));
    tracing::subscriber::set_global_default(subscriber)?;

    for _ in 0..3 {
        rolling_logger::tracef!(logger, "This is trace message");
        rolling_logger::debugf!(logger, "This is debug message");
        rolling_logger::infof!(logger, "This is info message");
        rolling_logger::warnf!(logger, "This is warn message");
        let _ = rolling_logger::errorf!(logger, "This is error message");
        let _ = rolling_logger::fatalf!(logger, "This is fatal message");
        rolling_logger::truncate!(
            logger,
            Level::Info,
            16,
            "this is a truncate message log [{}]",
            "hello"
        );
        thread::sleep(Duration::from_millis(200));
    }

    rolling_logger::info!(logger, "This is info message level =", 1);
    rolling_logger::warnw!(logger, "This is warn message level =", 2, Some("Warnw"));
    tracing::info!(component = "bridge", "forwarded from tracing");

    let route = sample_route();
    rolling_logger::dump!(logger, route);
    rolling_logger::dump_struct!(logger, route);

    for request in 0..6 {
        if let Err(error) = handle_request(&logger, request) {
            rolling_logger::debugf!(logger, "recovered from: {error}");
        }
    }
    rolling_logger::infof!(logger, "report summary:\n{}", logger.report(None));

    logger.close()?;
    Ok(())
}
