use chrono::{NaiveDateTime, TimeZone, Utc};
use pi_thermolog::{
    rotation::TIMESTAMP_FORMAT, Boundary, Clock, DatedRotation, Monitor, MonitorConfig,
    MonitorError, RotationPolicy, Sampler, TimedRotation, Timezone, SHUTDOWN_MESSAGE,
};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time;

/// Sampler returning the same command output every time.
struct FixedSampler(&'static str);

impl Sampler for FixedSampler {
    async fn sample(&mut self) -> pi_thermolog::Result<f64> {
        pi_thermolog::parse_reading(self.0)
    }
}

/// Wall clock driven by tokio's paused time.
struct TokioClock {
    start: NaiveDateTime,
    origin: time::Instant,
}

impl TokioClock {
    fn starting_at(start: &str) -> Self {
        Self {
            start: NaiveDateTime::parse_from_str(start, TIMESTAMP_FORMAT).unwrap(),
            origin: time::Instant::now(),
        }
    }
}

impl Clock for TokioClock {
    fn now(&self) -> NaiveDateTime {
        self.start + chrono::Duration::from_std(self.origin.elapsed()).unwrap()
    }
}

/// Console sink that can be inspected after the run.
#[derive(Clone, Default)]
struct Console(Arc<Mutex<Vec<u8>>>);

impl Write for Console {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Console {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

fn timed_config(dir: &Path) -> MonitorConfig {
    MonitorConfig::default().with_rotation(RotationPolicy::Timed(TimedRotation {
        directory: dir.to_path_buf(),
        file_name: "temp_log.log".to_string(),
        boundary: Boundary::Midnight,
        backup_count: 7,
    }))
}

fn dated_config(dir: &Path) -> MonitorConfig {
    MonitorConfig::default().with_rotation(RotationPolicy::Dated(DatedRotation {
        directory: dir.to_path_buf(),
        prefix: "temp_log".to_string(),
    }))
}

fn read_lines(path: impl AsRef<Path>) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

/// Split `<timestamp> - <payload>` and check the timestamp layout.
fn split_line(line: &str) -> (NaiveDateTime, &str) {
    let (stamp, payload) = line.split_once(" - ").expect("line has a separator");
    assert_eq!(stamp.len(), 19, "timestamp has second precision: {}", line);
    let at = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).expect("timestamp parses");
    (at, payload)
}

fn is_reading(payload: &str) -> bool {
    payload
        .strip_suffix("°C")
        .and_then(|value| value.split_once('.'))
        .map_or(false, |(whole, frac)| {
            !whole.is_empty()
                && whole.trim_start_matches('-').chars().all(|c| c.is_ascii_digit())
                && frac.len() == 2
                && frac.chars().all(|c| c.is_ascii_digit())
        })
}

/// Test three iterations of a steady sensor
#[tokio::test(start_paused = true)]
async fn test_three_iterations_log_three_readings() {
    let dir = tempfile::tempdir().unwrap();
    let console = Console::default();
    let mut monitor = Monitor::with_clock(
        timed_config(dir.path()),
        FixedSampler("temp=48.2'C"),
        TokioClock::starting_at("2025-06-05 14:30:00"),
    )
    .with_console(Box::new(console.clone()));

    let summary = monitor
        .run(time::sleep(Duration::from_secs(12)))
        .await
        .expect("monitor should stop cleanly");
    assert_eq!(summary.iterations, 3);
    assert_eq!(summary.readings, 3);

    let lines = read_lines(dir.path().join("temp_log.log"));
    assert_eq!(lines.len(), 5);

    let readings: Vec<_> = lines
        .iter()
        .map(|line| split_line(line))
        .filter(|(_, payload)| is_reading(payload))
        .collect();
    assert_eq!(readings.len(), 3);
    for (_, payload) in &readings {
        assert_eq!(*payload, "48.20°C");
    }
    for pair in readings.windows(2) {
        assert_eq!((pair[1].0 - pair[0].0).num_seconds(), 5);
    }

    // The console sees exactly what the file does
    assert_eq!(console.text().lines().collect::<Vec<_>>(), lines);
    assert_eq!(split_line(lines.last().unwrap()).1, SHUTDOWN_MESSAGE);
}

/// Test that an unreadable sensor never ends the loop
#[tokio::test(start_paused = true)]
async fn test_unparseable_output_skips_iterations() {
    let dir = tempfile::tempdir().unwrap();
    let mut monitor = Monitor::with_clock(
        timed_config(dir.path()),
        FixedSampler("temp=abc'C"),
        TokioClock::starting_at("2025-06-05 14:30:00"),
    )
    .with_console(Box::new(io::sink()));

    let summary = monitor.run(time::sleep(Duration::from_secs(22))).await.unwrap();
    assert_eq!(summary.iterations, 5);
    assert_eq!(summary.readings, 0);
    assert_eq!(summary.sample_failures, 5);

    let lines = read_lines(dir.path().join("temp_log.log"));
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|line| !is_reading(split_line(line).1)));
}

/// Test that an interrupt during the sleep stops the loop promptly
#[tokio::test(start_paused = true)]
async fn test_interrupt_mid_sleep() {
    let dir = tempfile::tempdir().unwrap();
    let mut monitor = Monitor::with_clock(
        timed_config(dir.path()),
        FixedSampler("temp=48.2'C"),
        TokioClock::starting_at("2025-06-05 14:30:00"),
    )
    .with_console(Box::new(io::sink()));

    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    tokio::spawn(async move {
        time::sleep(Duration::from_millis(7500)).await;
        let _ = tx.send(());
    });

    let started = time::Instant::now();
    let summary = monitor
        .run(async {
            let _ = rx.await;
        })
        .await
        .unwrap();

    // Stopped at the signal, not at the end of the 10s sleep
    assert!(started.elapsed() < Duration::from_secs(8));
    assert_eq!(summary.iterations, 2);

    let lines = read_lines(dir.path().join("temp_log.log"));
    assert_eq!(
        lines.last().unwrap(),
        "2025-06-05 14:30:07 - Monitoring stopped by user."
    );
}

/// Test the one-file-per-date policy across midnight
#[tokio::test(start_paused = true)]
async fn test_dated_policy_rolls_at_midnight() {
    let dir = tempfile::tempdir().unwrap();
    let mut monitor = Monitor::with_clock(
        dated_config(dir.path()),
        FixedSampler("temp=48.2'C"),
        TokioClock::starting_at("2025-06-05 23:59:52"),
    )
    .with_console(Box::new(io::sink()));

    let summary = monitor.run(time::sleep(Duration::from_secs(12))).await.unwrap();
    assert_eq!(summary.rotations, 1);

    assert_eq!(
        read_lines(dir.path().join("temp_log_2025-06-05.log")),
        vec![
            "2025-06-05 23:59:52 - Starting temperature monitoring every 5 seconds.",
            "2025-06-05 23:59:52 - 48.20°C",
            "2025-06-05 23:59:57 - 48.20°C",
        ]
    );
    assert_eq!(
        read_lines(dir.path().join("temp_log_2025-06-06.log")),
        vec![
            "2025-06-06 00:00:02 - New log file started for new day.",
            "2025-06-06 00:00:02 - 48.20°C",
            "2025-06-06 00:00:04 - Monitoring stopped by user.",
        ]
    );
}

/// Test the timed policy across midnight
#[tokio::test(start_paused = true)]
async fn test_timed_policy_rolls_at_midnight() {
    let dir = tempfile::tempdir().unwrap();
    let mut monitor = Monitor::with_clock(
        timed_config(dir.path()),
        FixedSampler("temp=48.2'C"),
        TokioClock::starting_at("2025-06-05 23:59:57"),
    )
    .with_console(Box::new(io::sink()));

    monitor.run(time::sleep(Duration::from_secs(7))).await.unwrap();

    assert_eq!(
        read_lines(dir.path().join("temp_log.log.2025-06-05")),
        vec![
            "2025-06-05 23:59:57 - Starting temperature monitoring every 5 seconds.",
            "2025-06-05 23:59:57 - 48.20°C",
        ]
    );
    assert_eq!(
        read_lines(dir.path().join("temp_log.log")),
        vec![
            "2025-06-06 00:00:02 - New log file started for new day.",
            "2025-06-06 00:00:02 - 48.20°C",
            "2025-06-06 00:00:04 - Monitoring stopped by user.",
        ]
    );
}

/// Test that a stop after midnight lands in the new day's file
#[tokio::test(start_paused = true)]
async fn test_shutdown_after_midnight_uses_new_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut monitor = Monitor::with_clock(
        dated_config(dir.path()).with_timezone(Timezone::Utc),
        FixedSampler("temp=48.2'C"),
        TokioClock::starting_at("2025-06-05 23:59:57"),
    )
    .with_console(Box::new(io::sink()));

    let summary = monitor.run(time::sleep(Duration::from_secs(4))).await.unwrap();
    assert_eq!(summary.iterations, 1);
    assert_eq!(summary.rotations, 1);

    assert_eq!(
        read_lines(dir.path().join("temp_log_2025-06-05.log")),
        vec![
            "2025-06-05 23:59:57 - Starting temperature monitoring every 5 seconds.",
            "2025-06-05 23:59:57 - 48.20°C",
        ]
    );
    assert_eq!(
        read_lines(dir.path().join("temp_log_2025-06-06.log")),
        vec![
            "2025-06-06 00:00:01 - New log file started for new day.",
            "2025-06-06 00:00:01 - Monitoring stopped by user.",
        ]
    );
}

/// Test that a log left over from an earlier day is rolled before startup
#[tokio::test(start_paused = true)]
async fn test_stale_log_rolled_before_startup_line() {
    let dir = tempfile::tempdir().unwrap();
    let active = dir.path().join("temp_log.log");
    std::fs::write(&active, "2025-06-02 18:00:00 - 47.00°C\n").unwrap();
    let last_write = NaiveDateTime::parse_from_str("2025-06-02 18:00:00", TIMESTAMP_FORMAT).unwrap();
    std::fs::File::options()
        .append(true)
        .open(&active)
        .unwrap()
        .set_modified(Utc.from_utc_datetime(&last_write).into())
        .unwrap();

    let mut monitor = Monitor::with_clock(
        timed_config(dir.path()).with_timezone(Timezone::Utc),
        FixedSampler("temp=48.2'C"),
        TokioClock::starting_at("2025-06-05 14:30:00"),
    )
    .with_console(Box::new(io::sink()));

    let summary = monitor.run(time::sleep(Duration::from_secs(2))).await.unwrap();
    assert_eq!(summary.rotations, 1);

    assert_eq!(
        read_lines(dir.path().join("temp_log.log.2025-06-02")),
        vec!["2025-06-02 18:00:00 - 47.00°C"]
    );
    assert_eq!(
        read_lines(&active),
        vec![
            "2025-06-05 14:30:00 - New log file started for new day.",
            "2025-06-05 14:30:00 - Starting temperature monitoring every 5 seconds.",
            "2025-06-05 14:30:00 - 48.20°C",
            "2025-06-05 14:30:02 - Monitoring stopped by user.",
        ]
    );
}

/// Test that an unusable log directory is reported before the loop starts
#[tokio::test]
async fn test_unopenable_log_is_fatal_at_startup() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "file").unwrap();

    let mut monitor = Monitor::with_clock(
        timed_config(&blocker),
        FixedSampler("temp=48.2'C"),
        TokioClock::starting_at("2025-06-05 14:30:00"),
    )
    .with_console(Box::new(io::sink()));

    let result = monitor.run(std::future::ready(())).await;
    assert!(matches!(result, Err(MonitorError::Io(_))));
}

/// Test loading a configuration file from disk
#[test]
fn test_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("thermolog.toml");
    let config = dated_config(dir.path()).with_interval_secs(30);
    std::fs::write(&path, config.to_toml().unwrap()).unwrap();

    let loaded = MonitorConfig::load(&path).unwrap();
    assert_eq!(loaded, config);

    std::fs::write(&path, "interval_secs = 0\n").unwrap();
    assert!(matches!(MonitorConfig::load(&path), Err(MonitorError::Config(_))));
}
