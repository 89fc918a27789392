// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fs;
use std::path::Path;

use lineforth::Error;
use lineforth::Level;
use lineforth::Logger;
use lineforth::Overrides;
use lineforth::Record;
use lineforth::append::Capture;
use lineforth::append::FileBuilder;
use lineforth::color;
use tempfile::TempDir;

fn setup(file: FileBuilder) -> (Logger, Capture) {
    let capture = Capture::default();
    let logger = lineforth::builder("test")
        .level(Level::Debug)
        .console_writer(capture.clone())
        .file(file)
        .quiet()
        .build()
        .unwrap();
    (logger, capture)
}

fn read_log(logger: &Logger, path: &Path) -> String {
    logger.flush().unwrap();
    fs::read_to_string(path).unwrap()
}

#[test]
fn test_partial_line_then_overwrite() {
    let temp_dir = TempDir::new().expect("failed to create a temporary directory");
    let (logger, console) = setup(FileBuilder::new(temp_dir.path(), "test.log"));

    logger
        .log(Level::Info, "working", Overrides::new().terminator(""))
        .unwrap();
    logger
        .log(Level::Plain, "finished", Overrides::new().prefix("\r"))
        .unwrap();

    let console = console.contents();
    assert_eq!(console.matches('\n').count(), 1, "{console:?}");
    let (first, second) = console.split_once('\r').unwrap();
    assert!(first.ends_with("working"));
    assert_eq!(
        second,
        format!("{}finished{}\n", color::DEFAULT, color::END)
    );

    let file = read_log(&logger, &temp_dir.path().join("test.log"));
    let lines = file.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 2, "{file:?}");
    assert!(lines[0].contains("[INFO]"));
    assert!(lines[0].contains("file_sink"));
    assert!(lines[0].ends_with(" working"));
    assert_eq!(lines[1], "finished");
    assert!(!file.contains('\r'));
    assert!(!file.contains('\x1b'));
}

#[test]
fn test_overwrite_after_fresh_line_is_ignored() {
    let temp_dir = TempDir::new().expect("failed to create a temporary directory");
    let (logger, console) = setup(FileBuilder::new(temp_dir.path(), "test.log"));

    logger.info("first").unwrap();
    logger
        .log(Level::Warn, "second", Overrides::new().prefix("\r"))
        .unwrap();

    let console = console.contents();
    assert!(!console.contains('\r'));
    assert_eq!(console.lines().count(), 2);

    let file = read_log(&logger, &temp_dir.path().join("test.log"));
    let lines = file.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].contains("[WARN]") && lines[1].ends_with(" second"));
}

#[test]
fn test_file_strips_embedded_colors() {
    let temp_dir = TempDir::new().expect("failed to create a temporary directory");
    let (logger, console) = setup(FileBuilder::new(temp_dir.path(), "test.log"));

    let message = format!(
        "{}red{} and {}bold{} text",
        color::RED,
        color::END,
        color::attr::BOLD,
        color::END
    );
    logger.plain(message.as_str()).unwrap();
    logger.info_color("tinted", color::rgb(1, 2, 3)).unwrap();

    assert!(console.contents().contains(&message));
    assert!(console.contents().contains(&color::rgb(1, 2, 3)));

    let file = read_log(&logger, &temp_dir.path().join("test.log"));
    let lines = file.lines().collect::<Vec<_>>();
    assert_eq!(lines[0], "red and bold text");
    assert!(lines[1].ends_with(" tinted"));
    assert!(!file.contains('\x1b'));
}

#[test]
fn test_same_record_reaches_file_once() {
    let temp_dir = TempDir::new().expect("failed to create a temporary directory");
    let (logger, console) = setup(FileBuilder::new(temp_dir.path(), "test.log"));

    let record = Record::builder()
        .level(Level::Plain)
        .message("once")
        .build();
    logger.dispatch(&record).unwrap();
    logger.dispatch(&record).unwrap();

    let file = read_log(&logger, &temp_dir.path().join("test.log"));
    assert_eq!(file, "once\n");
    // the console has no such guarantee
    assert_eq!(console.contents().matches("once").count(), 2);
}

#[test]
fn test_rotation_keeps_bounded_backups() {
    let temp_dir = TempDir::new().expect("failed to create a temporary directory");
    let max_backups = 3;
    let max_bytes = 256;
    let (logger, _console) = setup(
        FileBuilder::new(temp_dir.path(), "test.log")
            .max_backups(max_backups)
            .max_bytes(max_bytes),
    );

    for i in 0..100 {
        logger.plain(format!("Log entry {i}: {}", "A".repeat(50))).unwrap();
    }
    logger.flush().unwrap();

    let mut files = fs::read_dir(temp_dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok()?.file_name().into_string().ok())
        .collect::<Vec<_>>();
    files.sort();
    assert_eq!(
        files,
        ["test.log", "test.log.1", "test.log.2", "test.log.3"],
        "{files:?}"
    );

    for name in &files {
        let content = fs::read_to_string(temp_dir.path().join(name)).unwrap();
        assert!(content.len() as u64 <= max_bytes, "{name} is too large");
        assert!(content.ends_with('\n'));
    }
    let newest = fs::read_to_string(temp_dir.path().join("test.log")).unwrap();
    assert!(newest.ends_with(&format!("Log entry 99: {}\n", "A".repeat(50))));
}

#[test]
fn test_announces_file_on_console() {
    let temp_dir = TempDir::new().expect("failed to create a temporary directory");
    let capture = Capture::default();
    let logger = lineforth::builder("announced")
        .console_writer(capture.clone())
        .file(FileBuilder::new(temp_dir.path(), "test.log"))
        .build()
        .unwrap();

    let console = capture.contents();
    let path = temp_dir.path().join("test.log");
    let announcement = format!(
        "{}\"announced\" will start logging into: {}{}\n\n",
        color::rgb(0x08, 0x88, 0x88),
        path.display(),
        color::END
    );
    assert!(console.starts_with(&announcement), "{console:?}");
    assert!(console.contains("started"));

    let file = read_log(&logger, &path);
    assert_eq!(file.lines().count(), 1);
    assert!(file.ends_with("Logger 'announced' started\n"));
}

#[test]
fn test_setup_failure_writes_nothing() {
    let temp_dir = TempDir::new().expect("failed to create a temporary directory");
    let blocker = temp_dir.path().join("blocker");
    fs::write(&blocker, "").unwrap();

    let capture = Capture::default();
    let err = lineforth::builder("broken")
        .console_writer(capture.clone())
        .file(FileBuilder::new(&blocker, "test.log"))
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::SinkSetup { .. }));
    assert_eq!(capture.contents(), "");
}
