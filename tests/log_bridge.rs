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

use lineforth::Level;
use lineforth::append::Capture;
use lineforth::color;

// the global logger can be set once per process, so everything runs in a single test
#[test]
fn test_log_crate_records_share_sinks() {
    let capture = Capture::default();
    let logger = lineforth::builder("bridge")
        .level(Level::Debug)
        .console_writer(capture.clone())
        .no_color()
        .quiet()
        .build()
        .unwrap()
        .apply();

    log::trace!("mapped onto debug");
    log::info!(prefix = "\t"; "indented");
    log::info!(terminator = "", plain = true; "50%");
    log::info!(prefix = "\r", terminator = "", plain = true; "100%");
    logger.warn("after progress").unwrap();

    let contents = capture.contents();
    let lines = contents.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 4, "{contents:?}");
    assert!(lines[0].contains("[DEBUG]") && lines[0].contains("log_bridge"));
    assert!(lines[1].starts_with('\t') && lines[1].contains("[INFO]"));
    assert_eq!(lines[2], "50%\r100%");
    assert!(lines[3].contains("[WARN]"));

    // a rejected override is reported to stderr, not written
    capture.clear();
    log::error!(prefix = "=>"; "bad prefix");
    assert_eq!(capture.contents(), "");

    // formatting a message may log again without deadlocking
    struct Thing<'a>(&'a str);

    impl std::fmt::Display for Thing<'_> {
        fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            log::debug!("formatting wrapping ({})", self.0);
            f.write_str(self.0)
        }
    }

    log::info!("I'm logging {}!", Thing("aha"));
    let contents = color::strip(&capture.contents()).into_owned();
    let lines = contents.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("formatting wrapping (aha)"));
    assert!(lines[1].ends_with("I'm logging aha!"));

    logger.set_level(Level::Error);
    assert!(!log::log_enabled!(log::Level::Warn));
    assert!(log::log_enabled!(log::Level::Error));
}
