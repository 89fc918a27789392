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

use std::process::ExitCode;

use lineforth::Level;
use lineforth::Overrides;
use lineforth::append::FileBuilder;
use lineforth::append::FileMode;

fn main() -> ExitCode {
    let file = FileBuilder::new("logs", "example.log")
        .mode(FileMode::Append)
        .max_backups(3)
        .max_bytes(16 * 1024);

    let logger = lineforth::builder("rotating_file")
        .level(Level::Debug)
        .file(file)
        .file_level(Level::Debug)
        .console_level(Level::Info)
        .build()
        .unwrap()
        .apply();

    let repeat = 100;
    for i in 0..repeat {
        log::error!("Hello error!");
        log::warn!("Hello warn!");
        log::info!("Hello info!");
        log::debug!("Hello debug!");
        log::trace!("Hello trace!");

        let overrides = Overrides::new().prefix("\r").terminator("");
        let step = format!("{}/{repeat}", i + 1);
        logger.log(Level::Plain, step, overrides).unwrap();
    }
    logger.plain("").unwrap();

    logger.end_execution(Ok::<(), std::io::Error>(()))
}
