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
use std::thread;
use std::time::Duration;

use lineforth::Level;
use lineforth::Overrides;
use lineforth::color;

fn main() -> ExitCode {
    let logger = lineforth::builder("progress")
        .level(Level::Debug)
        .level_from_env("LINEFORTH_LEVEL")
        .build()
        .unwrap();
    logger.start_execution(None).unwrap();

    let total = 20;
    for step in 1..=total {
        let bar = format!("[{:<20}] {step}/{total}", "#".repeat(step));
        let overrides = Overrides::new()
            .prefix("\r")
            .terminator("")
            .color(color::CYAN);
        logger.log(Level::Plain, bar, overrides).unwrap();
        thread::sleep(Duration::from_millis(50));

        if step == total / 2 {
            // lands on its own line, the bar continues below it
            logger.warn("halfway there").unwrap();
        }
    }
    logger.plain("").unwrap();

    logger.debug("Hello debug!").unwrap();
    logger.info("Hello info!").unwrap();
    logger.warn("Hello warn!").unwrap();
    logger.error("Hello error!").unwrap();
    logger.critical("Hello critical!").unwrap();
    logger.info_green("Hello green!").unwrap();

    logger.end_execution(Ok::<(), std::io::Error>(()))
}
