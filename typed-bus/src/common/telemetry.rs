/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

use anyhow::{anyhow, Context};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::common::TracingConfig;

/// Installs the global tracing subscriber described by `config`.
///
/// `RUST_LOG` takes precedence over `config.level`. With `to_file` set, events
/// go to a daily rolling file under `log_directory` through a non-blocking
/// writer; keep the returned guard alive for as long as logging should flush.
///
/// # Errors
///
/// Fails if the level directive does not parse, the log directory cannot be
/// created, or a global subscriber is already installed.
pub fn init_tracing(config: &TracingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .with_context(|| format!("invalid tracing level directive `{}`", config.level))?;

    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::NONE)
        .compact();

    if !config.to_file {
        builder
            .try_init()
            .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))?;
        return Ok(None);
    }

    std::fs::create_dir_all(&config.log_directory)
        .with_context(|| format!("could not create log directory `{}`", config.log_directory))?;
    let file_appender =
        RollingFileAppender::new(Rotation::DAILY, &config.log_directory, &config.log_file);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    builder
        .with_writer(non_blocking)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))?;
    Ok(Some(guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_level_is_rejected() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = TracingConfig {
            level: "typed_bus=notalevel".to_string(),
            ..TracingConfig::default()
        };
        assert!(init_tracing(&config).is_err());
    }
}
