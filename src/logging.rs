// Copyright 2026 Sift Authors
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

//! Log setup for the `sift` binary.
//!
//! Logs go to stderr so stdout stays valid JSON. `RUST_LOG` overrides the
//! default level.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LogFormat;
use crate::error::Error;
use crate::error::Result;

pub fn init_logging(format: LogFormat, verbose: bool) -> Result<()> {
    let subscriber = tracing_subscriber::registry().with(build_env_filter(verbose));
    let installed = match format {
        LogFormat::Json => subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Text => subscriber
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init(),
    };
    installed.map_err(|e| Error::Config(format!("install logger: {e}")))
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose { "sift=info" } else { "sift=warn" }
}

fn build_env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}
