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

mod cli;

use std::io::Read as _;

use anyhow::Context as _;
use anyhow::Result;
use clap::CommandFactory as _;
use clap::Parser;
use serde_json::Value;
use serde_json::json;
use sift::DocumentWriter;
use sift::HttpSearchClient;
use sift::IndexAdmin;
use sift::Identified as _;
use sift::OrderSpec;
use sift::PageSpec;
use sift::SearchClient as _;
use sift::SearchRequest;
use sift::Searcher;
use sift::action::Action;
use sift::config::Config;
use sift::config::LogFormat;
use sift::config::load_config;
use sift::logging::init_logging;
use sift::output::StatusResponse;
use sift::output::print_json;

use crate::cli::Cli;
use crate::cli::Commands;
use crate::cli::DocCommands;
use crate::cli::IndexCommands;
use crate::cli::RawArgs;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let json = cli.json;
    handle_result(dispatch(cli), json)
}

fn dispatch(cli: Cli) -> Result<()> {
    let config = match &cli.command {
        Commands::Compile(_) | Commands::Completions { .. } => None,
        _ => Some(load_config(cli.config.as_deref())?),
    };
    let log_format = config.as_ref().map_or(LogFormat::Text, |c| c.log_format);
    init_logging(log_format, cli.verbose)?;

    let config = config.unwrap_or_default();

    match cli.command {
        Commands::Compile(args) => cmd_compile(&args.request),
        Commands::Search(args) => with_client(&config, |c| cmd_search(c, &args.request)),
        Commands::Raw(args) => with_client(&config, |c| cmd_raw(c, args)),
        Commands::Get(args) => with_client(&config, |c| {
            let doc = Searcher::new(c).get(&args.index, &args.doc_type, &args.id)?;
            print_json(&doc)?;
            Ok(())
        }),
        Commands::Mget(args) => with_client(&config, |c| {
            let docs = Searcher::new(c).multi_get(&args.index, &args.doc_type, &args.ids)?;
            print_json(&docs)?;
            Ok(())
        }),
        Commands::Index(cmd) => with_client(&config, |c| cmd_index(c, cmd)),
        Commands::Doc(cmd) => with_client(&config, |c| cmd_doc(c, cmd)),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "sift", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn handle_result(result: Result<()>, json: bool) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(err) => {
            if json {
                let code = err
                    .downcast_ref::<sift::Error>()
                    .map_or("error", sift::Error::code);
                print_json(&StatusResponse::error(code, &err.to_string()))?;
                Ok(())
            } else {
                Err(err)
            }
        }
    }
}

/// Builds the client, runs `f`, and shuts the client down either way.
fn with_client(config: &Config, f: impl FnOnce(&HttpSearchClient) -> Result<()>) -> Result<()> {
    let client = HttpSearchClient::new(config).context("build search client")?;
    let result = f(&client);
    client.shutdown();
    result
}

fn cmd_raw(client: &HttpSearchClient, args: RawArgs) -> Result<()> {
    let query = read_inline(&args.query)?;
    let page = (args.page_num.is_some() || args.page_size.is_some())
        .then(|| PageSpec::new(args.page_num, args.page_size));
    let order = args
        .order
        .iter()
        .map(|o| o.parse::<OrderSpec>())
        .collect::<sift::Result<Vec<_>>>()?;
    let result = Searcher::new(client).search_raw(&query, args.indices, args.types, page, order)?;
    print_json(&result)?;
    Ok(())
}

fn cmd_compile(request_arg: &str) -> Result<()> {
    let compiled = match parse_requests(request_arg)? {
        Requests::One(request) => compiled_json(&request)?,
        Requests::Many(requests) => Value::Array(
            requests
                .iter()
                .map(compiled_json)
                .collect::<Result<Vec<_>>>()?,
        ),
    };
    print_json(&compiled)?;
    Ok(())
}

fn compiled_json(request: &SearchRequest) -> Result<Value> {
    let compiled = sift::compile(request)?;
    let uri = Action::Search(compiled.clone()).uri();
    Ok(json!({ "uri": uri, "body": compiled.body }))
}

fn cmd_search(client: &HttpSearchClient, request_arg: &str) -> Result<()> {
    let searcher = Searcher::new(client);
    let result = match parse_requests(request_arg)? {
        Requests::One(request) => searcher.search(&request)?,
        Requests::Many(requests) => searcher.search_many(&requests)?,
    };
    print_json(&result)?;
    Ok(())
}

fn cmd_index(client: &HttpSearchClient, cmd: IndexCommands) -> Result<()> {
    let admin = IndexAdmin::new(client);
    let (operation, ok) = match cmd {
        IndexCommands::Create {
            index,
            settings,
            doc_type,
            mappings,
        } => {
            let settings = settings.as_deref().map(read_json).transpose()?;
            let mappings = mappings.as_deref().map(read_json).transpose()?;
            let ok = admin.create_index(
                &index,
                settings.as_ref(),
                doc_type.as_deref(),
                mappings.as_ref(),
            )?;
            ("createIndex", ok)
        }
        IndexCommands::Exists { index } => ("existsIndex", admin.exists_index(&index)?),
        IndexCommands::Delete { index } => ("deleteIndex", admin.delete_index(&index)?),
        IndexCommands::Mapping {
            index,
            doc_type,
            mapping,
        } => {
            let mapping = read_json(&mapping)?;
            ("createMapping", admin.put_mapping(&index, &doc_type, &mapping)?)
        }
    };
    print_json(&StatusResponse::acknowledged(operation, ok))?;
    Ok(())
}

fn cmd_doc(client: &HttpSearchClient, cmd: DocCommands) -> Result<()> {
    let writer = DocumentWriter::new(client);
    let (operation, ok) = match cmd {
        DocCommands::Save {
            index,
            doc_type,
            data,
            id,
            bulk,
        } => match read_json(&data)? {
            Value::Array(docs) => {
                if id.is_some() {
                    anyhow::bail!("--id only applies to a single document");
                }
                if bulk {
                    ("bulk", writer.bulk_save(&index, &doc_type, &docs)?)
                } else {
                    writer.save_doc_list(&index, &doc_type, &docs)?;
                    ("saveDocList", true)
                }
            }
            doc => {
                let id = id.or_else(|| doc.doc_id());
                ("saveDoc", writer.save_doc(&index, &doc_type, id.as_deref(), &doc)?)
            }
        },
        DocCommands::Update {
            index,
            doc_type,
            id,
            data,
        } => {
            let payload = read_json(&data)?;
            ("updateDoc", writer.update_doc(&index, &doc_type, &id, &payload)?)
        }
        DocCommands::Delete {
            index,
            doc_type,
            id,
        } => ("deleteDoc", writer.delete_doc(&index, &doc_type, &id)?),
        DocCommands::DeleteByQuery {
            index,
            doc_type,
            query,
        } => {
            let query = read_inline(&query)?;
            ("deleteByQuery", writer.delete_by_query(&index, &doc_type, &query)?)
        }
    };
    print_json(&StatusResponse::acknowledged(operation, ok))?;
    Ok(())
}

enum Requests {
    One(SearchRequest),
    Many(Vec<SearchRequest>),
}

fn parse_requests(arg: &str) -> Result<Requests> {
    let text = if arg == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("read request from stdin")?;
        text
    } else {
        std::fs::read_to_string(arg).with_context(|| format!("read request file {arg}"))?
    };
    let value: Value = serde_json::from_str(&text).context("parse request JSON")?;
    let requests = if value.is_array() {
        Requests::Many(serde_json::from_value(value).context("decode search requests")?)
    } else {
        Requests::One(serde_json::from_value(value).context("decode search request")?)
    };
    Ok(requests)
}

/// Inline text, or the contents of a file when prefixed with `@`.
fn read_inline(arg: &str) -> Result<String> {
    match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("read file {path}")),
        None => Ok(arg.to_string()),
    }
}

fn read_json(arg: &str) -> Result<Value> {
    let text = read_inline(arg)?;
    serde_json::from_str(&text).context("parse JSON argument")
}
