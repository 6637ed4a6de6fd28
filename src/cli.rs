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

use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;

#[derive(Parser, Debug)]
#[command(
    name = "sift",
    version,
    about = "Compile, run and normalize searches against an Elasticsearch-style engine"
)]
pub struct Cli {
    /// Config file (defaults to the global sift.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log progress to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Report failures as JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the engine request for a search request without sending it
    Compile(RequestArgs),

    /// Run one search request, or a batch given as a JSON array
    Search(RequestArgs),

    /// Run a hand-written query body
    Raw(RawArgs),

    /// Fetch one document by id
    Get(GetArgs),

    /// Fetch several documents by id
    Mget(MgetArgs),

    /// Index administration
    #[command(subcommand)]
    Index(IndexCommands),

    /// Document writes
    #[command(subcommand)]
    Doc(DocCommands),

    /// Print shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// Request JSON file, or - for stdin
    #[arg(long, short)]
    pub request: String,
}

#[derive(Args, Debug)]
pub struct RawArgs {
    /// Query JSON or @file
    #[arg(long)]
    pub query: String,

    /// Index to search (repeatable)
    #[arg(long = "index")]
    pub indices: Vec<String>,

    /// Document type (repeatable)
    #[arg(long = "type")]
    pub types: Vec<String>,

    /// Page number, starting at 1
    #[arg(long)]
    pub page_num: Option<i64>,

    /// Page size
    #[arg(long)]
    pub page_size: Option<i64>,

    /// Sort key as field or field:desc (repeatable)
    #[arg(long)]
    pub order: Vec<String>,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    pub index: String,
    pub doc_type: String,
    pub id: String,
}

#[derive(Args, Debug)]
pub struct MgetArgs {
    pub index: String,
    pub doc_type: String,
    /// Document ids
    pub ids: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum IndexCommands {
    /// Create an index, optionally with settings and a mapping
    Create {
        index: String,

        /// Settings JSON or @file
        #[arg(long)]
        settings: Option<String>,

        /// Document type the mapping belongs to
        #[arg(long = "type")]
        doc_type: Option<String>,

        /// Mapping JSON or @file
        #[arg(long)]
        mappings: Option<String>,
    },

    /// Check whether an index exists
    Exists { index: String },

    /// Delete an index
    Delete { index: String },

    /// Put a mapping for a document type
    Mapping {
        index: String,
        doc_type: String,

        /// Mapping JSON or @file
        #[arg(long)]
        mapping: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum DocCommands {
    /// Save a document, or every document of a JSON array
    Save {
        index: String,
        doc_type: String,

        /// Document JSON or @file
        #[arg(long)]
        data: String,

        /// Explicit id (single documents only)
        #[arg(long)]
        id: Option<String>,

        /// Send an array in one bulk call
        #[arg(long)]
        bulk: bool,
    },

    /// Apply a partial update, e.g. {"doc": {...}}
    Update {
        index: String,
        doc_type: String,
        id: String,

        /// Update JSON or @file
        #[arg(long)]
        data: String,
    },

    /// Delete a document by id
    Delete {
        index: String,
        doc_type: String,
        id: String,
    },

    /// Delete every document matching a query
    DeleteByQuery {
        index: String,
        doc_type: String,

        /// Query JSON or @file
        #[arg(long)]
        query: String,
    },
}
