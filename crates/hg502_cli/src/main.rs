mod decoders;

use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use hg502_core::core_api::{CoreError, CoreErrorCode, Engine, ItemCatalog};
use hg502_render::{
    CategorySelection, JsonStyle, ListKind, ListSelection, render_item_list, render_json_full,
    render_json_list, render_stat_table,
};
use serde_json::Value as JsonValue;
use tracing_subscriber::EnvFilter;

use crate::decoders::{CommandDecoder, JsonDecoder};

const EXIT_FAILURE: i32 = 1;
const EXIT_FILES_NOT_FOUND: i32 = 3;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ListArg {
    Found,
    Remaining,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum CategoryArg {
    Set,
    Unique,
    All,
}

/// Track Holy Grail 502 progress from a Diablo II save folder.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(value_name = "SAVE_DIR")]
    save_dir: PathBuf,
    /// Take item names from the game's SetItems.txt and UniqueItems.txt.
    #[arg(long, value_name = "DIR", env = "HG502_DATA_DIR")]
    data_dir: Option<PathBuf>,
    /// External program that prints a save file's records as JSON.
    #[arg(long, value_name = "PROGRAM", env = "HG502_DECODER")]
    decoder: Option<PathBuf>,
    /// Extra argument passed to the decoder before the file path.
    #[arg(
        long = "decoder-arg",
        value_name = "ARG",
        requires = "decoder",
        allow_hyphen_values = true
    )]
    decoder_args: Vec<String>,
    #[arg(long, value_name = "found|remaining")]
    list: Option<ListArg>,
    /// Defaults to all categories.
    #[arg(long, value_name = "set|unique|all", requires = "list")]
    category: Option<CategoryArg>,
    #[arg(long, value_name = "TEXT", requires = "list")]
    search: Option<String>,
    #[arg(long)]
    json: bool,
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let catalog = match &cli.data_dir {
        Some(data_dir) => ItemCatalog::load_from_data_dir(data_dir),
        None => ItemCatalog::reference(),
    }
    .unwrap_or_else(|e| {
        eprintln!("Error loading item catalog");
        eprintln!("  {e}");
        process::exit(EXIT_FAILURE);
    });

    let engine = Engine::new(catalog);
    let result = match &cli.decoder {
        Some(program) => engine.compute_progress(
            &cli.save_dir,
            &CommandDecoder::new(program, cli.decoder_args.clone()),
        ),
        None => engine.compute_progress(&cli.save_dir, &JsonDecoder),
    };
    let progress = result.unwrap_or_else(|e| exit_with_core_error(&e));

    let selection = cli.list.map(|list| ListSelection {
        category: to_category_selection(cli.category.unwrap_or(CategoryArg::All)),
        kind: to_list_kind(list),
        search: cli.search.clone(),
    });

    if cli.json {
        let json = match &selection {
            Some(selection) => render_json_list(&progress, selection, JsonStyle::CanonicalV1),
            None => render_json_full(&progress, JsonStyle::CanonicalV1),
        };
        print_json(&json);
        return;
    }

    match &selection {
        Some(selection) => print!("{}", render_item_list(&progress, selection)),
        None => print!("{}", render_stat_table(&progress)),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn exit_with_core_error(error: &CoreError) -> ! {
    match error.code {
        CoreErrorCode::FilesNotFound => {
            eprintln!("Files not found");
            eprintln!("  {}", error.message);
            process::exit(EXIT_FILES_NOT_FOUND);
        }
        CoreErrorCode::FileParse => {
            eprintln!("File parse error");
            eprintln!("  {}", error.message);
            process::exit(EXIT_FAILURE);
        }
        CoreErrorCode::Io | CoreErrorCode::Catalog => {
            eprintln!("Error: {error}");
            process::exit(EXIT_FAILURE);
        }
    }
}

fn print_json(json: &JsonValue) {
    let rendered = serde_json::to_string_pretty(json).unwrap_or_else(|e| {
        eprintln!("Error rendering JSON output: {e}");
        process::exit(EXIT_FAILURE);
    });
    println!("{rendered}");
}

fn to_category_selection(category: CategoryArg) -> CategorySelection {
    match category {
        CategoryArg::Set => CategorySelection::Set,
        CategoryArg::Unique => CategorySelection::Unique,
        CategoryArg::All => CategorySelection::All,
    }
}

fn to_list_kind(list: ListArg) -> ListKind {
    match list {
        ListArg::Found => ListKind::Found,
        ListArg::Remaining => ListKind::Remaining,
    }
}
