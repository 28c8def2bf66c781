//! `mtype` CLI entry point (spec.md §6.1): `mtype [options] <root-ident>...`.

mod cli;
mod logging;
mod print;

use mtype_pipeline::{Pipeline, SearchPath};

use cli::CliOptions;

fn build_search_path(opts: &CliOptions) -> Result<SearchPath, std::io::Error> {
    if let Some(path) = &opts.search_path {
        return Ok(SearchPath::from_colon_delimited(path));
    }
    if let Some(path_file) = &opts.path_file {
        return SearchPath::from_path_file(path_file);
    }
    Ok(SearchPath::default())
}

fn main() {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let opts = CliOptions::parse(&args);

    if opts.had_parse_error {
        eprintln!("{}", CliOptions::usage());
        std::process::exit(-1);
    }

    if opts.show_help_text {
        println!("{}", CliOptions::help());
        std::process::exit(0);
    }

    if opts.root_identifiers.is_empty() {
        println!("{}", CliOptions::usage());
        std::process::exit(0);
    }

    let search_path = match build_search_path(&opts) {
        Ok(path) => path,
        Err(err) => {
            println!("Failed to build search path: {err}");
            std::process::exit(-1);
        }
    };

    tracing::info!(roots = ?opts.root_identifiers, "compiling");
    let mut pipeline = Pipeline::with_capacity(search_path, opts.store_capacity);
    let report = pipeline.compile(&opts.root_identifiers);
    tracing::info!(
        visited = report.visited_files.len(),
        parse_errors = report.parse_errors.len(),
        type_errors = report.type_errors.len(),
        "compilation finished"
    );
    print::print_report(&report, &pipeline, &opts);

    if report.parse_errors.is_empty() {
        std::process::exit(0);
    }
    std::process::exit(-1);
}
