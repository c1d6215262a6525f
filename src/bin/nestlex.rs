//! Command-line interface for nestlex
//! This binary tokenizes files with a demo nesting configuration so the
//! combinator can be inspected without an embedding editor.
//!
//! Usage:
//!   nestlex tokenize `<path>` [--host `<mode>`]             - Print a token table
//!   nestlex render `<path>` [--host `<mode>`] [--theme `<yaml>`] - ANSI-colored rendering
//!   nestlex list-modes                                    - List registered modes

mod theme;

use clap::{Arg, Command};
use nestlex::nest::config::ConfigSpec;
use nestlex::nest::mode::{ModeRegistry, ModeSpec};
use nestlex::nest::nesting::NestingMode;
use nestlex::nest::testing::driver::{tokenize_document, TokenRec};
use std::process::exit;
use theme::Theme;

fn main() {
    let matches = Command::new("nestlex")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A nesting tokenizer for incremental syntax highlighting")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("tokenize")
                .about("Tokenize a file and print a token table")
                .arg(
                    Arg::new("path")
                        .help("Path to the file to tokenize")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("host")
                        .long("host")
                        .help("Host mode name (e.g. 'plain', 'code')")
                        .default_value("code"),
                ),
        )
        .subcommand(
            Command::new("render")
                .about("Render a file with ANSI colors")
                .arg(
                    Arg::new("path")
                        .help("Path to the file to render")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("host")
                        .long("host")
                        .help("Host mode name (e.g. 'plain', 'code')")
                        .default_value("code"),
                )
                .arg(
                    Arg::new("theme")
                        .long("theme")
                        .short('t')
                        .help("Path to a YAML theme file"),
                ),
        )
        .subcommand(Command::new("list-modes").about("List registered modes"))
        .get_matches();

    match matches.subcommand() {
        Some(("tokenize", sub)) => {
            let path = sub.get_one::<String>("path").unwrap();
            let host = sub.get_one::<String>("host").unwrap();
            handle_tokenize(path, host);
        }
        Some(("render", sub)) => {
            let path = sub.get_one::<String>("path").unwrap();
            let host = sub.get_one::<String>("host").unwrap();
            let theme = sub.get_one::<String>("theme");
            handle_render(path, host, theme.map(|s| s.as_str()));
        }
        Some(("list-modes", _)) => {
            for name in ModeRegistry::global().names() {
                println!("{}", name);
            }
        }
        _ => unreachable!("subcommand is required"),
    }
}

/// The demo configuration: `<% … %>` embeds code, `[[ … ]]` embeds an
/// annotated plain region.
fn demo_mode(host: &str) -> NestingMode {
    let registry = ModeRegistry::global();
    let host = registry
        .get_mode(&ModeSpec::new(host))
        .unwrap_or_else(|err| {
            eprintln!("error: {}", err);
            exit(1);
        });
    let specs = vec![
        ConfigSpec::new()
            .open("<%")
            .close("%>")
            .mode("code")
            .delim_style("tag"),
        ConfigSpec::new()
            .open("[[")
            .close("]]")
            .mode("plain")
            .delim_style("bracket")
            .inner_style("note"),
    ];
    NestingMode::new(host, specs).unwrap_or_else(|err| {
        eprintln!("error: {}", err);
        exit(1);
    })
}

fn tokenize_file(path: &str, host: &str) -> Vec<TokenRec> {
    let source = std::fs::read_to_string(path).unwrap_or_else(|err| {
        eprintln!("error: cannot read {}: {}", path, err);
        exit(1);
    });
    let mode = demo_mode(host);
    tokenize_document(&mode, &source).unwrap_or_else(|err| {
        eprintln!("error: {}", err);
        exit(1);
    })
}

fn handle_tokenize(path: &str, host: &str) {
    let tokens = tokenize_file(path, host);
    println!("{:>4} {:>5} {:>5}  {:<24} text", "line", "start", "end", "style");
    for token in tokens {
        println!(
            "{:>4} {:>5} {:>5}  {:<24} {:?}",
            token.line + 1,
            token.start,
            token.end,
            token.style.as_deref().unwrap_or("-"),
            token.text
        );
    }
}

fn handle_render(path: &str, host: &str, theme_path: Option<&str>) {
    let theme = match theme_path {
        None => Theme::default(),
        Some(path) => Theme::from_yaml_file(path).unwrap_or_else(|err| {
            eprintln!("error: cannot load theme {}: {}", path, err);
            exit(1);
        }),
    };
    let tokens = tokenize_file(path, host);
    let mut current_line = 0;
    for token in tokens {
        while current_line < token.line {
            println!();
            current_line += 1;
        }
        print!("{}", theme.paint(token.style.as_deref(), &token.text));
    }
    println!();
}
