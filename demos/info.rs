//! Example: Print the project info tree
//!
//! Usage:
//!   cargo run --example info -- --project PROJECT --key API_KEY

mod cli;

use cli::{ArgParser, client_from_parser, init_tracing, usage_and_exit};

const USAGE: &str = "Usage: cargo run --example info -- --project PROJECT (--key KEY | --login LOGIN --account-key KEY)";

#[tokio::main]
async fn main() {
    init_tracing();
    let mut parser = ArgParser::new(USAGE);
    let client = client_from_parser(&mut parser);
    if !parser.remaining().is_empty() {
        usage_and_exit(USAGE);
    }

    match client.info().await {
        Ok(info) => match serde_json::to_string_pretty(&info) {
            Ok(pretty) => println!("{pretty}"),
            Err(e) => eprintln!("Failed to format info: {e}"),
        },
        Err(e) => {
            eprintln!("Failed to fetch project info: {e}");
            std::process::exit(1);
        }
    }
}
