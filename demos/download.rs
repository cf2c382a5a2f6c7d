//! Example: Download translations as a zip archive
//!
//! Usage:
//!   cargo run --example download -- --project PROJECT --key API_KEY [--package all] [--branch v2] OUTPUT.zip

mod cli;

use cli::{ArgParser, client_from_parser, init_tracing, usage_and_exit};

const USAGE: &str = "Usage: cargo run --example download -- --project PROJECT (--key KEY | --login LOGIN --account-key KEY) [--package NAME] [--branch BRANCH] OUTPUT.zip";

#[tokio::main]
async fn main() {
    init_tracing();
    let mut parser = ArgParser::new(USAGE);
    let client = client_from_parser(&mut parser);
    let package = parser.take_value(&["--package"]);
    let branch = parser.take_value(&["--branch", "-b"]);

    let positionals = parser.remaining();
    let [output] = positionals.as_slice() else {
        usage_and_exit(USAGE);
    };

    match client
        .download_translations_to_file(output, package.as_deref(), branch.as_deref())
        .await
    {
        Ok(written) => println!("Saved {} bytes to {}", written, output),
        Err(e) => {
            eprintln!("Download failed: {e}");
            std::process::exit(1);
        }
    }
}
