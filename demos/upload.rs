//! Example: Add or update a source file inside a version branch
//!
//! Usage:
//!   cargo run --example upload -- --project PROJECT --key API_KEY --branch v2 --pattern PATTERN LOCAL_FILE [REMOTE_NAME]

mod cli;

use std::path::Path;

use cli::{ArgParser, client_from_parser, init_tracing, usage_and_exit};

const USAGE: &str = "Usage: cargo run --example upload -- --project PROJECT (--key KEY | --login LOGIN --account-key KEY) --branch BRANCH --pattern EXPORT_PATTERN LOCAL_FILE [REMOTE_NAME]";

#[tokio::main]
async fn main() {
    init_tracing();
    let mut parser = ArgParser::new(USAGE);
    let client = client_from_parser(&mut parser);
    let branch = parser
        .take_value(&["--branch", "-b"])
        .unwrap_or_else(|| usage_and_exit(USAGE));
    let pattern = parser
        .take_value(&["--pattern"])
        .unwrap_or_else(|| usage_and_exit(USAGE));

    let positionals = parser.remaining();
    let (local, remote) = match positionals.as_slice() {
        [local] => {
            let name = Path::new(local)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| usage_and_exit(USAGE));
            (local.clone(), name)
        }
        [local, remote] => (local.clone(), remote.clone()),
        _ => usage_and_exit(USAGE),
    };

    match client
        .create_or_update_versioned_file(&branch, &remote, &local, &pattern)
        .await
    {
        Ok(result) => println!("Uploaded {} to branch {}: {}", remote, branch, result),
        Err(e) => {
            eprintln!("Upload failed: {e}");
            std::process::exit(1);
        }
    }
}
