use std::env;
use std::process;

use crowdin_api::{ClientConfig, ClientOptions, CrowdinClient, ReqwestTransport};
use tracing_subscriber::{EnvFilter, fmt};

/// Print the usage line (plus an optional reason) and exit with status 2.
pub fn usage_and_exit(usage: &str) -> ! {
    fail_with_usage(usage, None)
}

fn fail_with_usage(usage: &str, reason: Option<&str>) -> ! {
    if let Some(reason) = reason {
        eprintln!("error: {reason}");
    }
    eprintln!("{usage}");
    process::exit(2);
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("crowdin_api=debug"));
    fmt().with_env_filter(filter).with_target(false).init();
}

/// Flag parser accepting both `--flag value` and `--flag=value`.
pub struct ArgParser {
    args: Vec<String>,
    usage: &'static str,
}

impl ArgParser {
    pub fn new(usage: &'static str) -> Self {
        let args: Vec<String> = env::args().skip(1).collect();

        if args.iter().any(|a| a == "--help" || a == "-h") {
            println!("{usage}");
            process::exit(0);
        }

        Self { args, usage }
    }

    /// Remove the first occurrence of any of `names` and return its value.
    pub fn take_value(&mut self, names: &[&str]) -> Option<String> {
        let pos = self.args.iter().position(|arg| {
            let flag = arg.split_once('=').map_or(arg.as_str(), |(flag, _)| flag);
            names.contains(&flag)
        })?;

        let arg = self.args.remove(pos);
        if let Some((_, value)) = arg.split_once('=') {
            return Some(value.to_string());
        }
        if pos >= self.args.len() || self.args[pos].starts_with("--") {
            fail_with_usage(self.usage, Some(&format!("`{arg}` needs a value")));
        }
        Some(self.args.remove(pos))
    }

    /// Positional arguments left after all flags were taken.
    pub fn remaining(self) -> Vec<String> {
        if let Some(flag) = self.args.iter().find(|a| a.starts_with("--")) {
            fail_with_usage(self.usage, Some(&format!("unknown option `{flag}`")));
        }
        self.args
    }
}

/// Build a client from `--project` plus either `--key` or `--login`/`--account-key`.
///
/// `--api-base` points at another API root, `--proxy` routes requests through a proxy.
pub fn client_from_parser(parser: &mut ArgParser) -> CrowdinClient {
    let options = ClientOptions {
        project: parser.take_value(&["--project", "-P"]),
        key: parser.take_value(&["--key", "-k"]),
        login: parser.take_value(&["--login", "-l"]),
        account_key: parser.take_value(&["--account-key"]),
        api_base: parser.take_value(&["--api-base"]),
    };
    let proxy = parser.take_value(&["--proxy"]);

    let config = ClientConfig::from_options(options)
        .unwrap_or_else(|e| fail_with_usage(parser.usage, Some(&e.to_string())));
    let transport = match proxy {
        Some(proxy) => ReqwestTransport::with_proxy(&proxy)
            .unwrap_or_else(|e| fail_with_usage(parser.usage, Some(&e.to_string()))),
        None => ReqwestTransport::new(),
    };

    CrowdinClient::with_transport(config, transport)
}
