//! Bridge example: run a shell behind an interceptor.
//!
//! The child runs on plain pipes here; a real deployment would hand the
//! interceptor the two halves of a PTY master instead.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example stdio_bridge -- --shell sh --audit /tmp/ttyhook.log
//! cargo run --example stdio_bridge -- --rules rules.json
//! ```
//!
//! A rules file is a JSON array of rule specs:
//!
//! ```json
//! [
//!   { "direction": "input", "pattern": "(?i)^hello$", "suppress": true,
//!     "steps": [{ "kind": "inject", "text": "echo hi there\r" }] },
//!   { "direction": "output", "pattern": "(?i)are you sure",
//!     "steps": [{ "kind": "forward", "text": "\u001b[33m[confirm prompt]\u001b[0m " }] }
//! ]
//! ```

use std::env;
use std::fs::File;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use ttyhook::rule::RuleSpec;
use ttyhook::{AuditLog, Interceptor, Verdict};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut builder = Interceptor::builder()
        // Typing "hello" answers itself instead of reaching the shell.
        .input_rule(r"(?i)^hello$", |_: &str| {
            Verdict::suppress().inject("echo hello yourself\n")
        })
        // Interrupt anything that asks to be run as root and run `id` instead.
        .output_rule(r"(?i)\[sudo\] password for", |_: &str| {
            Verdict::replace_command("id", Duration::from_millis(300))
        });

    if let Some(path) = &args.audit {
        builder = builder.audit_log(AuditLog::new(File::create(path)?));
    }
    if let Some(path) = &args.rules {
        let specs: Vec<RuleSpec> = serde_json::from_reader(File::open(path)?)?;
        println!("Loaded {} rules from {}", specs.len(), path.display());
        builder = builder.rules(specs);
    }

    let interceptor = builder.build()?;

    let mut child = tokio::process::Command::new(&args.shell)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()?;
    let child_in = child.stdin.take().ok_or("child has no stdin")?;
    let child_out = child.stdout.take().ok_or("child has no stdout")?;

    interceptor.set_pty_writer(child_in).await;

    // Each direction ends on its own; the shell exiting ends the output side.
    let (input, output) = tokio::join!(
        interceptor.handle_input(tokio::io::stdin(), interceptor.pty_writer()),
        interceptor.handle_output(child_out, tokio::io::stdout()),
    );
    if let Err(e) = input {
        eprintln!("input pump stopped: {}", e);
    }
    if let Err(e) = output {
        eprintln!("output pump stopped: {}", e);
    }

    let status = child.wait().await?;
    println!("{} exited with {}", args.shell, status);

    Ok(())
}

struct Args {
    shell: String,
    audit: Option<PathBuf>,
    rules: Option<PathBuf>,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut shell = env::var("SHELL").unwrap_or_else(|_| "sh".to_string());
        let mut audit = None;
        let mut rules = None;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--shell" | "-s" => {
                    i += 1;
                    if i < args.len() {
                        shell = args[i].clone();
                    }
                }
                "--audit" | "-a" => {
                    i += 1;
                    if i < args.len() {
                        audit = Some(PathBuf::from(&args[i]));
                    }
                }
                "--rules" | "-r" => {
                    i += 1;
                    if i < args.len() {
                        rules = Some(PathBuf::from(&args[i]));
                    }
                }
                "--help" => {
                    Self::print_help();
                    std::process::exit(0);
                }
                _ => {
                    eprintln!("Unknown argument: {}", args[i]);
                }
            }
            i += 1;
        }

        Self {
            shell,
            audit,
            rules,
        }
    }

    fn print_help() {
        println!(
            r#"ttyhook stdio_bridge example

USAGE:
    cargo run --example stdio_bridge -- [OPTIONS]

OPTIONS:
    -s, --shell <CMD>       Program to run [default: $SHELL]
    -a, --audit <PATH>      Write rule hits and raw output to PATH
    -r, --rules <PATH>      Load extra rules from a JSON file
    --help                  Print this help message
"#
        );
    }
}
