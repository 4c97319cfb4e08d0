//! card-compiler command-line entry point.
//!
//! ```text
//! card-compiler compile <IMAGE> [--intent TEXT] [--template NAME]
//! ```
//!
//! The compiled card is printed to stdout as pretty JSON. Logs go to stderr.

use std::process::ExitCode;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use card_compiler::cli::{Cli, Command, CompileArgs};
use card_compiler::{
    compile, CardConfig, CompileRequest, CompilerConfig, CosUploader, OpenAiClient, Template,
};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,card_compiler=info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false);

    // Use JSON format in production (RUST_LOG_FORMAT=json)
    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

async fn run(args: &CompileArgs) -> anyhow::Result<CardConfig> {
    let config = CompilerConfig::from(args);
    let store = CosUploader::new(&config.storage)?;
    let text_generator = OpenAiClient::new(&config.llm)?;

    let request = CompileRequest::new(&args.image)
        .with_intent(args.intent.clone())
        .with_template(Template::from_name(&args.template))
        .with_layout(args.layout_overrides());

    Ok(compile(&request, &store, &text_generator).await?)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let Some(Command::Compile(args)) = cli.command else {
        Cli::command().print_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    init_tracing();

    match run(&args).await.context("failed to compile card") {
        Ok(card) => {
            println!("{}", serde_json::to_string_pretty(&card)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            Ok(ExitCode::FAILURE)
        }
    }
}
