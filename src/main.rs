use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use genai_sdk::batch::{
    BatchBuilder, CreateBatchRequest, InlinedRequestBuilder, InputConfigBuilder, RequestsBuilder,
};
use genai_sdk::live::{ClientContent, LiveSession, ServerMessage, Setup, WebSocketTransport};
use genai_sdk::types::{Content, GenerateContentRequest, GenerationConfig, Modality};
use genai_sdk::{Config, GenAiClient};
use std::io::Write;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "genai")]
#[command(about = "Command-line client for the Gemini API")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List available models.
    Models {
        #[arg(long)]
        page_size: Option<u32>,
    },
    /// Send one text turn over a live session and print the reply.
    Live {
        #[arg(long)]
        model: String,
        /// Optional system instruction.
        #[arg(long)]
        system: Option<String>,
        prompt: String,
    },
    /// Submit or inspect batch jobs.
    Batch {
        #[command(subcommand)]
        command: BatchCommand,
    },
}

#[derive(Debug, Subcommand)]
enum BatchCommand {
    /// Submit one inlined request per prompt, keyed req-1..req-N.
    Submit {
        #[arg(long)]
        model: String,
        #[arg(long)]
        display_name: Option<String>,
        #[arg(required = true)]
        prompts: Vec<String>,
    },
    Status {
        name: String,
    },
    Cancel {
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "genai_sdk=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    if let Err(e) = run(args.command, &config).await {
        error!("Command failed: {:#}", e);
        std::process::exit(1);
    }
    Ok(())
}

async fn run(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Models { page_size } => list_models(config, page_size).await,
        Command::Live {
            model,
            system,
            prompt,
        } => live_turn(config, &model, system, prompt).await,
        Command::Batch { command } => {
            let client = GenAiClient::from_config(config);
            match command {
                BatchCommand::Submit {
                    model,
                    display_name,
                    prompts,
                } => {
                    let request = build_batch(&model, display_name, &prompts);
                    let operation = client.create_batch(&model, &request).await?;
                    println!("{}", operation.name);
                }
                BatchCommand::Status { name } => {
                    let operation = client.get_batch(&name).await?;
                    let state = operation
                        .batch()?
                        .and_then(|batch| batch.state)
                        .map(|state| format!("{:?}", state))
                        .unwrap_or_else(|| "unknown".to_string());
                    println!("{} {} done={}", operation.name, state, operation.is_done());
                }
                BatchCommand::Cancel { name } => {
                    client.cancel_batch(&name).await?;
                    println!("cancelled {}", name);
                }
            }
            Ok(())
        }
    }
}

async fn list_models(config: &Config, page_size: Option<u32>) -> Result<()> {
    let client = GenAiClient::from_config(config);
    let mut page_token: Option<String> = None;

    loop {
        let page = client.list_models(page_size, page_token.as_deref()).await?;
        for model in &page.models {
            println!(
                "{}\t{}",
                model.id(),
                model.display_name.as_deref().unwrap_or("")
            );
        }

        match page.next_page_token {
            Some(token) if !token.is_empty() => page_token = Some(token),
            _ => return Ok(()),
        }
    }
}

async fn live_turn(
    config: &Config,
    model: &str,
    system: Option<String>,
    prompt: String,
) -> Result<()> {
    let mut setup = Setup::new(model).with_generation_config(GenerationConfig {
        response_modalities: Some(vec![Modality::Text]),
        ..Default::default()
    });
    if let Some(system) = system {
        setup = setup.with_system_instruction(Content::text(system));
    }

    let mut session = LiveSession::new(WebSocketTransport::from_config(config));
    session.send_setup(setup).await?;
    session.send_content(ClientContent::user_text(prompt)).await?;
    info!("Live turn sent to {}", model);

    let mut stdout = std::io::stdout();
    loop {
        match session.next_server_message().await {
            Ok(Some(ServerMessage::ServerContent(content))) => {
                if let Some(text) = content.text() {
                    write!(stdout, "{}", text)?;
                    stdout.flush()?;
                }
                if content.is_turn_complete() {
                    writeln!(stdout)?;
                    break;
                }
            }
            Ok(Some(ServerMessage::GoAway(go_away))) => {
                warn!("Server is going away (time left: {:?})", go_away.time_left);
            }
            Ok(Some(_)) => {}
            Ok(None) => break,
            Err(e) if e.is_recoverable() => warn!("Ignoring malformed message: {}", e),
            Err(e) => return Err(e.into()),
        }
    }

    session.close().await?;
    Ok(())
}

fn build_batch(model: &str, display_name: Option<String>, prompts: &[String]) -> CreateBatchRequest {
    let requests = prompts
        .iter()
        .enumerate()
        .fold(RequestsBuilder::new(), |requests, (i, prompt)| {
            requests.add(
                InlinedRequestBuilder::new()
                    .request(GenerateContentRequest::user_text(prompt.clone()))
                    .metadata_key(format!("req-{}", i + 1))
                    .build(),
            )
        })
        .build();

    let mut batch = BatchBuilder::new()
        .model(Setup::new(model).model)
        .input_config(InputConfigBuilder::new().requests(requests).build());
    if let Some(name) = display_name {
        batch = batch.display_name(name);
    }
    batch.build_request()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_batch_keys_prompts_in_order() {
        let prompts = vec!["one".to_string(), "two".to_string()];
        let request = build_batch("gemini-2.0-flash", Some("cli".to_string()), &prompts);

        assert_eq!(request.batch.model.as_deref(), Some("models/gemini-2.0-flash"));
        assert_eq!(request.batch.display_name.as_deref(), Some("cli"));
        let requests = request.batch.input_config.unwrap().requests.unwrap();
        assert_eq!(requests.keys(), vec!["req-1", "req-2"]);
    }

    #[test]
    fn test_cli_parses_batch_submit() {
        let args = CliArgs::try_parse_from([
            "genai", "batch", "submit", "--model", "m", "first", "second",
        ])
        .unwrap();

        match args.command {
            Command::Batch {
                command: BatchCommand::Submit { model, prompts, .. },
            } => {
                assert_eq!(model, "m");
                assert_eq!(prompts, vec!["first", "second"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_requires_prompt_for_submit() {
        assert!(CliArgs::try_parse_from(["genai", "batch", "submit", "--model", "m"]).is_err());
    }
}
