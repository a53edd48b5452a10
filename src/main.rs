use chaos_oracle::logging::init_logging;
use chaos_oracle::models::{Conversation, APOLOGY, GREETING, SUGGESTED_QUERIES};
use chaos_oracle::{ChatClient, OracleConfig, ReplyEvent, ReplyOutcome, TransportKind};

use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

const VERSION: &str = env!("CARGO_PKG_VERSION");

const USAGE: &str = "\
Usage: chaos-oracle [--canned] [--url <url>] [--token <token>] [--config <path>]

Commands:
  /suggest   list suggested queries
  /1 .. /4   ask a suggested query
  /quit      exit";

/// Command-line overrides, applied after the config file and environment.
#[derive(Debug, Default)]
struct Flags {
    canned: bool,
    url: Option<String>,
    token: Option<String>,
    config: Option<PathBuf>,
}

fn parse_flags(args: &[String]) -> Result<Flags> {
    let mut flags = Flags::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let mut value = |name: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| eyre!("{} requires a value", name))
        };
        match arg.as_str() {
            "--canned" => flags.canned = true,
            "--url" => flags.url = Some(value("--url")?),
            "--token" => flags.token = Some(value("--token")?),
            "--config" => flags.config = Some(PathBuf::from(value("--config")?)),
            other => return Err(eyre!("unknown argument: {}\n\n{}", other, USAGE)),
        }
    }
    Ok(flags)
}

fn build_config(flags: &Flags) -> Result<OracleConfig> {
    let mut config = OracleConfig::load(flags.config.as_deref())
        .wrap_err("failed to load configuration")?;
    if let Some(url) = &flags.url {
        config = config.with_base_url(url.clone());
    }
    if let Some(token) = &flags.token {
        config = config.with_access_token(token.clone());
    }
    if flags.canned {
        config = config.with_transport(TransportKind::Canned);
    }
    Ok(config)
}

fn print_suggestions() {
    for (i, suggestion) in SUGGESTED_QUERIES.iter().enumerate() {
        println!("  /{}  {}: {}", i + 1, suggestion.label, suggestion.query);
    }
}

enum Input {
    Prompt(String),
    Handled,
    Quit,
}

/// Turn an input line into a prompt, handling slash commands.
fn interpret(line: &str) -> Input {
    let line = line.trim();
    match line {
        "" => Input::Handled,
        "/quit" | "/exit" => Input::Quit,
        "/suggest" | "/help" => {
            print_suggestions();
            Input::Handled
        }
        _ => {
            if let Some(n) = line.strip_prefix('/').and_then(|n| n.parse::<usize>().ok()) {
                if let Some(suggestion) = n.checked_sub(1).and_then(|i| SUGGESTED_QUERIES.get(i)) {
                    println!("> {}", suggestion.query);
                    return Input::Prompt(suggestion.query.to_string());
                }
                println!("No suggestion /{}. Try /suggest.", n);
                return Input::Handled;
            }
            Input::Prompt(line.to_string())
        }
    }
}

/// Stream one reply to stdout. Returns `None` if the user cancelled it.
async fn stream_reply(
    client: &ChatClient,
    conversation: &mut Conversation,
    prompt: String,
) -> Option<ReplyOutcome> {
    let history = conversation.push_user(prompt).to_vec();
    let mut reply = client.subscribe(history);
    let mut printed = 0;

    loop {
        tokio::select! {
            event = reply.next() => match event {
                Some(ReplyEvent::Updated(text)) => {
                    if let Some(suffix) = text.get(printed..) {
                        print!("{}", suffix);
                        let _ = std::io::stdout().flush();
                    }
                    printed = text.len();
                }
                Some(ReplyEvent::Finished(outcome)) => {
                    println!();
                    return Some(outcome);
                }
                None => {
                    println!();
                    return None;
                }
            },
            // Returning drops the subscription, which aborts the session.
            _ = tokio::signal::ctrl_c() => {
                println!("\n[cancelled]");
                return None;
            }
        }
    }
}

/// Wait for the next input line. `None` on end of input or when `interrupt`
/// fires first.
async fn read_prompt<R, F>(lines: &mut Lines<R>, interrupt: F) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
    F: Future<Output = std::io::Result<()>>,
{
    tokio::select! {
        line = lines.next_line() => line.wrap_err("failed to read stdin"),
        signal = interrupt => {
            signal.wrap_err("failed to listen for Ctrl-C")?;
            println!();
            Ok(None)
        }
    }
}

async fn chat_loop(client: ChatClient) -> Result<()> {
    let mut conversation = Conversation::with_greeting();
    println!("{}\n", GREETING);
    print_suggestions();
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("you> ");
        let _ = std::io::stdout().flush();

        // Once a reply has been cancelled, SIGINT no longer ends the process,
        // so the prompt listens for it too.
        let Some(line) = read_prompt(&mut lines, tokio::signal::ctrl_c()).await? else {
            break;
        };
        let prompt = match interpret(&line) {
            Input::Prompt(prompt) => prompt,
            Input::Handled => continue,
            Input::Quit => break,
        };

        print!("oracle> ");
        let _ = std::io::stdout().flush();
        match stream_reply(&client, &mut conversation, prompt).await {
            Some(ReplyOutcome::Completed { text }) => {
                conversation.push_assistant(text);
            }
            Some(ReplyOutcome::Failed { error, text }) => {
                println!("{}", APOLOGY);
                eprintln!("  ({}. {})", error.reason(), error.category().recovery_hint());
                // Only the partial reply joins the history; the apology is never sent upstream.
                conversation.push_assistant(text);
            }
            None => {}
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    // Handle --version flag before any initialization
    if std::env::args().any(|arg| arg == "--version") {
        println!("chaos-oracle {}", VERSION);
        std::process::exit(0);
    }

    if std::env::args().any(|arg| arg == "--help" || arg == "-h") {
        println!("{}", USAGE);
        return Ok(());
    }

    color_eyre::install()?;
    init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let flags = parse_flags(&args)?;
    let config = build_config(&flags)?;
    let client = ChatClient::from_config(&config).wrap_err("invalid configuration")?;
    tracing::info!(
        transport = client.transport_name(),
        endpoint = %config.endpoint_url(),
        "starting chat"
    );

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(chat_loop(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_prompt_returns_line() {
        let mut lines = BufReader::new(&b"hello\n"[..]).lines();
        let line = read_prompt(&mut lines, std::future::pending()).await.unwrap();
        assert_eq!(line.as_deref(), Some("hello"));

        let line = read_prompt(&mut lines, std::future::pending()).await.unwrap();
        assert_eq!(line, None);
    }

    #[tokio::test]
    async fn test_read_prompt_stops_on_interrupt() {
        let (_writer, reader) = tokio::io::duplex(64);
        let mut lines = BufReader::new(reader).lines();
        let line = read_prompt(&mut lines, std::future::ready(Ok(()))).await.unwrap();
        assert_eq!(line, None);
    }

    #[test]
    fn test_interpret_commands() {
        assert!(matches!(interpret("  "), Input::Handled));
        assert!(matches!(interpret("/quit"), Input::Quit));
        assert!(matches!(interpret("/9"), Input::Handled));
        assert!(matches!(interpret("/1"), Input::Prompt(q) if q == SUGGESTED_QUERIES[0].query));
        assert!(matches!(interpret(" why? "), Input::Prompt(q) if q == "why?"));
    }

    #[test]
    fn test_parse_flags() {
        let args: Vec<String> = ["--canned", "--url", "https://x.test"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let flags = parse_flags(&args).unwrap();
        assert!(flags.canned);
        assert_eq!(flags.url.as_deref(), Some("https://x.test"));
        assert!(parse_flags(&["--token".to_string()]).is_err());
    }
}
