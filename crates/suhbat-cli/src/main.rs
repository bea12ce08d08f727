//! suhbat - command-line client for the suhbat chat service

mod commands;
mod config;

use clap::Parser;
use std::io::{self, Write};
use std::sync::Arc;
use suhbat_api::{ChatClient, CredentialStore, FailureKind, FileCredentialStore};
use suhbat_chat::{
    APOLOGY_TEXT, AppState, ChatEvent, Error as ChatError, HistorySource, MessageAssembler,
};
use tokio::sync::broadcast::{self, error::RecvError};

/// suhbat - chat with the suhbat assistant
#[derive(Parser, Debug)]
#[command(name = "suhbat")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Chat service URL (overrides config and SUHBAT_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Run in non-interactive mode with a single prompt
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Continue an existing conversation by ID
    #[arg(long)]
    chat: Option<String>,

    /// Print the messages of a conversation and exit
    #[arg(long)]
    history: Option<String>,

    /// List your conversations and exit
    #[arg(long)]
    chats: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,

    /// Sign in with an email address (password is read from stdin)
    #[arg(long, value_name = "EMAIL")]
    login: Option<String>,

    /// Create an account with an email address (password is read from stdin)
    #[arg(long, value_name = "EMAIL")]
    register: Option<String>,

    /// Display name for --register
    #[arg(long, requires = "register")]
    name: Option<String>,

    /// Forget the stored token
    #[arg(long)]
    logout: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup tracing
    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("suhbat=debug,suhbat_api=debug,suhbat_chat=debug")
            .with_writer(io::stderr)
            .init();
    }

    // Initialize config and exit
    if args.init_config {
        match config::Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let cfg = config::Config::load();
    let credentials: Arc<dyn CredentialStore> =
        Arc::new(FileCredentialStore::new(cfg.credentials_path()));
    let client = Arc::new(ChatClient::new(
        cfg.client_config(args.base_url.as_deref()),
        credentials,
    )?);
    tracing::debug!("Using chat service at {}", client.config().base_url);

    if args.logout {
        client.logout()?;
        println!("Signed out.");
        return Ok(());
    }

    if let Some(email) = args.login {
        return handle_login(&client, &email).await;
    }

    if let Some(email) = args.register {
        return handle_register(&client, &email, args.name.as_deref()).await;
    }

    let mut state = AppState::new();
    if client.is_logged_in() {
        state.sign_in(client.user_info());
    }

    if args.chats {
        return list_chats(&*client, &mut state).await;
    }

    let mut assembler = MessageAssembler::new(client.clone());

    if let Some(id) = args.history {
        assembler.open_conversation(id)?;
        assembler.load_history(&*client).await?;
        print_transcript(&assembler);
        return Ok(());
    }

    if let Some(id) = args.chat {
        resume_conversation(&mut assembler, &*client, id).await?;
    } else {
        assembler.get_or_create_conversation_id(&*client).await;
    }

    let mut events = assembler.subscribe();

    // Non-interactive mode
    if let Some(command) = args.command {
        return run_prompt(&assembler, &mut events, &command).await;
    }

    run_interactive(&client, &mut assembler, &mut events, &mut state).await
}

fn prompt_line(label: &str) -> anyhow::Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

async fn handle_login(client: &ChatClient, email: &str) -> anyhow::Result<()> {
    let password = prompt_line("Password: ")?;
    match client.login(email, &password).await {
        Ok(user) => {
            println!("Signed in as {}", user.email);
            Ok(())
        }
        Err(e) if e.is_unauthorized() => {
            eprintln!("Sign-in failed: incorrect email or password");
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

async fn handle_register(
    client: &ChatClient,
    email: &str,
    name: Option<&str>,
) -> anyhow::Result<()> {
    let password = prompt_line("Password: ")?;
    let name = match name {
        Some(name) => name.to_string(),
        None => email.split('@').next().unwrap_or_default().to_string(),
    };
    client.register(email, &password, &name).await?;
    println!("Account created. Sign in with: suhbat --login {}", email);
    Ok(())
}

async fn list_chats(history: &dyn HistorySource, state: &mut AppState) -> anyhow::Result<()> {
    state.set_chats(history.conversations().await?);
    println!("{}", commands::ChatsCommand::first_page(state.chats()));
    Ok(())
}

/// Switch to `id` and load what the server has for it. A conversation whose
/// history cannot be loaded stays open with an empty transcript.
async fn resume_conversation(
    assembler: &mut MessageAssembler,
    history: &dyn HistorySource,
    id: String,
) -> anyhow::Result<()> {
    assembler.open_conversation(id)?;
    match assembler.load_history(history).await {
        Ok(count) => tracing::debug!("Resumed conversation with {} messages", count),
        Err(e) => tracing::warn!("Failed to load conversation history: {}", e),
    }
    Ok(())
}

/// What to tell the user after a reply failed
fn failure_hint(error: &suhbat_api::Error) -> String {
    match error.kind() {
        FailureKind::Network => format!("Could not reach the chat service: {}", error),
        FailureKind::Timeout => "The reply stalled and was stopped.".to_string(),
        FailureKind::Status(401 | 403) => {
            "The service rejected your session. Sign in again with --login EMAIL.".to_string()
        }
        FailureKind::Status(_) | FailureKind::Other => error.to_string(),
    }
}

fn print_transcript(assembler: &MessageAssembler) {
    for message in assembler.messages() {
        let when = chrono::DateTime::from_timestamp_millis(message.timestamp)
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        let who = if message.is_user { "you" } else { "suhbat" };
        println!("[{}] {}:\n{}\n", when, who, message.text);
    }
}

async fn run_prompt(
    assembler: &MessageAssembler,
    events: &mut broadcast::Receiver<ChatEvent>,
    prompt: &str,
) -> anyhow::Result<()> {
    let submission = match assembler.submit(prompt) {
        Ok(submission) => submission,
        Err(e) if e.validation().is_some() => {
            eprintln!("{}", e);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    let reply_id = submission.assistant_id.clone();

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) if event.message_id() != reply_id => {}
                Ok(ChatEvent::Delta { delta, .. }) => {
                    print!("{}", delta);
                    io::stdout().flush()?;
                }
                Ok(ChatEvent::Completed { .. }) => {
                    println!();
                    break;
                }
                Ok(ChatEvent::Failed { .. }) => {
                    println!("\n{}", APOLOGY_TEXT);
                    break;
                }
                Ok(ChatEvent::Cancelled { .. }) => {
                    println!("\n[stopped]");
                    break;
                }
                Ok(ChatEvent::Submitted { .. }) => {}
                Err(RecvError::Lagged(n)) => tracing::warn!("Display fell behind by {} events", n),
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => assembler.abort(),
        }
    }

    match submission.wait().await {
        Ok(_) | Err(ChatError::Cancelled) => Ok(()),
        Err(ChatError::Api(e)) => {
            eprintln!("Error: {}", failure_hint(&e));
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

async fn run_interactive(
    client: &ChatClient,
    assembler: &mut MessageAssembler,
    events: &mut broadcast::Receiver<ChatEvent>,
    state: &mut AppState,
) -> anyhow::Result<()> {
    use commands::CommandResult;

    // Show minimal startup info (only if TTY)
    if io::IsTerminal::is_terminal(&io::stderr()) {
        match state.user() {
            Some(user) => eprintln!("suhbat ({})", user.email),
            None => eprintln!("suhbat (not signed in; use --login EMAIL)"),
        }
        eprintln!("Type /help for commands.");
        eprintln!();
        print_transcript(assembler);
    }

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            // EOF
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        let Some(result) = commands::execute_command(input, assembler, state) else {
            run_prompt(assembler, events, input).await?;
            continue;
        };

        match result {
            CommandResult::Exit => break,
            CommandResult::Message(msg) => println!("{}", msg),
            CommandResult::Unknown(cmd) => {
                println!("Unknown command: /{}", cmd);
                println!("Type /help for available commands.");
            }
            CommandResult::NewConversation => {
                assembler.new_conversation()?;
                let id = assembler.get_or_create_conversation_id(client).await;
                println!("Started conversation {}", id);
            }
            CommandResult::OpenConversation(id) => {
                assembler.open_conversation(id)?;
                state.close_menu();
                match assembler.load_history(client).await {
                    Ok(_) => print_transcript(assembler),
                    Err(e) => eprintln!("Failed to load conversation: {}", e),
                }
            }
            CommandResult::ReloadHistory => match assembler.load_history(client).await {
                Ok(0) => println!("No messages."),
                Ok(_) => print_transcript(assembler),
                Err(e) => eprintln!("Failed to load conversation: {}", e),
            },
            CommandResult::ListChats => match client.conversations().await {
                Ok(chats) => {
                    state.set_chats(chats);
                    state.open_menu();
                    println!("{}", commands::ChatsCommand::first_page(state.chats()));
                }
                Err(e) if e.is_unauthorized() => {
                    eprintln!("Sign in first: suhbat --login EMAIL");
                }
                Err(e) => eprintln!("Failed to list conversations: {}", e),
            },
            CommandResult::SendFeedback(feedback) => {
                match client.submit_feedback(&feedback).await {
                    Ok(_) => println!("Thanks for the feedback."),
                    Err(e) => eprintln!("Failed to send feedback: {}", e),
                }
            }
        }
    }

    Ok(())
}
