//! Terminal chat client for a running proxy
//!
//! Start the server first (`cargo run`), then:
//!  ```bash
//! cargo run --example terminal_chat
//!  ```
//!
//! Set `CHAT_PROXY_URL` to talk to a proxy somewhere other than `http://127.0.0.1:8080`,
//! and `CHAT_FULL_HISTORY=1` to resend the whole conversation with every message.

use chat_proxy::{ChatRole, ChatSession, ContextMode, HttpChatTransport, SessionState};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "server")]
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let base_url = std::env::var("CHAT_PROXY_URL").unwrap_or_else(|_| "http://127.0.0.1:8080".to_string());
    let context = if std::env::var("CHAT_FULL_HISTORY").is_ok_and(|v| v == "1") {
        ContextMode::FullHistory
    } else {
        ContextMode::LatestOnly
    };

    let transport = HttpChatTransport::new(&base_url);
    let mut session = ChatSession::with_context(context);

    println!("Chatting via {} (Ctrl-D to quit)", transport.url());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        session.set_input(line);
        if !session.submit(&transport).await {
            continue;
        }

        match session.state() {
            SessionState::Success(reply) => {
                let who = if reply.role == ChatRole::Assistant { "bot" } else { "?" };
                println!("{who}: {}", reply.content);
            }
            SessionState::Failed(err) => println!("error: {err}"),
            SessionState::Idle | SessionState::Pending => {}
        }
    }

    Ok(())
}
