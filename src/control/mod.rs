pub mod parser;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

use crate::registry::ClientRegistry;
use crate::websocket::broadcast::broadcast;
use parser::{parse_directive, Directive, ParseError};

/// Read operator input line by line until `quit` or end of input.
///
/// tokio services stdin on a helper thread, so awaiting the next line never
/// blocks the session tasks sharing this runtime. Directives are handled
/// strictly in the order they were entered.
pub async fn run(registry: ClientRegistry) {
    print_menu();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match parse_directive(&line) {
                Ok(Directive::Dispatch(command)) => {
                    info!("Dispatching '{}' command", command.action);
                    broadcast(&registry, &command).await;
                }
                Ok(Directive::Status) => {
                    println!("Connected clients: {}", registry.size().await);
                }
                Ok(Directive::Quit) => {
                    info!("Quit requested by operator");
                    break;
                }
                Err(ParseError::Empty) => {}
                Err(e) => println!("{}", e),
            },
            Ok(None) => {
                info!("Operator input closed");
                break;
            }
            Err(e) => {
                error!("Failed to read operator input: {}", e);
                break;
            }
        }
    }
}

fn print_menu() {
    println!();
    println!("=== Command Relay ===");
    println!("Available commands:");
    println!("  move <x> <y> <z>    - Move to coordinates (spaces or commas)");
    println!("  attack <target>     - Attack target");
    println!("  collect <item>      - Collect items");
    println!("  defend <x> <y> <z>  - Defend area");
    println!("  communicate <msg>   - Send message");
    println!("  status              - Show connected clients");
    println!("  quit                - Exit server");
    println!();
}
