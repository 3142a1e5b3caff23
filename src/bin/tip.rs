//! Send a tip from the command line through a wallet's HTTP JSON-RPC port.
//!
//! ```text
//! tip send <recipient> <amount> [message]
//! tip watch
//! ```

use std::sync::Arc;

use anyhow::{Result, bail};
use dotenvy::dotenv;
use tracing::info;

use tipsy::app::{FlowConfig, TipController, WidgetView};
use tipsy::domain::{StatusMessage, TipForm, TipView, WalletProvider};
use tipsy::infra::{
    EnsNameResolver, HttpWalletConfig, HttpWalletProvider, WatcherConfig, spawn_event_watcher,
};
use tipsy::logging::init_tracing;

const USAGE: &str = "usage: tip send <recipient> <amount> [message]\n       tip watch";

enum Command {
    Send {
        recipient: String,
        amount: String,
        message: String,
    },
    Watch,
}

impl Command {
    fn parse(args: &[String]) -> Option<Self> {
        match args {
            [cmd, recipient, amount, rest @ ..] if cmd == "send" => Some(Self::Send {
                recipient: recipient.clone(),
                amount: amount.clone(),
                message: rest.join(" "),
            }),
            [cmd] if cmd == "watch" => Some(Self::Watch),
            _ => None,
        }
    }
}

/// Prints every status change to stdout
#[derive(Default)]
struct ConsoleView {
    inner: WidgetView,
}

impl TipView for ConsoleView {
    fn show_status(&mut self, status: &StatusMessage) {
        if status.is_error() {
            println!("✗ {}", status.text);
        } else {
            println!("• {}", status.text);
        }
        self.inner.show_status(status);
    }

    fn set_connect_visible(&mut self, visible: bool) {
        self.inner.set_connect_visible(visible);
    }

    fn set_send_visible(&mut self, visible: bool) {
        self.inner.set_send_visible(visible);
    }

    fn read_form(&self) -> TipForm {
        self.inner.read_form()
    }

    fn clear_form(&mut self) {
        self.inner.clear_form();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = Command::parse(&args) else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };

    let wallet = Arc::new(HttpWalletProvider::new(HttpWalletConfig::from_env()));
    let resolver = Arc::new(EnsNameResolver::from_env()?);
    info!(registry = %resolver.registry(), "Name registry configured");

    let mut view = ConsoleView::default();
    if let Command::Send {
        recipient,
        amount,
        message,
    } = &command
    {
        view.inner.fill(recipient.as_str(), amount.as_str(), message.as_str());
    }

    let mut controller = TipController::with_config(
        Some(Arc::clone(&wallet) as Arc<dyn WalletProvider>),
        resolver,
        view,
        FlowConfig::from_env(),
    );

    controller.connect().await;
    if !controller.is_connected() {
        bail!("could not connect to wallet at {}", wallet.rpc_url());
    }

    match command {
        Command::Send { .. } => {
            controller.send_tip().await;
            let failed = controller
                .view()
                .inner
                .status
                .as_ref()
                .is_some_and(StatusMessage::is_error);
            if failed {
                std::process::exit(1);
            }
        }
        Command::Watch => {
            let Some(mut events) = controller.subscribe() else {
                bail!("wallet does not support notifications");
            };
            let (watcher, shutdown_tx) =
                spawn_event_watcher(Arc::clone(&wallet), WatcherConfig::from_env());

            loop {
                tokio::select! {
                    event = events.next() => match event {
                        Some(event) => controller.handle_event(event),
                        None => break,
                    },
                    _ = tokio::signal::ctrl_c() => break,
                }
            }

            let _ = shutdown_tx.send(true);
            let _ = watcher.await;
        }
    }

    Ok(())
}
