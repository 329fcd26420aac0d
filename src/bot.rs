//! Top-level wiring: clients in, handlers out.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{Instrument, debug, info, warn};

use crate::client::ClientEvent;
use crate::config::Config;
use crate::dispatch::{Dispatcher, Registry};
use crate::manager::{ClientManager, ManagerEvent};
use crate::telemetry::spans;

/// Every configured client plus the dispatcher that serves them.
pub struct Bot {
    manager: ClientManager,
    dispatcher: Dispatcher,
    events: mpsc::UnboundedReceiver<ManagerEvent>,
}

impl Bot {
    pub fn new(config: &Config, registry: Arc<Registry>) -> Self {
        let (manager, events) = ClientManager::with_clients(config.clients.iter().cloned());
        Self {
            manager,
            dispatcher: Dispatcher::new(registry),
            events,
        }
    }

    pub fn manager(&self) -> &ClientManager {
        &self.manager
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Connect everything and dispatch until `shutdown` resolves, then
    /// disconnect everything.
    ///
    /// Dispatch starts right away: a client whose first connect is slow does
    /// not hold up the others.
    pub async fn run(self, shutdown: impl Future<Output = ()>) {
        let Bot {
            manager,
            dispatcher,
            mut events,
        } = self;
        tokio::pin!(shutdown);
        let start = manager.start();
        tokio::pin!(start);
        let mut started = false;

        loop {
            tokio::select! {
                _ = &mut start, if !started => {
                    started = true;
                    debug!("Initial connect attempts finished");
                }
                event = events.recv() => match event {
                    Some(event) => handle(&manager, &dispatcher, event),
                    None => break,
                },
                _ = &mut shutdown => break,
            }
        }

        info!("Shutting down");
        manager.stop();
    }
}

fn handle(
    manager: &ClientManager,
    dispatcher: &Dispatcher,
    ManagerEvent { client: name, event }: ManagerEvent,
) {
    let span = spans::client(&name);
    let _enter = span.enter();

    match event {
        ClientEvent::Message(_) | ClientEvent::Event(_) => {
            let Some(client) = manager.get(&name) else {
                warn!("Event from unknown client");
                return;
            };
            let outcome = dispatcher.dispatch(&client, event);
            debug!(?outcome, "Dispatched");
        }
        ClientEvent::Registered => info!("Registered"),
        ClientEvent::Reconnecting(delay) => {
            info!(delay_secs = delay.as_secs(), "Reconnecting")
        }
        ClientEvent::Error(e) => warn!(error = %e, code = e.error_code(), "Client error"),
        ClientEvent::Connected
        | ClientEvent::Closed
        | ClientEvent::Disconnected
        | ClientEvent::Raw(_)
        | ClientEvent::Sent(_) => {}
    }
}

/// Run `bot` on the current runtime until ctrl-c.
pub async fn run_until_ctrl_c(bot: Bot) {
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };
    bot.run(shutdown).instrument(tracing::info_span!("bot")).await;
}
