//! Named set of clients with one merged event stream.

use dashmap::DashMap;
use futures_util::future::join_all;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::client::{Client, ClientEvent};
use crate::config::ClientOptions;

/// A [`ClientEvent`] tagged with the client it came from.
#[derive(Debug, Clone)]
pub struct ManagerEvent {
    pub client: String,
    pub event: ClientEvent,
}

/// A client and the task tagging its events.
struct Managed {
    client: Client,
    forwarder: JoinHandle<()>,
}

impl Managed {
    /// Stop forwarding first so none of the client's final events are
    /// attributed to a successor with the same name.
    fn retire(self) {
        self.forwarder.abort();
        self.client.disconnect();
    }
}

/// Owns every configured [`Client`], keyed by name.
pub struct ClientManager {
    clients: DashMap<String, Managed>,
    events: mpsc::UnboundedSender<ManagerEvent>,
}

impl ClientManager {
    /// Create an empty manager and the receiver for its merged events.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ManagerEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let manager = Self {
            clients: DashMap::new(),
            events,
        };
        (manager, rx)
    }

    /// Build a manager holding one client per entry.
    pub fn with_clients<I>(options: I) -> (Self, mpsc::UnboundedReceiver<ManagerEvent>)
    where
        I: IntoIterator<Item = ClientOptions>,
    {
        let (manager, rx) = Self::new();
        for opts in options {
            manager.add_client(opts);
        }
        (manager, rx)
    }

    /// Add a client. A client already registered under the same name is
    /// disconnected and replaced.
    pub fn add_client(&self, options: ClientOptions) -> Client {
        let name = options.name.clone();
        let (client, mut rx) = Client::new(options);

        let events = self.events.clone();
        let tag = name.clone();
        let forwarder = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let tagged = ManagerEvent {
                    client: tag.clone(),
                    event,
                };
                if events.send(tagged).is_err() {
                    break;
                }
            }
            debug!(client = %tag, "Client event stream ended");
        });

        let managed = Managed {
            client: client.clone(),
            forwarder,
        };
        if let Some(old) = self.clients.insert(name, managed) {
            debug!(client = %old.client.name(), "Replacing client");
            old.retire();
        }
        client
    }

    pub fn get(&self, name: &str) -> Option<Client> {
        self.clients.get(name).map(|c| c.value().client.clone())
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.clients.iter().map(|c| c.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Connect every client. Resolves once every first attempt has finished,
    /// successful or not.
    pub async fn start(&self) {
        let clients: Vec<Client> = self.clients.iter().map(|c| c.value().client.clone()).collect();
        info!(count = clients.len(), "Starting clients");
        join_all(clients.iter().map(|c| c.connect())).await;
    }

    /// Disconnect every client.
    pub fn stop(&self) {
        info!(count = self.clients.len(), "Stopping clients");
        for client in self.clients.iter() {
            client.value().client.disconnect();
        }
    }

    /// Disconnect one client. Returns false for an unknown name.
    pub fn disconnect(&self, name: &str) -> bool {
        match self.clients.get(name) {
            Some(client) => {
                client.value().client.disconnect();
                true
            }
            None => false,
        }
    }
}
