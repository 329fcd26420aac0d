//! Per-network protocol layer.
//!
//! A [`Client`] wraps one [`Connection`]. When the transport comes up it
//! registers (`PASS`, `CAP LS 302`, `NICK`, `USER`), negotiates
//! capabilities, answers `PING`, joins the configured channels after a
//! settle delay, and classifies inbound traffic into chat and other events.

mod caps;
mod event;

pub use caps::{CapNegotiation, SUPPORTED_CAPS};
pub use event::{ChatMessage, ClientEvent};

use parking_lot::Mutex;
use slircbot_proto::Message;
use std::sync::{Arc, Weak};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ClientOptions;
use crate::network::{Connection, ConnectionEvent, ConnectionState};

struct ClientInner {
    options: ClientOptions,
    connection: Connection,
    events: mpsc::UnboundedSender<ClientEvent>,
    caps: Mutex<CapNegotiation>,
    /// Connection events, until the pump task takes them.
    pending_events: Mutex<Option<mpsc::UnboundedReceiver<ConnectionEvent>>>,
    join_timer: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for ClientInner {
    fn drop(&mut self) {
        if let Some(timer) = self.join_timer.get_mut().take() {
            timer.abort();
        }
    }
}

/// One configured network identity. Cheap to clone.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

impl Client {
    /// Create a disconnected client and the receiver for its events.
    pub fn new(options: ClientOptions) -> (Self, mpsc::UnboundedReceiver<ClientEvent>) {
        let (connection, connection_events) =
            Connection::new(options.name.clone(), options.connection.clone());
        let (events, rx) = mpsc::unbounded_channel();
        let inner = Arc::new(ClientInner {
            options,
            connection,
            events,
            caps: Mutex::new(CapNegotiation::default()),
            pending_events: Mutex::new(Some(connection_events)),
            join_timer: Mutex::new(None),
        });
        (Self { inner }, rx)
    }

    pub fn name(&self) -> &str {
        &self.inner.options.name
    }

    pub fn options(&self) -> &ClientOptions {
        &self.inner.options
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.connection.state()
    }

    pub fn is_connected(&self) -> bool {
        self.inner.connection.is_connected()
    }

    /// Capabilities the server acknowledged on the current connection.
    pub fn enabled_caps(&self) -> Vec<String> {
        self.inner.caps.lock().enabled().to_vec()
    }

    /// Connect (or reconnect now). Registration follows automatically.
    pub async fn connect(&self) {
        self.start_pump();
        self.inner.connection.connect().await;
    }

    /// Disconnect without reconnecting.
    pub fn disconnect(&self) {
        self.inner.cancel_join_timer();
        self.inner.connection.disconnect();
    }

    /// Send `QUIT` then disconnect.
    pub fn quit(&self, reason: Option<&str>) {
        let line = match reason {
            Some(reason) => Message::new("QUIT", [reason]).to_trailing_string(),
            None => "QUIT".to_string(),
        };
        self.write_raw(&line);
        self.disconnect();
    }

    /// Send a message. No-op (returns false) when not connected.
    pub fn write(&self, msg: &Message) -> bool {
        self.inner.connection.write(msg)
    }

    /// Send a raw line. No-op (returns false) when not connected.
    pub fn write_raw(&self, line: &str) -> bool {
        self.inner.connection.write_raw(line)
    }

    pub fn join(&self, channel: &str) -> bool {
        self.write(&Message::join(channel))
    }

    pub fn part(&self, channel: &str, reason: Option<&str>) -> bool {
        self.write(&Message::part(channel, reason))
    }

    /// `PRIVMSG <target> :<text>`
    pub fn message(&self, target: &str, text: &str) -> bool {
        self.write_raw(&Message::privmsg(target, text).to_trailing_string())
    }

    fn start_pump(&self) {
        let Some(rx) = self.inner.pending_events.lock().take() else {
            return;
        };
        tokio::spawn(pump(Arc::downgrade(&self.inner), rx));
    }
}

impl ClientInner {
    fn emit(&self, event: ClientEvent) {
        let _ = self.events.send(event);
    }

    fn cancel_join_timer(&self) {
        if let Some(timer) = self.join_timer.lock().take() {
            timer.abort();
        }
    }

    fn register(&self) {
        self.caps.lock().reset();

        if let Some(password) = &self.options.password {
            self.connection.write(&Message::pass(password.as_str()));
        }
        let user = &self.options.user;
        self.connection.write_raw("CAP LS 302");
        self.connection.write(&Message::change_nick(user.nickname.as_str()));
        self.connection
            .write_raw(&Message::user(user.username(), user.realname()).to_trailing_string());

        info!(client = %self.options.name, nick = %user.nickname, "Registration sent");
    }

    fn schedule_joins(this: &Arc<ClientInner>) {
        if this.options.channels.is_empty() {
            return;
        }
        let delay = this.options.join_delay();
        let weak = Arc::downgrade(this);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(inner) = weak.upgrade() else {
                return;
            };
            inner.join_timer.lock().take();
            for channel in &inner.options.channels {
                debug!(client = %inner.options.name, channel = %channel.name(), "Joining");
                inner.connection.write(&Message::join(channel.name()));
            }
        });
        if let Some(old) = this.join_timer.lock().replace(timer) {
            old.abort();
        }
    }

    /// Protocol duties for one parsed line, then classification.
    fn handle_line(&self, msg: Message) {
        if msg.is("PING") {
            let pong = Message::pong(msg.params.iter().cloned());
            self.connection.write_raw(&pong.to_trailing_string());
        } else if msg.is("CAP") {
            let reply = self.caps.lock().handle(&msg);
            if let Some(line) = reply {
                self.connection.write_raw(&line);
            }
        }

        match ChatMessage::from_message(&msg) {
            Some(chat) => self.emit(ClientEvent::Message(chat)),
            None => self.emit(ClientEvent::Event(msg)),
        }
    }
}

/// Drain connection events into client events for as long as the client
/// exists.
async fn pump(inner: Weak<ClientInner>, mut rx: mpsc::UnboundedReceiver<ConnectionEvent>) {
    while let Some(event) = rx.recv().await {
        let Some(inner) = inner.upgrade() else {
            return;
        };
        match event {
            ConnectionEvent::Connecting | ConnectionEvent::End => {}
            ConnectionEvent::Connected => {
                inner.emit(ClientEvent::Connected);
                inner.register();
                inner.emit(ClientEvent::Registered);
                ClientInner::schedule_joins(&inner);
            }
            ConnectionEvent::Raw(line) => inner.emit(ClientEvent::Raw(line)),
            ConnectionEvent::Line(msg) => inner.handle_line(msg),
            ConnectionEvent::Sent(line) => inner.emit(ClientEvent::Sent(line)),
            ConnectionEvent::Closed => {
                inner.cancel_join_timer();
                inner.emit(ClientEvent::Closed);
            }
            ConnectionEvent::Error(e) => {
                warn!(client = %inner.options.name, error = %e, "Transport error");
                inner.emit(ClientEvent::Error(e));
            }
            ConnectionEvent::Reconnecting(delay) => inner.emit(ClientEvent::Reconnecting(delay)),
            ConnectionEvent::Disconnected => {
                inner.cancel_join_timer();
                inner.emit(ClientEvent::Disconnected);
            }
        }
    }
}
