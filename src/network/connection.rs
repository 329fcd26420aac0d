//! Connection lifecycle.
//!
//! A [`Connection`] owns at most one live transport at a time and reports
//! everything that happens to it as a [`ConnectionEvent`]. It survives
//! reconnects: the handle stays valid while transports come and go.
//!
//! ```text
//! Disconnected ──connect()──▶ Connecting ──ok──▶ Connected
//!      ▲                          │                  │
//!      │                        error          close/end/error
//!      │                          ▼                  ▼
//!      └──disconnect()──── Reconnecting ◀── (auto_reconnect)
//! ```
//!
//! Every transport gets a generation number. Tearing a transport down bumps
//! the generation, so late events from its I/O tasks are dropped.

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use slircbot_proto::{LineCodec, MAX_IRC_LINE_LEN, Message, ProtocolError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::io::{ReadHalf, WriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, info, warn};

use super::stream::IrcStream;
use super::tls::upgrade_to_tls;
use crate::config::ConnectionConfig;
use crate::error::{SharedTransportError, TransportError};

/// Where a connection is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    /// A reconnect timer is pending.
    Reconnecting,
}

/// Everything a connection reports.
#[derive(Debug, Clone)]
pub enum ConnectionEvent {
    /// A connect attempt started.
    Connecting,
    /// The transport is up.
    Connected,
    /// One inbound line, terminator stripped.
    Raw(String),
    /// An inbound line that parsed.
    Line(Message),
    /// A line handed to the transport, exactly as sent.
    Sent(String),
    /// The server closed its side.
    End,
    /// The transport is gone.
    Closed,
    /// A transport error. Never fatal.
    Error(SharedTransportError),
    /// A reconnect is scheduled after this delay.
    Reconnecting(Duration),
    /// Stopped by [`Connection::disconnect`].
    Disconnected,
}

struct Transport {
    writer: mpsc::UnboundedSender<String>,
    reader_task: JoinHandle<()>,
    writer_task: JoinHandle<()>,
}

impl Transport {
    fn shutdown(self) {
        self.reader_task.abort();
        // Dropping the sender lets the writer flush what is queued and exit.
        drop(self.writer);
    }
}

struct State {
    status: ConnectionState,
    transport: Option<Transport>,
    /// Set while a reconnect timer is pending. Checked and set together
    /// with `reconnect_timer` under the same lock.
    reconnect_pending: bool,
    reconnect_timer: Option<JoinHandle<()>>,
}

struct Inner {
    name: String,
    config: ConnectionConfig,
    events: mpsc::UnboundedSender<ConnectionEvent>,
    state: Mutex<State>,
    generation: AtomicU64,
}

/// Handle to one logical connection. Cheap to clone.
#[derive(Clone)]
pub struct Connection {
    inner: Arc<Inner>,
}

impl Connection {
    /// Create a disconnected connection and the receiver for its events.
    pub fn new(
        name: impl Into<String>,
        config: ConnectionConfig,
    ) -> (Self, mpsc::UnboundedReceiver<ConnectionEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let inner = Arc::new(Inner {
            name: name.into(),
            config,
            events,
            state: Mutex::new(State {
                status: ConnectionState::Disconnected,
                transport: None,
                reconnect_pending: false,
                reconnect_timer: None,
            }),
            generation: AtomicU64::new(0),
        });
        (Self { inner }, rx)
    }

    /// Name used in logs.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.inner.config
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.state.lock().status
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Open a new transport, replacing any existing one and cancelling a
    /// pending reconnect.
    ///
    /// Failures are reported as events and go through the reconnect path.
    pub async fn connect(&self) {
        self.inner.cancel_reconnect();
        Inner::connect(&self.inner).await;
    }

    /// Stop: tear down the transport, cancel any pending reconnect and emit
    /// [`ConnectionEvent::Disconnected`]. Does not reconnect.
    pub fn disconnect(&self) {
        self.inner.cancel_reconnect();
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        {
            let mut state = self.inner.state.lock();
            if let Some(transport) = state.transport.take() {
                transport.shutdown();
            }
            state.status = ConnectionState::Disconnected;
        }
        info!(client = %self.inner.name, "Disconnected");
        self.inner.emit(ConnectionEvent::Disconnected);
    }

    /// Send a message. Returns false if there is no live transport.
    pub fn write(&self, msg: &Message) -> bool {
        self.write_raw(&msg.to_string())
    }

    /// Send one raw line, cut at its first line break. Returns false if
    /// there is no live transport or the line is over the length limit.
    pub fn write_raw(&self, line: &str) -> bool {
        let line = LineCodec::sanitize(line);
        if line.len() + 2 > MAX_IRC_LINE_LEN {
            warn!(
                client = %self.inner.name,
                len = line.len() + 2,
                limit = MAX_IRC_LINE_LEN,
                "Dropping oversized outbound line"
            );
            return false;
        }
        let state = self.inner.state.lock();
        let Some(transport) = state.transport.as_ref() else {
            return false;
        };
        if transport.writer.send(line.to_owned()).is_err() {
            return false;
        }
        debug!(client = %self.inner.name, ">> {}", line);
        // Emitted under the lock so Sent events keep write order.
        self.inner.emit(ConnectionEvent::Sent(line.to_owned()));
        true
    }

    /// Schedule one reconnect after the configured delay.
    ///
    /// Returns false if auto-reconnect is off or a reconnect is already
    /// pending; at most one timer is ever in flight.
    pub fn schedule_reconnect(&self) -> bool {
        Inner::schedule_reconnect(&self.inner)
    }
}

impl Inner {
    fn emit(&self, event: ConnectionEvent) {
        // Nobody listening is fine.
        let _ = self.events.send(event);
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn cancel_reconnect(&self) {
        let timer = {
            let mut state = self.state.lock();
            state.reconnect_pending = false;
            state.reconnect_timer.take()
        };
        if let Some(timer) = timer {
            timer.abort();
        }
    }

    async fn connect(this: &Arc<Inner>) {
        let generation = this.generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = this.state.lock();
            if let Some(old) = state.transport.take() {
                old.shutdown();
            }
            state.status = ConnectionState::Connecting;
        }
        this.emit(ConnectionEvent::Connecting);

        let (host, port) = (&this.config.host, this.config.port);
        info!(client = %this.name, host = %host, port, tls = this.config.tls, "Connecting");

        match open_transport(&this.config).await {
            Ok(stream) => {
                if !this.is_current(generation) {
                    debug!(client = %this.name, "Connect superseded, dropping transport");
                    return;
                }
                Inner::attach(this, generation, stream);
            }
            Err(e) => {
                if !this.is_current(generation) {
                    return;
                }
                warn!(client = %this.name, error = %e, code = e.error_code(), "Connect failed");
                this.emit(ConnectionEvent::Error(Arc::new(e)));
                Inner::transport_down(this, generation, false);
            }
        }
    }

    fn attach(this: &Arc<Inner>, generation: u64, stream: IrcStream) {
        let (read_half, write_half) = tokio::io::split(stream);
        let (writer, queue) = mpsc::unbounded_channel();

        let mut state = this.state.lock();
        let weak = Arc::downgrade(this);
        let reader_task = tokio::spawn(read_loop(weak.clone(), generation, read_half));
        let writer_task = tokio::spawn(write_loop(weak, generation, write_half, queue));
        state.transport = Some(Transport {
            writer,
            reader_task,
            writer_task,
        });
        state.status = ConnectionState::Connected;
        info!(client = %this.name, "Connected");
        // Under the lock so Connected precedes any Sent from a racing writer.
        this.emit(ConnectionEvent::Connected);
    }

    /// Report the end of transport `generation` once, then reconnect if
    /// configured. Later reports for the same generation are ignored.
    fn transport_down(this: &Arc<Inner>, generation: u64, end: bool) {
        if this
            .generation
            .compare_exchange(generation, generation + 1, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }

        {
            let mut state = this.state.lock();
            if let Some(transport) = state.transport.take() {
                transport.writer_task.abort();
                transport.shutdown();
            }
            state.status = ConnectionState::Disconnected;
        }

        if end {
            this.emit(ConnectionEvent::End);
        }
        info!(client = %this.name, "Connection closed");
        this.emit(ConnectionEvent::Closed);

        Inner::schedule_reconnect(this);
    }

    fn schedule_reconnect(this: &Arc<Inner>) -> bool {
        if !this.config.auto_reconnect {
            return false;
        }
        let mut state = this.state.lock();
        if state.reconnect_pending {
            return false;
        }
        state.reconnect_pending = true;

        let delay = this.config.reconnect_delay();
        info!(client = %this.name, delay_secs = delay.as_secs(), "Reconnect scheduled");
        state.status = ConnectionState::Reconnecting;
        this.emit(ConnectionEvent::Reconnecting(delay));

        let weak = Arc::downgrade(this);
        state.reconnect_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(inner) = weak.upgrade() else {
                return;
            };
            {
                let mut state = inner.state.lock();
                state.reconnect_pending = false;
                state.reconnect_timer = None;
            }
            Inner::connect(&inner).await;
        }));
        true
    }
}

/// Bound on TCP connect plus TLS handshake.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

async fn open_transport(config: &ConnectionConfig) -> Result<IrcStream, TransportError> {
    tokio::time::timeout(CONNECT_TIMEOUT, open_stream(config))
        .await
        .map_err(|_| TransportError::Timeout(CONNECT_TIMEOUT))?
}

async fn open_stream(config: &ConnectionConfig) -> Result<IrcStream, TransportError> {
    let tcp = TcpStream::connect((config.host.as_str(), config.port)).await?;
    if let Err(e) = enable_keepalive(&tcp) {
        warn!("failed to enable TCP keepalive: {}", e);
    }
    tcp.set_nodelay(true)?;

    if config.tls {
        let tls = upgrade_to_tls(tcp, &config.host, config.verify_cert).await?;
        Ok(IrcStream::Tls(Box::new(tls)))
    } else {
        Ok(IrcStream::Plain(tcp))
    }
}

fn enable_keepalive(stream: &TcpStream) -> std::io::Result<()> {
    use socket2::{SockRef, TcpKeepalive};

    let sock = SockRef::from(stream);
    let keepalive = TcpKeepalive::new()
        .with_time(Duration::from_secs(120))
        .with_interval(Duration::from_secs(30));
    sock.set_tcp_keepalive(&keepalive)
}

async fn read_loop(inner: Weak<Inner>, generation: u64, read_half: ReadHalf<IrcStream>) {
    let mut lines = FramedRead::new(read_half, LineCodec::new());
    loop {
        let next = lines.next().await;
        let Some(inner) = inner.upgrade() else {
            return;
        };
        if !inner.is_current(generation) {
            return;
        }
        match next {
            Some(Ok(line)) => {
                debug!(client = %inner.name, "<< {}", line);
                let parsed = Message::parse(&line);
                inner.emit(ConnectionEvent::Raw(line));
                if let Some(msg) = parsed {
                    inner.emit(ConnectionEvent::Line(msg));
                }
            }
            Some(Err(e)) => {
                warn!(client = %inner.name, error = %e, "Read failed");
                inner.emit(ConnectionEvent::Error(Arc::new(e.into())));
                Inner::transport_down(&inner, generation, false);
                return;
            }
            None => {
                Inner::transport_down(&inner, generation, true);
                return;
            }
        }
    }
}

async fn write_loop(
    inner: Weak<Inner>,
    generation: u64,
    write_half: WriteHalf<IrcStream>,
    mut queue: mpsc::UnboundedReceiver<String>,
) {
    let mut sink = FramedWrite::new(write_half, LineCodec::new());
    while let Some(line) = queue.recv().await {
        let Err(e) = sink.send(line).await else {
            continue;
        };
        let Some(inner) = inner.upgrade() else {
            return;
        };
        if !inner.is_current(generation) {
            return;
        }
        // Only I/O failures end the transport; a rejected line is dropped.
        if !matches!(e, ProtocolError::Io(_)) {
            warn!(client = %inner.name, error = %e, "Dropping unsendable line");
            continue;
        }
        warn!(client = %inner.name, error = %e, "Write failed");
        inner.emit(ConnectionEvent::Error(Arc::new(e.into())));
        Inner::transport_down(&inner, generation, false);
        return;
    }
    let _ = SinkExt::<String>::close(&mut sink).await;
}
