mod session;

use crate::config::ServerConfig;
use crate::demo::Demo;
use anyhow::{Context, Result, bail};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use shared::{DownMsg, UpMsg};
use std::sync::Arc;
use std::time::Duration;
use timeline_sync::{TimeMs, Timeline, TimelineError};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::OwnedMutexGuard;
use tokio_tungstenite::{WebSocketStream, accept_async, tungstenite::Message};

pub use session::{Session, SessionRegistry};

type WsSink = SplitSink<WebSocketStream<TcpStream>, Message>;
type WsStream = SplitStream<WebSocketStream<TcpStream>>;

pub struct ServerState {
    config: ServerConfig,
    demo: Demo,
    sessions: SessionRegistry,
}

impl ServerState {
    pub fn new(config: ServerConfig, demo: Demo) -> Arc<Self> {
        let idle_timeout = Duration::from_secs(config.server.session_idle_timeout_secs);
        Arc::new(Self {
            config,
            demo,
            sessions: SessionRegistry::new(idle_timeout),
        })
    }

    fn new_timeline(&self) -> Timeline {
        self.demo.open_timeline(&self.config.timeline)
    }

    fn current_time_interval(&self) -> Option<Duration> {
        match self.config.timeline.current_time_interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

pub async fn start_server(state: Arc<ServerState>) -> Result<()> {
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    log::info!("WebSocket server listening on {}", addr);
    tokio::spawn(sweep_idle_sessions(state.clone()));
    serve(listener, state).await
}

/// Expires detached sessions even while no client connects or leaves.
async fn sweep_idle_sessions(state: Arc<ServerState>) {
    let period = state.sessions.idle_timeout().max(Duration::from_secs(1));
    let mut ticker = tokio::time::interval(period);
    loop {
        ticker.tick().await;
        let dropped = state.sessions.sweep_idle().await;
        if dropped > 0 {
            log::debug!("Swept {} idle sessions", dropped);
        }
    }
}

pub async fn serve(listener: TcpListener, state: Arc<ServerState>) -> Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        log::info!("New connection from {}", peer);
        let state = state.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, state).await {
                log::error!("Connection error: {:#}", e);
            }
        });
    }
}

async fn handle_connection(stream: TcpStream, state: Arc<ServerState>) -> Result<()> {
    let ws_stream = accept_async(stream).await?;
    let (mut ws_tx, mut ws_rx) = ws_stream.split();

    let Some(hello) = receive_hello(&mut ws_rx).await? else {
        return Ok(());
    };
    let UpMsg::Hello { session_id } = &hello else {
        bail!("Expected hello as first message, got {:?}", hello);
    };

    let Session {
        id,
        timeline,
        restored,
    } = state
        .sessions
        .open(session_id.as_deref(), || state.new_timeline())
        .await;
    log::info!(
        "Client attached to session {} ({}, {} sessions open)",
        id,
        if restored { "restored" } else { "new" },
        state.sessions.session_count().await
    );

    let started = DownMsg::SessionStarted {
        session_id: id.clone(),
        restored,
    };
    let result = run_session(&mut ws_tx, &mut ws_rx, timeline, hello, started, &state).await;
    state.sessions.detach(&id).await;
    log::info!("Client detached from session {}", id);
    result
}

async fn receive_hello(ws_rx: &mut WsStream) -> Result<Option<UpMsg>> {
    while let Some(msg) = ws_rx.next().await {
        match msg? {
            Message::Text(text) => {
                let msg = serde_json::from_str(&text).context("Failed to parse hello")?;
                return Ok(Some(msg));
            }
            Message::Close(_) => break,
            _ => {}
        }
    }
    Ok(None)
}

async fn run_session(
    ws_tx: &mut WsSink,
    ws_rx: &mut WsStream,
    mut timeline: OwnedMutexGuard<Timeline>,
    hello: UpMsg,
    started: DownMsg,
    state: &ServerState,
) -> Result<()> {
    let timeline = &mut *timeline;
    let mut range_changed = timeline.events().subscribe_range_changed();
    let mut selection_changed = timeline.events().subscribe_selection_changed();
    let mut clicked = timeline.events().subscribe_clicked();

    let current_time_interval = state.current_time_interval();
    let mut current_time_ticker =
        tokio::time::interval(current_time_interval.unwrap_or(Duration::from_secs(1)));

    timeline.handle(hello)?;
    send(ws_tx, &started).await?;

    loop {
        timeline.flush();
        for msg in timeline.take_outgoing() {
            send(ws_tx, &msg).await?;
        }

        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(error) = handle_text(timeline, &text) {
                            send(ws_tx, &error).await?;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        log::info!("Client disconnected");
                        break;
                    }
                    Some(Err(e)) => {
                        log::error!("WebSocket error: {}", e);
                        break;
                    }
                    Some(Ok(_)) => {}
                }
            }
            Some(change) = timeline.next_item_set_change() => {
                timeline.item_set_changed(change);
            }
            Some(event) = clicked.next() => {
                if let Err(e) = state.demo.on_click(timeline, event) {
                    log::warn!("Click handler failed: {}", e);
                }
            }
            Some(event) = range_changed.next() => {
                state.demo.on_range_changed(&event);
            }
            Some(event) = selection_changed.next() => {
                state.demo.on_selection_changed(&event);
            }
            _ = current_time_ticker.tick(), if current_time_interval.is_some() => {
                timeline.set_current_time(TimeMs::now());
            }
        }
    }
    Ok(())
}

/// Returns an `error` message for the client when the message was rejected.
fn handle_text(timeline: &mut Timeline, text: &str) -> Option<DownMsg> {
    let msg = match serde_json::from_str::<UpMsg>(text) {
        Ok(msg) => msg,
        Err(e) => {
            log::warn!("Ignoring malformed client message: {}", e);
            return Some(DownMsg::Error {
                message: format!("malformed message: {e}"),
            });
        }
    };
    match timeline.handle(msg) {
        Ok(()) => None,
        Err(e @ TimelineError::KeyNotFound(_)) => {
            log::warn!("Client out of sync: {}", e);
            Some(DownMsg::Error {
                message: e.to_string(),
            })
        }
        Err(e) => {
            log::warn!("Client message rejected: {}", e);
            Some(DownMsg::Error {
                message: e.to_string(),
            })
        }
    }
}

async fn send(ws_tx: &mut WsSink, msg: &DownMsg) -> Result<()> {
    let json = serde_json::to_string(msg)?;
    ws_tx
        .send(Message::Text(json.into()))
        .await
        .with_context(|| format!("Failed to send {}", msg.kind()))
}
