//! TCP front end: one analysis session per connection.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use futures::StreamExt as _;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::analysis::{PoseAnalyzer, SessionReport};
use crate::config::Config;
use crate::protocol::{self, ClientMessage, FeedbackPayload, ServerMessage};

const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Bind `server.listen_addr` and serve until the process is stopped.
pub async fn run(config: Config) -> Result<()> {
    let bind_addr: std::net::SocketAddr = config
        .server
        .listen_addr
        .parse()
        .context("invalid listen_addr")?;
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Listening on {}", bind_addr);

    serve(listener, Arc::new(config)).await;
    Ok(())
}

/// Accept connections forever, spawning one session task per client.
///
/// A failed accept or a failing session never stops the loop.
pub async fn serve(listener: TcpListener, config: Arc<Config>) {
    loop {
        let (tcp_stream, addr) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                error!("Accept failed: {}", e);
                // e.g. EMFILE: give in-flight sessions a moment to release descriptors
                tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                continue;
            }
        };
        if let Err(e) = tcp_stream.set_nodelay(true) {
            warn!("Client {}: set_nodelay failed: {}", addr, e);
        }
        info!("Client connected: {}", addr);

        let config = Arc::clone(&config);
        tokio::spawn(async move {
            match serve_connection(tcp_stream, &config).await {
                Ok(report) => info!(
                    "Client {} done: {} reps, {} good",
                    addr, report.total_reps, report.good_reps
                ),
                Err(e) => error!("Client {} error: {:#}", addr, e),
            }
        });
    }
}

/// Run one session over `io` until END_SESSION or disconnect.
///
/// Frames are handled strictly in order: each one is analysed and answered
/// before the next is read.
pub async fn serve_connection<T>(io: T, config: &Config) -> Result<SessionReport>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    let mut stream = protocol::message_stream(io, config.server.max_frame_length);
    let mut analyzer = PoseAnalyzer::new(config.rules);

    protocol::send_to_sink(&mut stream, &ServerMessage::info("connected")).await?;

    while let Some(frame) = stream.next().await {
        let bytes = frame.context("failed to read frame")?;

        let reply = match ClientMessage::decode(&bytes) {
            Ok(ClientMessage::PoseData(pose)) => {
                let result = analyzer.process(pose.as_ref());
                ServerMessage::Feedback(FeedbackPayload::new(result, pose.as_ref()))
            }
            Ok(ClientMessage::StartSession) => {
                analyzer.reset();
                info!("Session started");
                ServerMessage::info("session started")
            }
            Ok(ClientMessage::EndSession) => {
                let report = analyzer.report();
                info!("Session ended: {:?}", report);
                protocol::send_to_sink(&mut stream, &ServerMessage::Report(report.clone())).await?;
                return Ok(report);
            }
            Err(e) => {
                warn!("Rejected message: {}", e);
                ServerMessage::error(e.to_string())
            }
        };
        protocol::send_to_sink(&mut stream, &reply).await?;
    }

    info!("Connection closed without END_SESSION");
    Ok(analyzer.report())
}
