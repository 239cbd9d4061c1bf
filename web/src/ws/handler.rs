use super::connection::{Outbound, WebSocketConnection};
use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use log::*;
use notification::connection::{ConnectionId, JobId};
use notification::lifecycle::LifecycleBinding;
use std::borrow::Cow;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Upgrades a request on `/printjobnotification/:job_name` into a
/// subscription to that job.
pub(crate) async fn subscribe(
    ws: WebSocketUpgrade,
    Path(job_name): Path<String>,
    State(lifecycle): State<Arc<LifecycleBinding>>,
) -> Response {
    debug!("Upgrading subscription request for job {job_name}");
    ws.on_upgrade(move |socket| serve_subscription(socket, JobId::from(job_name), lifecycle))
}

/// Owns one subscriber's socket for as long as it is open.
async fn serve_subscription(socket: WebSocket, job_id: JobId, lifecycle: Arc<LifecycleBinding>) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let connection = Arc::new(WebSocketConnection::new(ConnectionId::new(), tx));
    lifecycle.on_open(connection.clone(), job_id.clone());

    let (mut sink, mut stream) = socket.split();

    let outcome: Result<(), axum::Error> = loop {
        tokio::select! {
            outbound = rx.recv() => match outbound {
                Some(Outbound::Event(event)) => {
                    if let Err(e) = sink.send(Message::Text(event.as_str().to_owned())).await {
                        break Err(e);
                    }
                }
                Some(Outbound::Close(reason)) => {
                    let frame = CloseFrame {
                        code: reason.code.code(),
                        reason: Cow::Owned(reason.message),
                    };
                    break sink.send(Message::Close(Some(frame))).await;
                }
                None => break Ok(()),
            },
            inbound = stream.next() => match inbound {
                Some(Ok(Message::Close(_))) => {
                    // Flushes the close reply queued when the client's frame
                    // was read, completing the closing handshake.
                    if let Err(e) = sink.close().await {
                        debug!("Close handshake for job {job_id} did not complete: {e}");
                    }
                    break Ok(());
                }
                None => break Ok(()),
                // Subscribers have nothing to say; pings are answered by axum.
                Some(Ok(_)) => {}
                Some(Err(e)) => break Err(e),
            },
        }
    };

    connection.mark_closed();
    match outcome {
        Ok(()) => lifecycle.on_close(connection.as_ref(), &job_id),
        Err(e) => lifecycle.on_error(connection.as_ref(), &e),
    }
}
