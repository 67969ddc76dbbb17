//! Message bus subscription
//!
//! libzmq sockets are blocking, so the SUB socket lives on its own thread and
//! hands frames to the async relay through a capacity-1 channel. The relay
//! therefore sees frames in bus order, one at a time.

use std::thread;

use tokio::sync::mpsc;

use crate::error::Result;

const FRAME_CHANNEL_CAPACITY: usize = 1;

/// Bind a SUB socket on `endpoint` filtered on `topic` and start pumping frames
///
/// The thread exits when the receiving side is dropped or the socket fails.
pub fn subscribe(
    context: &zmq::Context,
    endpoint: &str,
    topic: &str,
) -> Result<mpsc::Receiver<String>> {
    let socket = context.socket(zmq::SUB)?;
    socket.bind(endpoint)?;
    socket.set_subscribe(topic.as_bytes())?;
    tracing::info!(endpoint, topic, "Bus subscriber bound");

    let (tx, rx) = mpsc::channel(FRAME_CHANNEL_CAPACITY);
    thread::Builder::new()
        .name("bus-subscriber".to_string())
        .spawn(move || pump(socket, tx))?;

    Ok(rx)
}

fn pump(socket: zmq::Socket, tx: mpsc::Sender<String>) {
    loop {
        let bytes = match socket.recv_bytes(0) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(error = %e, "Bus receive failed, stopping subscriber");
                break;
            },
        };

        let frame = String::from_utf8_lossy(&bytes).into_owned();
        tracing::trace!(frame = %frame, "Bus frame received");

        if tx.blocking_send(frame).is_err() {
            tracing::debug!("Relay gone, stopping subscriber");
            break;
        }
    }
}
