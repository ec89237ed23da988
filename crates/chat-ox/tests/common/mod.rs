#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chat_ox::{ChatClient, ChatError, MessageStore, Notice, SavedMessage, async_trait};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    sync::mpsc,
};

/// Notifier that remembers every notice it was given.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub notices: Arc<Mutex<Vec<Notice>>>,
}

impl chat_ox::Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.message.clone())
            .collect()
    }
}

/// Message store that keeps saved replies in memory, optionally failing.
#[derive(Clone, Default)]
pub struct MemoryMessages {
    pub saved: Arc<Mutex<Vec<SavedMessage>>>,
    pub fail: bool,
}

#[async_trait]
impl MessageStore for MemoryMessages {
    async fn save(&self, message: SavedMessage) -> Result<(), ChatError> {
        if self.fail {
            return Err(ChatError::Persistence("database offline".into()));
        }
        self.saved.lock().unwrap().push(message);
        Ok(())
    }
}

pub fn client(base_url: impl Into<String>) -> ChatClient {
    ChatClient::builder()
        .base_url(base_url)
        .token("test-token")
        .build()
}

/// How a [`gated_server`] ends the response after its last piece.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Ending {
    /// Terminating zero-length chunk.
    Clean,
    /// Close the socket mid-body.
    Abort,
}

/// Accept one request and stream `pieces` as HTTP chunks, sending each one
/// only after a signal arrives on the returned channel.
pub async fn gated_server(
    pieces: Vec<&'static str>,
    ending: Ending,
) -> (String, mpsc::UnboundedSender<()>, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (gate_tx, mut gate_rx) = mpsc::unbounded_channel::<()>();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut buffer = Vec::new();
        loop {
            let mut chunk = [0u8; 1024];
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                return;
            }
            buffer.extend_from_slice(&chunk[..n]);

            if let Some(pos) = buffer.windows(4).position(|window| window == b"\r\n\r\n") {
                let header_end = pos + 4;
                let headers_str = String::from_utf8_lossy(&buffer[..header_end]).to_lowercase();
                let content_length = headers_str
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length: "))
                    .and_then(|len| len.trim().parse::<usize>().ok())
                    .unwrap_or(0);

                let mut body_len = buffer.len() - header_end;
                while body_len < content_length {
                    let n = socket.read(&mut chunk).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    body_len += n;
                }
                break;
            }
        }

        let response_head = "HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\ntransfer-encoding: chunked\r\n\r\n";
        socket.write_all(response_head.as_bytes()).await.unwrap();
        socket.flush().await.unwrap();

        for piece in pieces {
            if gate_rx.recv().await.is_none() {
                return;
            }
            let framed = format!("{:x}\r\n{}\r\n", piece.len(), piece);
            socket.write_all(framed.as_bytes()).await.unwrap();
            socket.flush().await.unwrap();
        }

        if gate_rx.recv().await.is_none() {
            return;
        }
        match ending {
            Ending::Clean => {
                socket.write_all(b"0\r\n\r\n").await.unwrap();
                socket.flush().await.unwrap();
            }
            Ending::Abort => {
                socket.shutdown().await.ok();
            }
        }
    });

    (format!("http://{addr}"), gate_tx, handle)
}
