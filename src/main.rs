mod config;
mod logic;
mod metadata;
mod protocol;

use std::sync::Arc;

use anyhow::{Context, Result};
use bytes::BytesMut;
use clap::Parser;
use tokio::net::{TcpListener, TcpStream};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    signal,
};

use config::Config;
use logic::UnsupportedApiKeyError;
use metadata::MetadataStore;
use protocol::{request, ResponseMessage};

const MAX_MESSAGE_SIZE: usize = 1_000_000;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::parse();

    let store = Arc::new(MetadataStore::load(&config.metadata_log));

    let listener = match TcpListener::bind(&config.listen_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(addr = %config.listen_addr, %err, "failed to bind listener");
            return Err(err).context("bind listener");
        }
    };

    tracing::info!(addr = %config.listen_addr, "listening for connections");

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer_addr) = accepted.context("accept connection")?;
                let store = Arc::clone(&store);

                tokio::spawn(async move {
                    tracing::info!(%peer_addr, "accepted new connection");
                    if let Err(err) = handle_connection(stream, &store).await {
                        tracing::warn!(%peer_addr, %err, "connection closed with error");
                    } else {
                        tracing::debug!(%peer_addr, "connection closed");
                    }
                });
            }
            _ = signal::ctrl_c() => {
                tracing::info!("received shutdown signal, stopping accept loop");
                return Ok(());
            }
        }
    }
}

pub async fn handle_connection(mut stream: TcpStream, store: &MetadataStore) -> Result<()> {
    // peek into the stream and try to read msg size to check if connection is still open
    while stream.peek(&mut [0; 4]).await.is_ok() {
        let mut msg_size_buf = [0u8; 4];
        stream
            .read_exact(&mut msg_size_buf)
            .await
            .context("read message size")?;

        let msg_size = i32::from_be_bytes(msg_size_buf);
        if msg_size <= 0 || msg_size as usize > MAX_MESSAGE_SIZE {
            tracing::warn!(msg_size, "rejecting frame with invalid message_size");
            return Ok(());
        }
        let msg_size = msg_size as usize;

        let mut msg = BytesMut::with_capacity(msg_size);
        msg.resize(msg_size, 0);
        stream
            .read_exact(&mut msg)
            .await
            .context("read message data")?;

        let mut msg = msg.freeze();

        let header = request::HeaderV2::from_bytes(&mut msg.clone())
            .context("decode request header")?;
        tracing::debug!(client_id = ?header.client_id, api_key = header.request_api_key, "decoded request header");

        let resp = match logic::process(header.request_api_key, store, &mut msg)
            .context("process request")
        {
            Ok(resp) => resp,
            Err(err) => match err.downcast_ref::<UnsupportedApiKeyError>() {
                Some(e) => {
                    tracing::warn!(%e, "closing connection after unsupported api key");
                    return Ok(());
                }
                None => return Err(err),
            },
        };

        let resp_message = ResponseMessage::from_bytes(resp.as_bytes());

        stream
            .write_all(resp_message.as_bytes())
            .await
            .context("write response")?
    }

    Ok(())
}
