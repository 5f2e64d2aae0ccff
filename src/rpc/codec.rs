//! Server codec running one request/response cycle over a duplex connection

use std::{io, sync::Arc};

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::rpc::{
    dispatcher::Dispatcher,
    server::{handle_body, Reply},
};

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to read request: {0}")]
    Read(#[source] io::Error),
    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to write response: {0}")]
    Write(#[source] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Served {
    /// A response envelope (or batch) was written to the connection.
    Response,
    /// Only notifications were received; nothing was written.
    NoContent,
}

#[derive(Debug, Clone)]
pub struct ServerCodec {
    dispatcher: Arc<Dispatcher>,
}

impl ServerCodec {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    pub async fn serve_request<C>(&self, conn: &mut C) -> Result<Served, CodecError>
    where
        C: AsyncRead + AsyncWrite + Unpin,
    {
        let mut body = Vec::new();
        conn.read_to_end(&mut body).await.map_err(CodecError::Read)?;

        let reply: Reply = handle_body(&self.dispatcher, &body).await;
        let Some(encoded) = reply.to_json() else {
            return Ok(Served::NoContent);
        };
        let encoded = encoded?;

        conn.write_all(&encoded).await.map_err(CodecError::Write)?;
        conn.flush().await.map_err(CodecError::Write)?;
        conn.shutdown().await.map_err(CodecError::Write)?;
        Ok(Served::Response)
    }
}
