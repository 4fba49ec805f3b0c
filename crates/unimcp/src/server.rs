//! MCP stdio server.
//!
//! Reads newline-delimited JSON-RPC messages, runs each request on its own
//! task, and funnels responses through a single writer task so output lines
//! never interleave. Notifications get no response; `notifications/cancelled`
//! cancels the matching in-flight request, which then answers nothing.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde::Serialize;
use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use unimcp_core::{CoreError, Dispatcher};

use crate::protocol::{
    CancelledParams, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, InitializeResult,
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, METHOD_NOT_FOUND, PARSE_ERROR, ToolCallParams,
    ToolCallResult, ToolsListResult,
};

type Outbox = UnboundedSender<JsonRpcResponse>;

pub struct Server {
    dispatcher: Dispatcher,
    /// Keyed by the request id's JSON text. The sequence number tells a
    /// reused id's entries apart.
    in_flight: Arc<DashMap<String, (u64, CancellationToken)>>,
    next_seq: AtomicU64,
    shutdown: CancellationToken,
}

impl Server {
    pub fn new(dispatcher: Dispatcher, shutdown: CancellationToken) -> Self {
        Self {
            dispatcher,
            in_flight: Arc::new(DashMap::new()),
            next_seq: AtomicU64::new(0),
            shutdown,
        }
    }

    /// Serve until `reader` hits EOF or shutdown is signalled.
    ///
    /// On EOF, requests already accepted still run to completion and are
    /// answered. Shutdown cancels them instead.
    pub async fn run<R, W>(&self, reader: R, writer: W) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let writer_task = tokio::spawn(write_responses(writer, rx));
        let mut tasks = JoinSet::new();
        let mut lines = reader.split(b'\n');

        info!(tools = self.dispatcher.registry().len(), "MCP server started");

        loop {
            let segment = tokio::select! {
                biased;
                () = self.shutdown.cancelled() => break,
                segment = lines.next_segment() => segment?,
            };
            let Some(segment) = segment else { break };

            let line = segment.trim_ascii();
            if !line.is_empty() {
                self.accept(line, &tx, &mut tasks);
            }
            while tasks.try_join_next().is_some() {}
        }

        while tasks.join_next().await.is_some() {}
        drop(tx);

        info!("MCP server stopped");
        writer_task.await.map_err(io::Error::other)?
    }

    fn accept(&self, line: &[u8], tx: &Outbox, tasks: &mut JoinSet<()>) {
        let request = match parse(line) {
            Ok(request) => request,
            Err(response) => {
                send(tx, response);
                return;
            }
        };

        let Some(id) = request.id else {
            self.notify(&request.method, request.params);
            return;
        };

        let key = id.to_string();
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let token = self.shutdown.child_token();
        if self.in_flight.insert(key.clone(), (seq, token.clone())).is_some() {
            warn!(id = %key, "request id reused while still in flight");
        }

        let dispatcher = self.dispatcher.clone();
        let in_flight = Arc::clone(&self.in_flight);
        let tx = tx.clone();

        tasks.spawn(async move {
            debug!(id = %key, method = %request.method, "request");
            let outcome = tokio::select! {
                () = token.cancelled() => None,
                result = respond(&dispatcher, &request.method, request.params) => Some(result),
            };
            in_flight.remove_if(&key, |_, (owner, _)| *owner == seq);

            match outcome {
                Some(Ok(result)) => send(&tx, JsonRpcResponse::success(id, result)),
                Some(Err(error)) => send(&tx, JsonRpcResponse::error(id, error)),
                None => debug!(id = %key, "request cancelled"),
            }
        });
    }

    fn notify(&self, method: &str, params: Value) {
        match method {
            "notifications/cancelled" => match serde_json::from_value::<CancelledParams>(params) {
                Ok(cancel) => {
                    let key = cancel.request_id.to_string();
                    if let Some((_, (_, token))) = self.in_flight.remove(&key) {
                        debug!(id = %key, reason = ?cancel.reason, "cancelling request");
                        token.cancel();
                    }
                }
                Err(err) => warn!(error = %err, "malformed cancellation"),
            },
            other => debug!(method = other, "notification"),
        }
    }
}

fn parse(line: &[u8]) -> Result<JsonRpcRequest, JsonRpcResponse> {
    let value: Value = serde_json::from_slice(line).map_err(|e| {
        JsonRpcResponse::error(
            Value::Null,
            JsonRpcError::new(PARSE_ERROR, format!("Parse error: {e}")),
        )
    })?;

    let id = value.get("id").cloned().unwrap_or(Value::Null);
    let invalid = |reason: String| {
        JsonRpcResponse::error(
            id.clone(),
            JsonRpcError::new(INVALID_REQUEST, format!("Invalid request: {reason}")),
        )
    };

    let request: JsonRpcRequest =
        serde_json::from_value(value).map_err(|e| invalid(e.to_string()))?;
    if request.jsonrpc != "2.0" {
        return Err(invalid("jsonrpc must be \"2.0\"".into()));
    }
    Ok(request)
}

async fn respond(
    dispatcher: &Dispatcher,
    method: &str,
    params: Value,
) -> Result<Value, JsonRpcError> {
    match method {
        "initialize" => to_result(&InitializeResult::default()),
        "ping" => Ok(json!({})),
        "tools/list" => to_result(&ToolsListResult {
            tools: dispatcher.registry().definitions().collect(),
        }),
        "tools/call" => {
            let params: ToolCallParams = serde_json::from_value(params)
                .map_err(|e| JsonRpcError::new(INVALID_PARAMS, format!("Invalid params: {e}")))?;

            let result = match dispatcher.call(&params.name, params.arguments).await {
                Ok(Ok(envelope)) => ToolCallResult::json(&envelope),
                Ok(Err(tool_error)) => ToolCallResult::error(&tool_error),
                Err(err @ CoreError::ToolNotFound { .. }) => {
                    return Err(JsonRpcError::new(INVALID_PARAMS, err.to_string()));
                }
                Err(err) => return Err(JsonRpcError::new(INTERNAL_ERROR, err.to_string())),
            };
            to_result(&result)
        }
        other => Err(JsonRpcError::new(
            METHOD_NOT_FOUND,
            format!("Method not found: {other}"),
        )),
    }
}

fn to_result<T: Serialize>(value: &T) -> Result<Value, JsonRpcError> {
    serde_json::to_value(value)
        .map_err(|e| JsonRpcError::new(INTERNAL_ERROR, format!("Serialization error: {e}")))
}

fn send(tx: &Outbox, response: JsonRpcResponse) {
    if tx.send(response).is_err() {
        warn!("response dropped, writer closed");
    }
}

async fn write_responses<W>(
    mut writer: W,
    mut rx: UnboundedReceiver<JsonRpcResponse>,
) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let mut line = serde_json::to_vec(&response)?;
        line.push(b'\n');
        writer.write_all(&line).await?;
        writer.flush().await?;
    }
    Ok(())
}
