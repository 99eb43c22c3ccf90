//! Native trade event stream: `tokio-tungstenite`.
//!
//! One connection per subscription:
//! - connect with timeout, send the `trades` subscribe message
//! - answer protocol pings, send application pings on an interval
//! - yield decoded `TradeEvent`s until the connection ends
//!
//! Reconnection is not handled here; the trade stream manager reopens.

use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{Bytes, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::domain::trade::wire::TradeEvent;
use crate::error::{LedgerError, WsError};
use crate::ledger::TradeEventStream;
use crate::shared::AssetSymbol;
use crate::ws::{MessageIn, MessageOut, WsConfig};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

enum Step {
    Frame(Option<Result<Message, tokio_tungstenite::tungstenite::Error>>),
    Ping,
}

/// What one inbound frame means for the stream.
#[derive(Debug)]
enum Decoded {
    Event(TradeEvent),
    PingReply(Bytes),
    Skip,
    End(Option<WsError>),
}

/// Open a trade stream for `symbol`.
pub async fn open_trade_stream(
    config: &WsConfig,
    symbol: &AssetSymbol,
    from_genesis: bool,
) -> Result<TradeEventStream, WsError> {
    let timeout = Duration::from_millis(config.connect_timeout_ms);
    let (mut sink, mut source) = attempt_connect(&config.url, timeout).await?;
    send_msg(&mut sink, &MessageOut::subscribe_trades(symbol, from_genesis)).await?;

    tracing::info!(symbol = %symbol, from_genesis, "Trade stream opened");

    let ping_every = Duration::from_millis(config.ping_interval_ms);
    let symbol = symbol.clone();

    let stream = async_stream::stream! {
        let mut ping = tokio::time::interval(ping_every);
        ping.reset();

        loop {
            let step = tokio::select! {
                frame = source.next() => Step::Frame(frame),
                _ = ping.tick() => Step::Ping,
            };

            match step {
                Step::Ping => {
                    if let Err(e) = send_msg(&mut sink, &MessageOut::Ping).await {
                        yield Err(LedgerError::Ws(e));
                        break;
                    }
                }
                Step::Frame(frame) => match decode_frame(frame) {
                    Decoded::Event(event) => {
                        yield Ok(event);
                    }
                    Decoded::PingReply(data) => {
                        let _ = sink.send(Message::Pong(data)).await;
                    }
                    Decoded::Skip => {}
                    Decoded::End(reason) => {
                        tracing::warn!(symbol = %symbol, reason = ?reason, "Trade stream ended");
                        if let Some(err) = reason {
                            yield Err(LedgerError::Ws(err));
                        }
                        break;
                    }
                },
            }
        }

        let _ = sink.close().await;
    };

    Ok(Box::pin(stream))
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

async fn attempt_connect(url: &str, timeout: Duration) -> Result<(WsSink, WsSource), WsError> {
    let (ws_stream, _) = tokio::time::timeout(timeout, connect_async(url))
        .await
        .map_err(|_| WsError::ConnectionFailed("Connection timeout".into()))?
        .map_err(|e| WsError::ConnectionFailed(e.to_string()))?;

    Ok(ws_stream.split())
}

async fn send_msg(sink: &mut WsSink, msg: &MessageOut) -> Result<(), WsError> {
    let json = serde_json::to_string(msg).map_err(|e| WsError::SendFailed(e.to_string()))?;
    sink.send(Message::Text(json.into()))
        .await
        .map_err(|e| WsError::SendFailed(e.to_string()))
}

fn decode_frame(frame: Option<Result<Message, tokio_tungstenite::tungstenite::Error>>) -> Decoded {
    match frame {
        Some(Ok(Message::Text(text))) => decode_text(text.as_str()),
        Some(Ok(Message::Ping(data))) => Decoded::PingReply(data),
        Some(Ok(Message::Close(frame))) => {
            let (code, reason) = extract_close(frame.as_ref());
            Decoded::End(Some(WsError::Closed {
                code: Some(code),
                reason,
            }))
        }
        Some(Ok(_)) => Decoded::Skip,
        Some(Err(e)) => Decoded::End(Some(WsError::ConnectionFailed(e.to_string()))),
        None => Decoded::End(None),
    }
}

fn decode_text(text: &str) -> Decoded {
    match serde_json::from_str::<MessageIn>(text) {
        Ok(MessageIn::Trade { data }) => Decoded::Event(data),
        Ok(MessageIn::Subscribed) | Ok(MessageIn::Pong) => Decoded::Skip,
        Ok(MessageIn::Error(payload)) => Decoded::End(Some(WsError::ServerError {
            message: payload.message,
            code: payload.code,
        })),
        Err(e) => {
            tracing::warn!("WS deserialization error: {}, raw: {}", e, text);
            Decoded::Skip
        }
    }
}

fn extract_close(frame: Option<&CloseFrame>) -> (u16, String) {
    match frame {
        Some(f) => (f.code.into(), f.reason.to_string()),
        None => (1006, "No close frame".into()),
    }
}
