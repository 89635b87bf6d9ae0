use super::{Service, ServiceContext};
use crate::outputs::{StatusSeverity, StatusText};
use mavlink::common::MavMessage;
use mavlink::MavHeader;
use std::sync::mpsc;

/// Relays vehicle STATUSTEXT diagnostics to the status queue and the
/// status-received subscribers.
pub(crate) struct StatusEchoService {
    status: mpsc::Sender<StatusText>,
}

impl StatusEchoService {
    pub fn new(status: mpsc::Sender<StatusText>) -> Self {
        Self { status }
    }
}

impl Service for StatusEchoService {
    fn recv_message(&mut self, ctx: &ServiceContext, _header: &MavHeader, message: &MavMessage) {
        if let MavMessage::STATUSTEXT(data) = message {
            let status = StatusText {
                severity: StatusSeverity::from_mav(data.severity),
                text: decode_text(&data.text[..]),
            };
            let _ = self.status.send(status.clone());
            ctx.callbacks.fire_status(&status);
        }
    }
}

/// NUL-padded fixed-size wire text to an owned string.
fn decode_text(raw: &[u8]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).into_owned()
}
