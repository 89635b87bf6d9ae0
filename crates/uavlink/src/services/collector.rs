use super::{Service, ServiceContext};
use crate::outputs::{MessageKind, MessageRecord};
use mavlink::common::MavMessage;
use mavlink::MavHeader;
use std::sync::mpsc;

/// Appends an audit record for every inbound message, for external tooling.
pub(crate) struct MessageCollectorService {
    audit: mpsc::Sender<MessageRecord>,
}

impl MessageCollectorService {
    pub fn new(audit: mpsc::Sender<MessageRecord>) -> Self {
        Self { audit }
    }
}

impl Service for MessageCollectorService {
    fn recv_message(&mut self, _ctx: &ServiceContext, header: &MavHeader, message: &MavMessage) {
        let _ = self.audit.send(MessageRecord {
            kind: MessageKind::of(message),
            system_id: header.system_id,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testutil;
    use mavlink::common;

    #[test]
    fn records_every_inbound_message() {
        let (audit_tx, audit_rx) = mpsc::channel();
        let mut service = MessageCollectorService::new(audit_tx);
        let (ctx, _command_rx) = testutil::context();
        let header = testutil::vehicle_header();

        service.recv_message(
            &ctx,
            &header,
            &MavMessage::ENCAPSULATED_DATA(common::ENCAPSULATED_DATA_DATA {
                seqnr: 7,
                data: [0u8; 253],
            }),
        );
        service.recv_message(
            &ctx,
            &header,
            &MavMessage::VFR_HUD(common::VFR_HUD_DATA {
                airspeed: 0.0,
                groundspeed: 0.0,
                alt: 0.0,
                climb: 0.0,
                heading: 0,
                throttle: 0,
            }),
        );

        assert_eq!(
            audit_rx.try_recv(),
            Ok(MessageRecord {
                kind: MessageKind::ImageChunk,
                system_id: 1,
            })
        );
        assert_eq!(
            audit_rx.try_recv(),
            Ok(MessageRecord {
                kind: MessageKind::Other,
                system_id: 1,
            })
        );
    }
}
