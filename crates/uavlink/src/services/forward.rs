use super::{Service, ServiceContext};
use crate::command::Command;
use crate::outputs::{AckResult, CommandAck};
use mavlink::common::{self, MavMessage};
use mavlink::MavHeader;
use tracing::debug;

/// Pass-through acknowledgment routing: fans inbound COMMAND_ACKs out to
/// subscribers and answers vehicle-originated commands addressed to this
/// GCS with an accepted ack.
pub(crate) struct CommandForwardService {
    gcs_system_id: u8,
}

impl CommandForwardService {
    pub fn new(gcs_system_id: u8) -> Self {
        Self { gcs_system_id }
    }
}

impl Service for CommandForwardService {
    fn recv_message(&mut self, ctx: &ServiceContext, _header: &MavHeader, message: &MavMessage) {
        match message {
            MavMessage::COMMAND_ACK(data) => {
                let ack = CommandAck {
                    command: data.command,
                    result: AckResult::from_mav(data.result),
                };
                ctx.callbacks.fire_command_ack(&ack);
            }
            MavMessage::COMMAND_LONG(data)
                if data.target_system == self.gcs_system_id || data.target_system == 0 =>
            {
                debug!("acknowledging vehicle-originated command {:?}", data.command);
                ctx.submit(Command::Acknowledge {
                    command: data.command,
                    result: common::MavResult::MAV_RESULT_ACCEPTED,
                });
            }
            _ => {}
        }
    }
}
