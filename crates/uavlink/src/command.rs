use crate::config::LinkConfig;
use mavlink::common::{self, MavCmd, MavResult};

/// Identity of the remote vehicle, learned from inbound message headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VehicleTarget {
    pub system_id: u8,
    pub component_id: u8,
}

impl VehicleTarget {
    pub(crate) fn from_config(config: &LinkConfig) -> Self {
        Self {
            system_id: config.default_target_system,
            component_id: config.default_target_component,
        }
    }
}

/// An outbound instruction for the vehicle. Immutable once constructed;
/// consumed exactly once by the dispatch loop.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Heartbeat,
    SetCamera { enabled: bool },
    SetMode { custom_mode: u32 },
    SetLights { on: bool },
    /// Ask the vehicle to (re)transmit the current image.
    RequestImage,
    /// Acknowledge a vehicle-originated command.
    Acknowledge { command: MavCmd, result: MavResult },
}

impl Command {
    pub(crate) fn encode(&self, target: VehicleTarget) -> common::MavMessage {
        match self {
            Command::Heartbeat => common::MavMessage::HEARTBEAT(common::HEARTBEAT_DATA {
                custom_mode: 0,
                mavtype: common::MavType::MAV_TYPE_GCS,
                autopilot: common::MavAutopilot::MAV_AUTOPILOT_INVALID,
                base_mode: common::MavModeFlag::empty(),
                system_status: common::MavState::MAV_STATE_ACTIVE,
                mavlink_version: 3,
            }),
            Command::SetCamera { enabled } => command_long(
                target,
                MavCmd::MAV_CMD_DO_DIGICAM_CONTROL,
                [bool_param(*enabled), 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            ),
            Command::SetMode { custom_mode } => command_long(
                target,
                MavCmd::MAV_CMD_DO_SET_MODE,
                [1.0, *custom_mode as f32, 0.0, 0.0, 0.0, 0.0, 0.0],
            ),
            Command::SetLights { on } => command_long(
                target,
                MavCmd::MAV_CMD_DO_SET_RELAY,
                [0.0, bool_param(*on), 0.0, 0.0, 0.0, 0.0, 0.0],
            ),
            Command::RequestImage => common::MavMessage::DATA_TRANSMISSION_HANDSHAKE(
                common::DATA_TRANSMISSION_HANDSHAKE_DATA {
                    size: 0,
                    width: 0,
                    height: 0,
                    packets: 0,
                    mavtype: common::MavlinkDataStreamType::MAVLINK_DATA_STREAM_IMG_JPEG,
                    payload: 0,
                    jpg_quality: 0,
                },
            ),
            Command::Acknowledge { command, result } => {
                common::MavMessage::COMMAND_ACK(common::COMMAND_ACK_DATA {
                    command: *command,
                    result: *result,
                    progress: 0,
                    result_param2: 0,
                    target_system: target.system_id,
                    target_component: target.component_id,
                })
            }
        }
    }
}

fn bool_param(value: bool) -> f32 {
    if value {
        1.0
    } else {
        0.0
    }
}

fn command_long(target: VehicleTarget, command: MavCmd, params: [f32; 7]) -> common::MavMessage {
    common::MavMessage::COMMAND_LONG(common::COMMAND_LONG_DATA {
        target_system: target.system_id,
        target_component: target.component_id,
        command,
        confirmation: 0,
        param1: params[0],
        param2: params[1],
        param3: params[2],
        param4: params[3],
        param5: params[4],
        param6: params[5],
        param7: params[6],
    })
}
