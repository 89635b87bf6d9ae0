use mavlink::common;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::mpsc;

/// Free-text diagnostic message relayed from the vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusText {
    pub severity: StatusSeverity,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusSeverity {
    Emergency,
    Alert,
    Critical,
    Error,
    Warning,
    Notice,
    Info,
    Debug,
}

impl StatusSeverity {
    pub(crate) fn from_mav(severity: common::MavSeverity) -> Self {
        use common::MavSeverity;
        match severity {
            MavSeverity::MAV_SEVERITY_EMERGENCY => StatusSeverity::Emergency,
            MavSeverity::MAV_SEVERITY_ALERT => StatusSeverity::Alert,
            MavSeverity::MAV_SEVERITY_CRITICAL => StatusSeverity::Critical,
            MavSeverity::MAV_SEVERITY_ERROR => StatusSeverity::Error,
            MavSeverity::MAV_SEVERITY_WARNING => StatusSeverity::Warning,
            MavSeverity::MAV_SEVERITY_NOTICE => StatusSeverity::Notice,
            MavSeverity::MAV_SEVERITY_INFO => StatusSeverity::Info,
            _ => StatusSeverity::Debug,
        }
    }
}

/// Lightweight audit record appended for every inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub kind: MessageKind,
    pub system_id: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Heartbeat,
    StatusText,
    Command,
    CommandAck,
    ImageChunk,
    ImageHandshake,
    DebugVector,
    Other,
}

impl MessageKind {
    pub fn of(message: &common::MavMessage) -> Self {
        match message {
            common::MavMessage::HEARTBEAT(_) => MessageKind::Heartbeat,
            common::MavMessage::STATUSTEXT(_) => MessageKind::StatusText,
            common::MavMessage::COMMAND_LONG(_) => MessageKind::Command,
            common::MavMessage::COMMAND_ACK(_) => MessageKind::CommandAck,
            common::MavMessage::ENCAPSULATED_DATA(_) => MessageKind::ImageChunk,
            common::MavMessage::DATA_TRANSMISSION_HANDSHAKE(_) => MessageKind::ImageHandshake,
            common::MavMessage::MEMORY_VECT(_) => MessageKind::DebugVector,
            _ => MessageKind::Other,
        }
    }
}

/// Acknowledgment of a previously submitted command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandAck {
    pub command: common::MavCmd,
    pub result: AckResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AckResult {
    Accepted,
    TemporarilyRejected,
    Denied,
    Unsupported,
    InProgress,
    Cancelled,
    Failed,
}

impl AckResult {
    pub(crate) fn from_mav(result: common::MavResult) -> Self {
        use common::MavResult;
        match result {
            MavResult::MAV_RESULT_ACCEPTED => AckResult::Accepted,
            MavResult::MAV_RESULT_TEMPORARILY_REJECTED => AckResult::TemporarilyRejected,
            MavResult::MAV_RESULT_DENIED => AckResult::Denied,
            MavResult::MAV_RESULT_UNSUPPORTED => AckResult::Unsupported,
            MavResult::MAV_RESULT_IN_PROGRESS => AckResult::InProgress,
            MavResult::MAV_RESULT_CANCELLED => AckResult::Cancelled,
            _ => AckResult::Failed,
        }
    }
}

/// A successfully reconstructed image, handed to the consumer together with
/// its metadata sidecar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedImage {
    pub image_path: PathBuf,
    pub info_path: PathBuf,
}

/// Metadata written next to every reconstructed image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub index: u32,
    pub size_bytes: u32,
    pub width: u16,
    pub height: u16,
    pub packets: u16,
    pub chunk_payload: u8,
    pub jpg_quality: u8,
}

/// Writer side of the output queues, cloned into the services.
#[derive(Clone)]
pub(crate) struct OutputWriters {
    pub images: mpsc::Sender<CompletedImage>,
    pub status: mpsc::Sender<StatusText>,
    pub audit: mpsc::Sender<MessageRecord>,
}

/// Reader side, handed to the embedding application once at construction.
pub struct OutputQueues {
    pub images: mpsc::Receiver<CompletedImage>,
    pub status: mpsc::Receiver<StatusText>,
    pub audit: mpsc::Receiver<MessageRecord>,
}

pub(crate) fn create_channels() -> (OutputWriters, OutputQueues) {
    let (images_tx, images_rx) = mpsc::channel();
    let (status_tx, status_rx) = mpsc::channel();
    let (audit_tx, audit_rx) = mpsc::channel();

    let writers = OutputWriters {
        images: images_tx,
        status: status_tx,
        audit: audit_tx,
    };

    let queues = OutputQueues {
        images: images_rx,
        status: status_rx,
        audit: audit_rx,
    };

    (writers, queues)
}
