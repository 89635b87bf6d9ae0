pub(crate) mod collector;
pub(crate) mod debug;
pub(crate) mod forward;
pub(crate) mod heartbeat;
pub(crate) mod image;
pub(crate) mod status;

use crate::callbacks::CallbackRegistry;
use crate::command::Command;
use crate::config::LinkConfig;
use crate::outputs::OutputWriters;
use mavlink::common::MavMessage;
use mavlink::MavHeader;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;

/// One communication concern of the link. Services see every inbound
/// message and get a periodic tick; both run on the dispatch loop thread
/// and must stay bounded and non-blocking.
pub(crate) trait Service: Send {
    fn recv_message(&mut self, ctx: &ServiceContext, header: &MavHeader, message: &MavMessage);

    fn tick(&mut self, _ctx: &ServiceContext) {}
}

/// Shared handles a service needs to act on the link.
#[derive(Clone)]
pub(crate) struct ServiceContext {
    pub commands: mpsc::Sender<Command>,
    pub callbacks: Arc<CallbackRegistry>,
    pub stop_flag: Arc<AtomicBool>,
}

impl ServiceContext {
    /// Enqueue an outbound command for the next dispatch cycle.
    pub fn submit(&self, command: Command) {
        let _ = self.commands.send(command);
    }

    /// Ask the dispatch loop to tear the connection down. Safe to call from
    /// a service's own tick; the loop observes the flag at the top of the
    /// next cycle.
    pub fn request_disconnect(&self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }
}

/// The fixed service list for one connection, in dispatch order.
pub(crate) fn build_services(
    config: &LinkConfig,
    writers: &OutputWriters,
) -> Vec<Box<dyn Service>> {
    vec![
        Box::new(heartbeat::HeartbeatService::new(
            config.heartbeat_interval,
            config.heartbeat_timeout_multiplier,
        )),
        Box::new(image::ImageTransferService::new(
            config.image_dir.clone(),
            writers.images.clone(),
        )),
        Box::new(status::StatusEchoService::new(writers.status.clone())),
        Box::new(collector::MessageCollectorService::new(writers.audit.clone())),
        Box::new(debug::DebugService::new(config.verify_debug_payload)),
        Box::new(forward::CommandForwardService::new(config.gcs_system_id)),
    ]
}
