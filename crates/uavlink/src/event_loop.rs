use crate::command::{Command, VehicleTarget};
use crate::config::LinkConfig;
use crate::services::{Service, ServiceContext};
use mavlink::common;
use mavlink::{MavConnection, MavHeader};
use std::sync::atomic::Ordering;
use std::sync::mpsc;
use std::thread;
use tracing::{debug, warn};

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum LoopExit {
    /// Stop flag observed: explicit disconnect or a service-triggered one.
    Stopped,
    /// Fatal transport error; the caller must tear the connection down.
    Fault,
}

/// The dispatch loop: sole owner of the transport for the lifetime of one
/// connection. Each cycle ticks every service, drains all available inbound
/// messages through every service, flushes the command queue to the wire,
/// then sleeps for `cycle_interval`.
pub(crate) fn run_dispatch_loop(
    connection: Box<dyn MavConnection<common::MavMessage> + Send>,
    command_rx: mpsc::Receiver<Command>,
    mut services: Vec<Box<dyn Service>>,
    ctx: ServiceContext,
    config: LinkConfig,
) -> LoopExit {
    let default_target = VehicleTarget::from_config(&config);
    let mut vehicle_target: Option<VehicleTarget> = None;
    let mut sequence: u8 = 0;

    debug!("dispatch loop started");

    loop {
        if ctx.stop_flag.load(Ordering::Relaxed) {
            debug!("dispatch loop stopped");
            return LoopExit::Stopped;
        }

        for service in services.iter_mut() {
            service.tick(&ctx);
        }

        loop {
            match connection.try_recv() {
                Ok((header, message)) => {
                    update_vehicle_target(&mut vehicle_target, &header, &message);
                    for service in services.iter_mut() {
                        service.recv_message(&ctx, &header, &message);
                    }
                    ctx.callbacks.fire_message(&message);
                }
                Err(err) => {
                    if is_non_fatal_read_error(&err) {
                        break;
                    }
                    warn!("receive failed: {err}");
                    return LoopExit::Fault;
                }
            }
        }

        while let Ok(command) = command_rx.try_recv() {
            let header = MavHeader {
                system_id: config.gcs_system_id,
                component_id: config.gcs_component_id,
                sequence,
            };
            sequence = sequence.wrapping_add(1);
            let message = command.encode(vehicle_target.unwrap_or(default_target));
            if let Err(err) = connection.send(&header, &message) {
                warn!("send failed: {err}");
                return LoopExit::Fault;
            }
        }

        thread::sleep(config.cycle_interval);
    }
}

fn update_vehicle_target(
    vehicle_target: &mut Option<VehicleTarget>,
    header: &MavHeader,
    message: &common::MavMessage,
) {
    if header.system_id == 0 {
        return;
    }

    if matches!(message, common::MavMessage::HEARTBEAT(_)) || vehicle_target.is_none() {
        *vehicle_target = Some(VehicleTarget {
            system_id: header.system_id,
            component_id: header.component_id,
        });
    }
}

fn is_non_fatal_read_error(error: &mavlink::error::MessageReadError) -> bool {
    match error {
        mavlink::error::MessageReadError::Io(io_error) => {
            io_error.kind() == std::io::ErrorKind::WouldBlock
                || io_error.kind() == std::io::ErrorKind::TimedOut
        }
        _ => false,
    }
}
