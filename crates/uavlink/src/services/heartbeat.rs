use super::{Service, ServiceContext};
use crate::command::Command;
use mavlink::common::MavMessage;
use mavlink::MavHeader;
use std::time::{Duration, Instant};
use tracing::warn;

/// Keeps the link alive in both directions: sends a GCS heartbeat every
/// `interval` and declares the link lost when the vehicle stays silent for
/// `timeout_multiplier * interval`.
pub(crate) struct HeartbeatService {
    interval: Duration,
    timeout_multiplier: u32,
    last_sent: Instant,
    last_received: Instant,
    timed_out: bool,
}

impl HeartbeatService {
    pub fn new(interval: Duration, timeout_multiplier: u32) -> Self {
        let now = Instant::now();
        Self {
            interval,
            timeout_multiplier,
            last_sent: now,
            last_received: now,
            timed_out: false,
        }
    }
}

impl Service for HeartbeatService {
    fn recv_message(&mut self, _ctx: &ServiceContext, header: &MavHeader, message: &MavMessage) {
        if header.system_id == 0 {
            return;
        }
        if matches!(message, MavMessage::HEARTBEAT(_)) {
            self.last_received = Instant::now();
        }
    }

    fn tick(&mut self, ctx: &ServiceContext) {
        if self.last_sent.elapsed() >= self.interval {
            ctx.submit(Command::Heartbeat);
            self.last_sent = Instant::now();
        }

        if self.timeout_multiplier == 0 || self.timed_out {
            return;
        }
        if self.last_received.elapsed() >= self.interval * self.timeout_multiplier {
            // Link lost, not an error: the connection manager reports it
            // through the connection-changed callback.
            self.timed_out = true;
            warn!(
                "no heartbeat from vehicle for {}x interval, dropping link",
                self.timeout_multiplier
            );
            ctx.request_disconnect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testutil;
    use mavlink::common;
    use std::sync::atomic::Ordering;
    use std::thread;

    fn vehicle_heartbeat() -> MavMessage {
        MavMessage::HEARTBEAT(common::HEARTBEAT_DATA {
            custom_mode: 0,
            mavtype: common::MavType::MAV_TYPE_FIXED_WING,
            autopilot: common::MavAutopilot::MAV_AUTOPILOT_ARDUPILOTMEGA,
            base_mode: common::MavModeFlag::empty(),
            system_status: common::MavState::MAV_STATE_ACTIVE,
            mavlink_version: 3,
        })
    }

    #[test]
    fn sends_exactly_one_heartbeat_per_elapsed_interval() {
        let (ctx, command_rx) = testutil::context();
        let mut service = HeartbeatService::new(Duration::from_millis(40), 0);

        // Nothing is due right after construction.
        service.tick(&ctx);
        assert!(command_rx.try_recv().is_err());

        thread::sleep(Duration::from_millis(50));
        service.tick(&ctx);
        service.tick(&ctx);
        assert_eq!(command_rx.try_recv(), Ok(Command::Heartbeat));
        assert!(command_rx.try_recv().is_err());
    }

    #[test]
    fn silence_beyond_timeout_requests_disconnect_once() {
        let (ctx, _command_rx) = testutil::context();
        let mut service = HeartbeatService::new(Duration::from_millis(10), 2);

        thread::sleep(Duration::from_millis(30));
        service.tick(&ctx);
        assert!(ctx.stop_flag.load(Ordering::Relaxed));

        // The trigger latches; further ticks do not re-fire.
        ctx.stop_flag.store(false, Ordering::Relaxed);
        service.tick(&ctx);
        assert!(!ctx.stop_flag.load(Ordering::Relaxed));
    }

    #[test]
    fn inbound_heartbeat_resets_the_timeout() {
        let (ctx, _command_rx) = testutil::context();
        let mut service = HeartbeatService::new(Duration::from_millis(20), 2);

        thread::sleep(Duration::from_millis(30));
        service.recv_message(&ctx, &testutil::vehicle_header(), &vehicle_heartbeat());
        service.tick(&ctx);
        assert!(!ctx.stop_flag.load(Ordering::Relaxed));
    }

    #[test]
    fn zero_multiplier_disables_the_timeout() {
        let (ctx, _command_rx) = testutil::context();
        let mut service = HeartbeatService::new(Duration::from_millis(5), 0);

        thread::sleep(Duration::from_millis(30));
        service.tick(&ctx);
        // Only the periodic heartbeat fires, never a disconnect.
        assert!(!ctx.stop_flag.load(Ordering::Relaxed));
    }
}
