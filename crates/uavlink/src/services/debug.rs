use super::{Service, ServiceContext};
use mavlink::common::MavMessage;
use mavlink::MavHeader;
use tracing::{debug, info, warn};

/// Interprets the vehicle-side self-test payload carried in MEMORY_VECT
/// messages. In verification mode the payload is checked against the
/// known-good incrementing pattern.
pub(crate) struct DebugService {
    verify: bool,
}

impl DebugService {
    pub fn new(verify: bool) -> Self {
        Self { verify }
    }
}

impl Service for DebugService {
    fn recv_message(&mut self, _ctx: &ServiceContext, _header: &MavHeader, message: &MavMessage) {
        if let MavMessage::MEMORY_VECT(data) = message {
            if self.verify {
                if matches_test_pattern(&data.value) {
                    info!("link self-test passed");
                } else {
                    warn!("link self-test failed: payload deviates from pattern");
                }
            } else {
                debug!("debug vector received (address {})", data.address);
            }
        }
    }
}

fn matches_test_pattern(values: &[i8; 32]) -> bool {
    values
        .iter()
        .enumerate()
        .all(|(index, value)| *value == index as i8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testutil;
    use mavlink::common;

    fn memory_vect(values: [i8; 32]) -> MavMessage {
        MavMessage::MEMORY_VECT(common::MEMORY_VECT_DATA {
            address: 0,
            ver: 0,
            mavtype: 0,
            value: values,
        })
    }

    #[test]
    fn recognizes_the_known_good_pattern() {
        let mut values = [0i8; 32];
        for (index, value) in values.iter_mut().enumerate() {
            *value = index as i8;
        }
        assert!(matches_test_pattern(&values));

        values[13] = 0;
        assert!(!matches_test_pattern(&values));
    }

    #[test]
    fn handles_payloads_without_panicking() {
        let mut service = DebugService::new(true);
        let (ctx, _command_rx) = testutil::context();
        service.recv_message(&ctx, &testutil::vehicle_header(), &memory_vect([0i8; 32]));

        let mut service = DebugService::new(false);
        service.recv_message(&ctx, &testutil::vehicle_header(), &memory_vect([0i8; 32]));
    }
}
