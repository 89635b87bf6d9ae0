use crate::outputs::{CommandAck, StatusText};
use mavlink::common;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

type ConnectionCallback = Arc<dyn Fn(bool) + Send + Sync>;
type AckCallback = Arc<dyn Fn(&CommandAck) + Send + Sync>;
type StatusCallback = Arc<dyn Fn(&StatusText) + Send + Sync>;
type MessageCallback = Arc<dyn Fn(&common::MavMessage) + Send + Sync>;

/// Append-only subscriber lists, invoked synchronously in registration
/// order. A panicking subscriber is isolated so the remaining subscribers
/// still run and the dispatch loop survives.
#[derive(Default)]
pub(crate) struct CallbackRegistry {
    connection: Mutex<Vec<ConnectionCallback>>,
    command_ack: Mutex<Vec<AckCallback>>,
    status: Mutex<Vec<StatusCallback>>,
    message: Mutex<Vec<MessageCallback>>,
}

impl CallbackRegistry {
    pub fn register_connection(&self, callback: impl Fn(bool) + Send + Sync + 'static) {
        lock(&self.connection).push(Arc::new(callback));
    }

    pub fn register_command_ack(&self, callback: impl Fn(&CommandAck) + Send + Sync + 'static) {
        lock(&self.command_ack).push(Arc::new(callback));
    }

    pub fn register_status(&self, callback: impl Fn(&StatusText) + Send + Sync + 'static) {
        lock(&self.status).push(Arc::new(callback));
    }

    pub fn register_message(
        &self,
        callback: impl Fn(&common::MavMessage) + Send + Sync + 'static,
    ) {
        lock(&self.message).push(Arc::new(callback));
    }

    pub fn fire_connection(&self, connected: bool) {
        let subscribers: Vec<ConnectionCallback> = lock(&self.connection).clone();
        fan_out(&subscribers, "connection-changed", |cb| cb(connected));
    }

    pub fn fire_command_ack(&self, ack: &CommandAck) {
        let subscribers: Vec<AckCallback> = lock(&self.command_ack).clone();
        fan_out(&subscribers, "command-acked", |cb| cb(ack));
    }

    pub fn fire_status(&self, status: &StatusText) {
        let subscribers: Vec<StatusCallback> = lock(&self.status).clone();
        fan_out(&subscribers, "status-received", |cb| cb(status));
    }

    pub fn fire_message(&self, message: &common::MavMessage) {
        let subscribers: Vec<MessageCallback> = lock(&self.message).clone();
        fan_out(&subscribers, "message-received", |cb| cb(message));
    }
}

fn lock<T>(slot: &Mutex<Vec<T>>) -> MutexGuard<'_, Vec<T>> {
    match slot.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn fan_out<T>(subscribers: &[T], registry: &str, invoke: impl Fn(&T)) {
    for subscriber in subscribers {
        if catch_unwind(AssertUnwindSafe(|| invoke(subscriber))).is_err() {
            warn!("{registry} subscriber panicked; continuing fan-out");
        }
    }
}
