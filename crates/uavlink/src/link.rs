use crate::callbacks::CallbackRegistry;
use crate::command::Command;
use crate::config::LinkConfig;
use crate::error::LinkError;
use crate::event_loop::run_dispatch_loop;
use crate::outputs::{self, CommandAck, OutputQueues, OutputWriters, StatusText};
use crate::services::{self, ServiceContext};
use crate::transport::{classify_connect_error, resolve_descriptor};
use mavlink::common;
use mavlink::MavConnection;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};
use std::thread;
use std::thread::JoinHandle;
use tracing::debug;

/// Handle to the vehicle communication core.
///
/// `VehicleLink` is `Clone`; clones share the same connection slot, queues
/// and callback registries. At most one vehicle connection is live at a
/// time. All link I/O happens on a dedicated dispatch thread; callers only
/// touch the command queue, the output queues and the registries.
#[derive(Clone)]
pub struct VehicleLink {
    inner: Arc<LinkInner>,
}

struct LinkInner {
    config: LinkConfig,
    callbacks: Arc<CallbackRegistry>,
    writers: OutputWriters,
    active: Mutex<Option<ActiveLink>>,
    connected: AtomicBool,
}

struct ActiveLink {
    command_tx: mpsc::Sender<Command>,
    stop_flag: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl Drop for LinkInner {
    fn drop(&mut self) {
        if let Some(active) = lock_active(&self.active).take() {
            active.stop_flag.store(true, Ordering::Relaxed);
        }
    }
}

impl VehicleLink {
    /// Create a core and hand back the reader side of its output queues.
    pub fn new(config: LinkConfig) -> (Self, OutputQueues) {
        let (writers, queues) = outputs::create_channels();
        let link = Self {
            inner: Arc::new(LinkInner {
                config,
                callbacks: Arc::new(CallbackRegistry::default()),
                writers,
                active: Mutex::new(None),
                connected: AtomicBool::new(false),
            }),
        };
        (link, queues)
    }

    /// Open the transport named by `descriptor` and start the dispatch
    /// loop. Fails with `AlreadyConnected` while a connection exists;
    /// establishment failures are classified per `LinkError`.
    pub fn connect(&self, descriptor: &str) -> Result<(), LinkError> {
        if lock_active(&self.inner.active).is_some() {
            return Err(LinkError::AlreadyConnected);
        }

        let address = resolve_descriptor(descriptor, self.inner.config.serial_baud);
        debug!("connecting to {address}");
        let mut connection =
            mavlink::connect::<common::MavMessage>(&address).map_err(classify_connect_error)?;
        connection.set_allow_recv_any_version(true);

        let (command_tx, command_rx) = mpsc::channel();
        let stop_flag = Arc::new(AtomicBool::new(false));
        let services = services::build_services(&self.inner.config, &self.inner.writers);
        let ctx = ServiceContext {
            commands: command_tx.clone(),
            callbacks: self.inner.callbacks.clone(),
            stop_flag: stop_flag.clone(),
        };
        let config = self.inner.config.clone();
        // The loop thread must not keep the core alive: `Drop` on the last
        // user handle is what stops a still-running loop.
        let inner = Arc::downgrade(&self.inner);
        let loop_stop_flag = stop_flag.clone();

        let mut guard = lock_active(&self.inner.active);
        if guard.is_some() {
            return Err(LinkError::AlreadyConnected);
        }
        let task = thread::spawn(move || {
            run_dispatch_loop(Box::new(connection), command_rx, services, ctx, config);
            if let Some(inner) = inner.upgrade() {
                finish_dispatch(&inner, &loop_stop_flag);
            }
        });
        *guard = Some(ActiveLink {
            command_tx,
            stop_flag,
            task,
        });
        drop(guard);

        self.inner.connected.store(true, Ordering::SeqCst);
        self.inner.callbacks.fire_connection(true);
        Ok(())
    }

    /// Tear the connection down. No-op when disconnected. In blocking mode
    /// this waits for the connection mutex and joins the dispatch thread;
    /// otherwise a contended mutex means the call returns without effect.
    pub fn disconnect(&self, blocking: bool) {
        let taken = if blocking {
            lock_active(&self.inner.active).take()
        } else {
            match self.inner.active.try_lock() {
                Ok(mut guard) => guard.take(),
                Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner().take(),
                Err(TryLockError::WouldBlock) => {
                    debug!("connection mutex contended, skipping non-blocking disconnect");
                    return;
                }
            }
        };
        let Some(active) = taken else {
            return;
        };

        active.stop_flag.store(true, Ordering::Relaxed);
        self.inner.connected.store(false, Ordering::SeqCst);
        self.inner.callbacks.fire_connection(false);
        if blocking {
            let _ = active.task.join();
        }
    }

    /// True iff a connection exists. Consistent with the most recent
    /// connection-changed callback.
    pub fn connected(&self) -> bool {
        self.inner.connected.load(Ordering::SeqCst)
    }

    /// Enqueue a command for the dispatch loop. Never fails and never
    /// blocks; submitting while disconnected drops the command.
    pub fn submit(&self, command: Command) {
        match lock_active(&self.inner.active).as_ref() {
            Some(active) => {
                let _ = active.command_tx.send(command);
            }
            None => debug!("command submitted while disconnected, dropping"),
        }
    }

    // --- Callback registration (append-only for the core's lifetime) ---

    pub fn on_connection_changed(&self, callback: impl Fn(bool) + Send + Sync + 'static) {
        self.inner.callbacks.register_connection(callback);
    }

    pub fn on_command_ack(&self, callback: impl Fn(&CommandAck) + Send + Sync + 'static) {
        self.inner.callbacks.register_command_ack(callback);
    }

    pub fn on_status(&self, callback: impl Fn(&StatusText) + Send + Sync + 'static) {
        self.inner.callbacks.register_status(callback);
    }

    pub fn on_message(&self, callback: impl Fn(&common::MavMessage) + Send + Sync + 'static) {
        self.inner.callbacks.register_message(callback);
    }
}

/// Loop-side teardown for transport faults and service-triggered
/// disconnects. Generation-checked via the stop flag so an exiting loop
/// never tears down a connection established after it.
fn finish_dispatch(inner: &LinkInner, stop_flag: &Arc<AtomicBool>) {
    let mut guard = lock_active(&inner.active);
    let owns_slot = guard
        .as_ref()
        .map_or(false, |active| Arc::ptr_eq(&active.stop_flag, stop_flag));
    if !owns_slot {
        return;
    }
    guard.take();
    drop(guard);

    inner.connected.store(false, Ordering::SeqCst);
    inner.callbacks.fire_connection(false);
}

fn lock_active(slot: &Mutex<Option<ActiveLink>>) -> MutexGuard<'_, Option<ActiveLink>> {
    match slot.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
