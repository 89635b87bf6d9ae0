use crate::error::LinkError;

const ADDRESS_SCHEMES: &[&str] = &["udpin:", "udpout:", "udpbcast:", "tcpin:", "tcpout:", "serial:"];

/// Resolve a device descriptor to a mavlink address string.
///
/// Explicit address strings pass through untouched. Bare descriptors naming
/// a serial/USB-style device get the configured baud rate; anything else is
/// treated as a network endpoint.
pub(crate) fn resolve_descriptor(descriptor: &str, serial_baud: u32) -> String {
    if ADDRESS_SCHEMES
        .iter()
        .any(|scheme| descriptor.starts_with(scheme))
    {
        return descriptor.to_string();
    }
    if is_serial_device(descriptor) {
        format!("serial:{descriptor}:{serial_baud}")
    } else {
        format!("tcpout:{descriptor}")
    }
}

fn is_serial_device(descriptor: &str) -> bool {
    descriptor.starts_with("/dev/")
        || descriptor.starts_with("COM")
        || descriptor.starts_with("\\\\.\\COM")
}

/// Map a connection-establishment failure to a caller-distinguishable error.
pub(crate) fn classify_connect_error(error: std::io::Error) -> LinkError {
    match error.kind() {
        std::io::ErrorKind::ConnectionRefused => LinkError::Refused,
        std::io::ErrorKind::ConnectionReset => LinkError::Reset,
        std::io::ErrorKind::ConnectionAborted => LinkError::Aborted,
        _ => LinkError::Transport(error.to_string()),
    }
}

/// Enumerate serial ports available on this host.
pub fn list_serial_ports() -> Result<Vec<String>, String> {
    let ports = serialport::available_ports()
        .map_err(|err| format!("unable to list serial ports: {err}"))?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}
