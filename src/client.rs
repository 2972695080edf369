use anyhow::Context;
use log::debug;
use std::net::UdpSocket;
use std::time::Duration;

use crate::server::MAX_DATAGRAM_SIZE;

/// Send `payload` to `address` and wait up to `timeout` for the echo.
pub fn probe(address: &str, payload: &[u8], timeout: Duration) -> anyhow::Result<Vec<u8>> {
    let socket = UdpSocket::bind("127.0.0.1:0")?;
    socket.set_read_timeout(Some(timeout))?;
    socket.send_to(payload, address)?;

    let mut buf = [0u8; MAX_DATAGRAM_SIZE];
    let (size, src) = socket
        .recv_from(&mut buf)
        .context("No reply received within the timeout")?;
    debug!("reply from {}, size: {}", src, size);
    Ok(buf[..size].to_vec())
}
