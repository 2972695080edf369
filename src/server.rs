use anyhow::Context;
use log::debug;
use std::io::{self, ErrorKind, Write};
use std::net::{SocketAddr, UdpSocket};
use std::str;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Largest payload a single datagram can carry; longer payloads are
/// truncated by the receive buffer.
pub const MAX_DATAGRAM_SIZE: usize = 4096;

// How often the receive call and the pause wake up to check the
// shutdown flag.
const SHUTDOWN_POLL: Duration = Duration::from_millis(50);

pub struct EchoServer {
    socket: UdpSocket,
    interval: Duration,
    stop: Arc<AtomicBool>,
}

/// Stops the server loop from another thread.
#[derive(Clone)]
pub struct ShutdownHandle {
    stop: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

impl EchoServer {
    pub fn bind(address: &str, interval: Duration) -> anyhow::Result<Self> {
        let socket = UdpSocket::bind(address).context("Failed to bind socket")?;
        Ok(EchoServer {
            socket,
            interval,
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            stop: self.stop.clone(),
        }
    }

    /// Receive, log and echo datagrams until the shutdown handle fires.
    pub fn run(&self) -> anyhow::Result<()> {
        self.run_with_output(io::stdout())
    }

    /// Same loop with the `receive:` lines written to `out`.
    pub fn run_with_output<W: Write>(&self, mut out: W) -> anyhow::Result<()> {
        self.socket.set_read_timeout(Some(SHUTDOWN_POLL))?;
        let mut buf = [0u8; MAX_DATAGRAM_SIZE];
        while !self.stop.load(Ordering::Relaxed) {
            let (size, src) = match self.socket.recv_from(&mut buf) {
                Ok(received) => received,
                Err(e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut => {
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            debug!("handling data from {}", src);
            writeln!(out, "receive: {}", str::from_utf8(&buf[..size])?)?;
            self.socket.send_to(&buf[..size], src)?;
            self.pause();
        }
        Ok(())
    }

    // Sleep the configured interval in slices, checking the shutdown
    // flag between them.
    fn pause(&self) {
        let mut remaining = self.interval;
        while !remaining.is_zero() && !self.stop.load(Ordering::Relaxed) {
            let slice = remaining.min(SHUTDOWN_POLL);
            thread::sleep(slice);
            remaining -= slice;
        }
    }
}
