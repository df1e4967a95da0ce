//! Discord local RPC transport: length-prefixed JSON frames over a Unix
//! socket or Windows named pipe.

use std::io::{self, ErrorKind, Read, Write};
use std::path::PathBuf;

use log::{debug, info, trace, warn};
use serde_json::{Value, json};

use super::activity::ActivityPayload;
use crate::runtime::host::{PresenceConnector, PresenceStream};

const RPC_VERSION: u32 = 1;
const MAX_FRAME_LEN: usize = 64 * 1024;
const SOCKET_SLOTS: u32 = 10;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Opcode {
    Handshake,
    Frame,
    Close,
    Ping,
    Pong,
}

impl Opcode {
    pub fn code(self) -> u32 {
        match self {
            Self::Handshake => 0,
            Self::Frame => 1,
            Self::Close => 2,
            Self::Ping => 3,
            Self::Pong => 4,
        }
    }
}

impl TryFrom<u32> for Opcode {
    type Error = String;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Handshake),
            1 => Ok(Self::Frame),
            2 => Ok(Self::Close),
            3 => Ok(Self::Ping),
            4 => Ok(Self::Pong),
            _ => Err(format!("unknown opcode {}", code)),
        }
    }
}

pub fn write_frame<W: Write + ?Sized>(
    writer: &mut W,
    opcode: Opcode,
    payload: &Value,
) -> io::Result<()> {
    let body = serde_json::to_vec(payload)?;
    let len = u32::try_from(body.len()).map_err(|_| {
        io::Error::new(ErrorKind::InvalidInput, "frame too large")
    })?;

    let mut frame = Vec::with_capacity(8 + body.len());
    frame.extend_from_slice(&opcode.code().to_le_bytes());
    frame.extend_from_slice(&len.to_le_bytes());
    frame.extend_from_slice(&body);

    writer.write_all(&frame)?;
    writer.flush()
}

pub fn read_frame<R: Read + ?Sized>(
    reader: &mut R,
) -> io::Result<(Opcode, Value)> {
    let mut header = [0u8; 8];
    reader.read_exact(&mut header)?;

    let code =
        u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
    let len = u32::from_le_bytes([header[4], header[5], header[6], header[7]])
        as usize;

    let opcode = Opcode::try_from(code)
        .map_err(|err| io::Error::new(ErrorKind::InvalidData, err))?;

    if len > MAX_FRAME_LEN {
        return Err(io::Error::new(
            ErrorKind::InvalidData,
            format!("frame of {} bytes exceeds limit", len),
        ));
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body)?;
    let payload = serde_json::from_slice(&body)?;

    Ok((opcode, payload))
}

/// One connection to the presence service.
pub struct PresenceSession<S: Read + Write> {
    stream: S,
    pid: u32,
    nonce: u64,
}

impl<S: Read + Write> PresenceSession<S> {
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            pid: std::process::id(),
            nonce: 0,
        }
    }

    pub fn handshake(&mut self, client_id: &str) -> Result<(), String> {
        let payload = json!({ "v": RPC_VERSION, "client_id": client_id });
        write_frame(&mut self.stream, Opcode::Handshake, &payload)
            .map_err(|err| format!("handshake failed: {}", err))
    }

    /// Reads frames until the service closes the connection. Each `READY`
    /// dispatch publishes a fresh activity from `activity`.
    pub fn serve(
        &mut self,
        mut activity: impl FnMut() -> ActivityPayload,
    ) -> Result<(), String> {
        loop {
            let (opcode, payload) = match read_frame(&mut self.stream) {
                Ok(frame) => frame,
                Err(err) if err.kind() == ErrorKind::UnexpectedEof => {
                    info!("Presence connection closed");
                    return Ok(());
                }
                Err(err) => {
                    return Err(format!("failed to read frame: {}", err));
                }
            };

            match opcode {
                Opcode::Frame => {
                    if is_ready(&payload) {
                        info!("Rich Presence is ready");
                        self.publish(&activity())?;
                    } else if is_error(&payload) {
                        warn!("Presence service error: {}", payload);
                    } else {
                        trace!("Presence frame: {}", payload);
                    }
                }
                Opcode::Ping => {
                    write_frame(&mut self.stream, Opcode::Pong, &payload)
                        .map_err(|err| format!("failed to pong: {}", err))?;
                }
                Opcode::Close => {
                    warn!("Presence service closed: {}", payload);
                    return Ok(());
                }
                Opcode::Handshake | Opcode::Pong => {}
            }
        }
    }

    pub fn publish(
        &mut self,
        activity: &ActivityPayload,
    ) -> Result<(), String> {
        self.nonce += 1;

        let command = json!({
            "cmd": "SET_ACTIVITY",
            "args": {
                "pid": self.pid,
                "activity": activity,
            },
            "nonce": self.nonce.to_string(),
        });

        write_frame(&mut self.stream, Opcode::Frame, &command)
            .map_err(|err| format!("failed to set activity: {}", err))?;

        debug!(
            "Published activity starting at {}",
            activity.timestamps.start
        );

        Ok(())
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

fn is_ready(payload: &Value) -> bool {
    payload["cmd"] == "DISPATCH" && payload["evt"] == "READY"
}

fn is_error(payload: &Value) -> bool {
    payload["evt"] == "ERROR"
}

/// Connects to the first Discord client socket that accepts.
pub struct DiscordIpcConnector;

impl PresenceConnector for DiscordIpcConnector {
    fn connect(&self) -> Result<Box<dyn PresenceStream>, String> {
        for path in socket_paths() {
            match open_socket(&path) {
                Ok(stream) => {
                    debug!("Connected to presence socket {}", path.display());
                    return Ok(stream);
                }
                Err(err) => trace!("{}: {}", path.display(), err),
            }
        }

        Err("no Discord IPC socket accepted the connection".to_string())
    }
}

#[cfg(unix)]
fn socket_paths() -> Vec<PathBuf> {
    let dir = ["XDG_RUNTIME_DIR", "TMPDIR", "TMP", "TEMP"]
        .iter()
        .find_map(std::env::var_os)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/tmp"));

    (0..SOCKET_SLOTS)
        .map(|slot| dir.join(format!("discord-ipc-{}", slot)))
        .collect()
}

#[cfg(windows)]
fn socket_paths() -> Vec<PathBuf> {
    (0..SOCKET_SLOTS)
        .map(|slot| PathBuf::from(format!(r"\\.\pipe\discord-ipc-{}", slot)))
        .collect()
}

#[cfg(unix)]
fn open_socket(path: &std::path::Path) -> io::Result<Box<dyn PresenceStream>> {
    let stream = std::os::unix::net::UnixStream::connect(path)?;
    Ok(Box::new(stream))
}

#[cfg(windows)]
fn open_socket(path: &std::path::Path) -> io::Result<Box<dyn PresenceStream>> {
    let pipe = std::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)?;
    Ok(Box::new(pipe))
}
