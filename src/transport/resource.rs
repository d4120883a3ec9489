use std::{fmt, str::FromStr};

use crate::proto::ProtoError;

/// Address of an instrument reachable without a VISA library.
///
/// Parsed from VISA style resource strings, matching is
/// case-insensitive for the interface keywords:
///
/// * `ASRL/dev/ttyUSB0::INSTR`, `ASRL3::INSTR` (becomes `COM3`), or a bare
///   device path such as `/dev/ttyACM0` or `COM4`
/// * `TCPIP0::192.168.1.20::5025::SOCKET`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    Serial { port: String },
    Socket { host: String, port: u16 },
}

impl FromStr for Resource {
    type Err = ProtoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let fields: Vec<&str> = s.split("::").collect();
        let head = fields[0].to_ascii_uppercase();
        let class = fields
            .last()
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or_default();

        if fields.len() == 1 && (s.starts_with('/') || head.starts_with("COM")) {
            return Ok(Resource::Serial {
                port: s.to_string(),
            });
        }

        if head.starts_with("ASRL") {
            if fields.len() > 2 || (fields.len() == 2 && class != "INSTR") {
                return Err(ProtoError::connection(s, "malformed serial resource"));
            }
            // Keep the original case, device paths are case sensitive.
            let board = &fields[0][4..];
            if board.is_empty() {
                return Err(ProtoError::connection(s, "missing serial port"));
            }
            let port = if board.chars().all(|c| c.is_ascii_digit()) {
                format!("COM{}", board)
            } else {
                board.to_string()
            };
            return Ok(Resource::Serial { port });
        }

        if head.starts_with("TCPIP") && head[5..].chars().all(|c| c.is_ascii_digit()) {
            return match fields.as_slice() {
                [_, host, port, _] if class == "SOCKET" => {
                    let port = port
                        .parse::<u16>()
                        .map_err(|err| ProtoError::connection(s, format!("bad port: {}", err)))?;
                    if host.is_empty() {
                        return Err(ProtoError::connection(s, "missing host"));
                    }
                    Ok(Resource::Socket {
                        host: host.to_string(),
                        port,
                    })
                }
                _ if class == "INSTR" => Err(ProtoError::connection(
                    s,
                    "VXI-11 and HiSLIP instruments require a VISA library",
                )),
                _ => Err(ProtoError::connection(s, "malformed TCPIP resource")),
            };
        }

        Err(ProtoError::connection(s, "unsupported interface"))
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Serial { port } => write!(f, "ASRL{}::INSTR", port),
            Resource::Socket { host, port } => write!(f, "TCPIP0::{}::{}::SOCKET", host, port),
        }
    }
}
