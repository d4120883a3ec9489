use bytes::{BufMut, BytesMut};
use std::{
    io::{self},
    str,
};
use tokio_util::codec::{Decoder, Encoder};

/// Longest response line accepted before the stream is considered garbage.
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

/// Line based SCPI framing.
///
/// Each command is terminated by a LINE FEED. The instrument answers
/// queries with a single line terminated by LINE FEED, some adapters
/// insert a CARRIAGE RETURN before it.
#[derive(Default)]
pub struct ScpiCodec {
    // Bytes already searched for a terminator.
    scanned: usize,
}

impl ScpiCodec {
    fn convert_string(payload: impl AsRef<[u8]>) -> io::Result<String> {
        Ok(str::from_utf8(payload.as_ref())
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?
            .to_string())
    }
}

impl Decoder for ScpiCodec {
    type Item = String;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let offset = src[self.scanned..].iter().position(|b| *b == b'\n');
        match offset {
            Some(n) => {
                let line = src.split_to(self.scanned + n + 1);
                self.scanned = 0;
                let mut payload = &line[..line.len() - 1];
                if let [rest @ .., b'\r'] = payload {
                    payload = rest;
                }
                Self::convert_string(payload).map(Some)
            }
            None if src.len() > MAX_LINE_LENGTH => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Response exceeds {} bytes without terminator", MAX_LINE_LENGTH),
            )),
            None => {
                self.scanned = src.len();
                Ok(None)
            }
        }
    }
}

impl Encoder<String> for ScpiCodec {
    type Error = io::Error;

    fn encode(&mut self, item: String, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if item.contains('\n') {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Command must not contain a line terminator",
            ));
        }
        dst.reserve(item.len() + 1);
        dst.put_slice(item.as_bytes());
        dst.put_u8(b'\n');
        Ok(())
    }
}
