//! Landmark frames from an external detector, one JSON datagram per frame.
//!
//! ```json
//! {"timestamp_ms": 1234, "landmarks": [[0.51, 0.62, -0.01], ...]}
//! {"timestamp_ms": 1250, "landmarks": null}
//! ```
//!
//! `landmarks` holds exactly 21 `[x, y, z]` triples in normalized image
//! coordinates, or `null` when the detector found no hand.

use super::{HandTracker, TrackedFrame};
use crate::error::{PacketError, TrackingError};
use crate::gesture::HandLandmarks;
use serde::{Deserialize, Serialize};
use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::time::{Duration, Instant};

/// Largest datagram accepted. A full frame is well under 2 KiB.
const MAX_DATAGRAM: usize = 8192;

/// Wire form of one frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LandmarkPacket {
    pub timestamp_ms: u64,
    pub landmarks: Option<Vec<[f32; 3]>>,
}

impl LandmarkPacket {
    pub fn from_frame(frame: &TrackedFrame) -> Self {
        Self {
            timestamp_ms: frame.timestamp_ms,
            landmarks: frame
                .hand
                .map(|hand| hand.points.iter().map(|p| p.to_array()).collect()),
        }
    }
}

/// Decode one datagram.
pub fn parse_packet(bytes: &[u8]) -> Result<TrackedFrame, PacketError> {
    let packet: LandmarkPacket = serde_json::from_slice(bytes)?;
    let hand = match packet.landmarks {
        Some(triples) => Some(
            HandLandmarks::from_triples(&triples)
                .ok_or(PacketError::LandmarkCount(triples.len()))?,
        ),
        None => None,
    };
    Ok(TrackedFrame {
        timestamp_ms: packet.timestamp_ms,
        hand,
    })
}

fn is_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}

/// UDP receiver for [`LandmarkPacket`]s.
#[derive(Debug)]
pub struct StreamTracker {
    socket: UdpSocket,
    buf: Vec<u8>,
    pending: Option<TrackedFrame>,
}

impl StreamTracker {
    /// Bind the listening socket.
    pub fn bind(addr: SocketAddr) -> Result<Self, TrackingError> {
        let socket = UdpSocket::bind(addr).map_err(|source| TrackingError::Bind { addr, source })?;
        let local = socket.local_addr().unwrap_or(addr);
        log::info!("listening for landmark frames on udp://{}", local);
        Ok(Self {
            socket,
            buf: vec![0; MAX_DATAGRAM],
            pending: None,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Wait up to `timeout` for one well-formed frame. Malformed datagrams
    /// are dropped and do not reset the wait.
    fn receive(&mut self, timeout: Duration) -> io::Result<Option<TrackedFrame>> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            self.socket.set_read_timeout(Some(remaining))?;

            match self.socket.recv_from(&mut self.buf) {
                Ok((len, from)) => match parse_packet(&self.buf[..len]) {
                    Ok(frame) => return Ok(Some(frame)),
                    Err(e) => log::warn!("dropping datagram from {}: {}", from, e),
                },
                Err(e) if is_timeout(&e) => return Ok(None),
                Err(e) => return Err(e),
            }
        }
    }
}

impl HandTracker for StreamTracker {
    fn name(&self) -> &'static str {
        "stream"
    }

    /// Ready once the first well-formed frame arrives. That frame is kept
    /// and returned by the next poll.
    fn start(&mut self, budget: Duration) -> Result<bool, TrackingError> {
        let frame = self.receive(budget).map_err(TrackingError::Io)?;
        let ready = frame.is_some();
        self.pending = frame;
        Ok(ready)
    }

    fn poll(&mut self, timeout: Duration) -> Result<Option<TrackedFrame>, TrackingError> {
        if let Some(frame) = self.pending.take() {
            return Ok(Some(frame));
        }
        self.receive(timeout).map_err(TrackingError::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_no_hand() {
        let frame = parse_packet(br#"{"timestamp_ms": 42, "landmarks": null}"#).unwrap();
        assert_eq!(frame.timestamp_ms, 42);
        assert!(frame.hand.is_none());
    }

    #[test]
    fn test_parse_full_hand() {
        let packet = LandmarkPacket {
            timestamp_ms: 7,
            landmarks: Some(vec![[0.25, 0.5, -0.1]; 21]),
        };
        let bytes = serde_json::to_vec(&packet).unwrap();
        let frame = parse_packet(&bytes).unwrap();
        let hand = frame.hand.unwrap();
        assert_eq!(hand.points[0].to_array(), [0.25, 0.5, -0.1]);
        assert_eq!(LandmarkPacket::from_frame(&frame), packet);
    }

    #[test]
    fn test_parse_rejects_short_hand() {
        let err = parse_packet(br#"{"timestamp_ms": 1, "landmarks": [[0,0,0]]}"#).unwrap_err();
        assert!(matches!(err, PacketError::LandmarkCount(1)));
        assert!(matches!(parse_packet(b"not json"), Err(PacketError::Json(_))));
    }
}
