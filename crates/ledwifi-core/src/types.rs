//! Core types used throughout ledwifi.
//!
//! These describe what discovery finds on the network and what a controller
//! knows about a device, independent of how the bytes travel.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// An RGB color with floating-point channels.
///
/// Each channel is nominally in `[0.0, 1.0]`. Values outside that range are
/// accepted here and clamped when the color is encoded into a packet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    /// Red channel.
    pub r: f64,
    /// Green channel.
    pub g: f64,
    /// Blue channel.
    pub b: f64,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);
    pub const RED: Rgb = Rgb::new(1.0, 0.0, 0.0);
    pub const GREEN: Rgb = Rgb::new(0.0, 1.0, 0.0);
    pub const BLUE: Rgb = Rgb::new(0.0, 0.0, 1.0);

    /// Create a color from its three channel components.
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Rgb { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({:.3}, {:.3}, {:.3})", self.r, self.g, self.b)
    }
}

/// A device found by discovery.
///
/// Built from a single discovery reply of the form
/// `<ip>,<hardware address>,<model>`. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceDescriptor {
    /// IP address the device answered from, as reported by the device.
    pub ip_address: String,
    /// Hardware (MAC) address of the device's Wi-Fi module.
    pub hardware_address: String,
    /// Module model string (e.g. "HF-LPB100-ZJ200").
    pub model: String,
}

impl DeviceDescriptor {
    /// Number of comma-separated fields a discovery reply must carry.
    pub const REQUIRED_FIELDS: usize = 3;

    /// Parse a discovery reply string.
    ///
    /// The first three comma-separated fields are, in order, the IP address,
    /// the hardware address, and the model. Any further fields are ignored.
    /// A trailing CR/LF is stripped before splitting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the reply has fewer than three fields.
    pub fn from_reply(reply: &str) -> Result<Self> {
        let reply = reply.trim_end_matches(['\r', '\n']);
        let fields: Vec<&str> = reply.split(',').collect();

        if fields.len() < Self::REQUIRED_FIELDS {
            return Err(Error::Decode(format!(
                "discovery reply has {} field(s), expected {}: {:?}",
                fields.len(),
                Self::REQUIRED_FIELDS,
                reply
            )));
        }

        Ok(DeviceDescriptor {
            ip_address: fields[0].to_string(),
            hardware_address: fields[1].to_string(),
            model: fields[2].to_string(),
        })
    }
}

impl FromStr for DeviceDescriptor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        DeviceDescriptor::from_reply(s)
    }
}

impl fmt::Display for DeviceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IP = {}\nMAC = {}\nModel = {}",
            self.ip_address, self.hardware_address, self.model
        )
    }
}

/// State reported by a device.
///
/// No binary layout for status replies has been confirmed against hardware
/// documentation, so the library never decodes one into this record. It is
/// provided for callers that interpret [`StatusReply::raw`] themselves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceStatus {
    pub device_type: u8,
    pub is_on: bool,
    pub version_number: u8,
    pub mode: u8,
    pub slowness: u8,
    pub color: Rgb,
}

/// The undecoded reply to a status query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReply {
    /// Bytes exactly as read from the link.
    pub raw: Vec<u8>,
    /// UTF-8 decoding of `raw`.
    pub text: String,
}

impl StatusReply {
    /// Interpret a raw reply as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if `raw` is not valid UTF-8. The message
    /// carries the reply bytes in hex.
    pub fn from_raw(raw: Vec<u8>) -> Result<Self> {
        match String::from_utf8(raw) {
            Ok(text) => Ok(StatusReply {
                raw: text.as_bytes().to_vec(),
                text,
            }),
            Err(e) => Err(Error::Decode(format!(
                "status reply is not valid UTF-8 ({}): {:02X?}",
                e.utf8_error(),
                e.as_bytes()
            ))),
        }
    }
}

impl fmt::Display for StatusReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}
