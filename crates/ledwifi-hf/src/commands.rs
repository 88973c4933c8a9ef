//! Command packet builders.
//!
//! Every packet is a short run of opcode and parameter bytes followed by a
//! single checksum byte: the 8-bit wrapping sum of everything before it.
//!
//! All functions are pure. They produce byte vectors without performing
//! any I/O; the controller is responsible for writing them to a transport.
//!
//! # Packet layouts
//!
//! ```text
//! power on      71 23 0F <sum>
//! power off     71 24 0F <sum>
//! query status  71 24 0F <sum>        (same bytes as power off)
//! set color     <mode> RR GG BB 00 00 F0 0F <sum>
//!               mode = 31 (persist) | 41 (temporary)
//! ```

use bytes::{BufMut, BytesMut};
use ledwifi_core::Rgb;

// ---------------------------------------------------------------
// Opcode constants
// ---------------------------------------------------------------

/// Power command prefix.
const CMD_POWER: u8 = 0x71;

/// Power sub-command: switch on.
const SUB_ON: u8 = 0x23;

/// Power sub-command: switch off.
const SUB_OFF: u8 = 0x24;

/// Trailing marker for commands issued over the LAN (as opposed to the
/// vendor's cloud relay).
const LOCAL: u8 = 0x0F;

/// Set color, written to non-volatile memory.
const CMD_COLOR_PERSIST: u8 = 0x31;

/// Set color until the next change or power cycle.
const CMD_COLOR_TEMPORARY: u8 = 0x41;

/// Selects the RGB channels (rather than the white channels) in a color
/// command.
const COLOR_SET_RGB: u8 = 0xF0;

const WARM_WHITE_OFF: u8 = 0x00;
const COOL_WHITE_OFF: u8 = 0x00;

// ---------------------------------------------------------------
// Command value
// ---------------------------------------------------------------

/// A command that can be sent to a controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    PowerOn,
    PowerOff,
    SetColor {
        color: Rgb,
        /// Write the color to non-volatile memory so it survives a power
        /// cycle.
        persist: bool,
    },
    QueryStatus,
}

impl Command {
    /// A persisted color command, the device's usual mode.
    pub fn set_color(color: Rgb) -> Self {
        Command::SetColor {
            color,
            persist: true,
        }
    }

    /// Encode this command into its wire packet.
    pub fn encode(&self) -> Vec<u8> {
        match *self {
            Command::PowerOn => cmd_power_on(),
            Command::PowerOff => cmd_power_off(),
            Command::SetColor { color, persist } => cmd_set_color(color, persist),
            Command::QueryStatus => cmd_query_status(),
        }
    }

    /// Whether the device answers this command with a reply.
    pub fn expects_reply(&self) -> bool {
        matches!(self, Command::QueryStatus)
    }
}

// ---------------------------------------------------------------
// Packet builders
// ---------------------------------------------------------------

/// Build the "power on" packet: `71 23 0F B3`.
pub fn cmd_power_on() -> Vec<u8> {
    encode_packet(&[CMD_POWER, SUB_ON, LOCAL])
}

/// Build the "power off" packet: `71 24 0F B4`.
pub fn cmd_power_off() -> Vec<u8> {
    encode_packet(&[CMD_POWER, SUB_OFF, LOCAL])
}

/// Build the "query status" packet.
///
/// On the wire this is byte-for-byte the power-off packet; devices tell
/// the two apart by context, and real hardware expects exactly these bytes.
pub fn cmd_query_status() -> Vec<u8> {
    encode_packet(&[CMD_POWER, SUB_OFF, LOCAL])
}

/// Build a "set color" packet.
///
/// Channels are mapped with [`to_byte`]; the warm and cool white channels
/// are always zero.
pub fn cmd_set_color(color: Rgb, persist: bool) -> Vec<u8> {
    let mode = if persist {
        CMD_COLOR_PERSIST
    } else {
        CMD_COLOR_TEMPORARY
    };
    encode_packet(&[
        mode,
        to_byte(color.r),
        to_byte(color.g),
        to_byte(color.b),
        WARM_WHITE_OFF,
        COOL_WHITE_OFF,
        COLOR_SET_RGB,
        LOCAL,
    ])
}

// ---------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------

/// Map a color channel in `[0.0, 1.0]` to a byte.
///
/// The input is clamped first. Exactly `1.0` maps to 255; anything else maps
/// to `floor(value * 256)`, so `0.5` becomes 128 rather than 127. NaN maps
/// to 0.
pub fn to_byte(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    let clamped = value.clamp(0.0, 1.0);
    let scaled = if clamped == 1.0 {
        255.0
    } else {
        (clamped * 256.0).floor()
    };
    scaled as u8
}

/// Wrapping 8-bit sum of `bytes`.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

/// Check that the last byte of `packet` is the checksum of the rest.
///
/// Empty packets never verify.
pub fn verify_checksum(packet: &[u8]) -> bool {
    match packet.split_last() {
        Some((last, body)) => checksum(body) == *last,
        None => false,
    }
}

/// Append the checksum byte to `body`.
pub fn encode_packet(body: &[u8]) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(body.len() + 1);
    buf.put_slice(body);
    buf.put_u8(checksum(body));
    buf.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_on_bytes() {
        assert_eq!(cmd_power_on(), vec![0x71, 0x23, 0x0F, 0xB3]);
    }

    #[test]
    fn power_off_bytes() {
        assert_eq!(cmd_power_off(), vec![0x71, 0x24, 0x0F, 0xB4]);
    }

    #[test]
    fn status_query_matches_power_off() {
        assert_eq!(cmd_query_status(), cmd_power_off());
        assert_eq!(Command::QueryStatus.encode(), Command::PowerOff.encode());
    }

    #[test]
    fn to_byte_mapping() {
        assert_eq!(to_byte(0.0), 0);
        assert_eq!(to_byte(1.0), 255);
        assert_eq!(to_byte(0.5), 128);
        assert_eq!(to_byte(0.999), 255);
        assert_eq!(to_byte(0.25), 64);
        assert_eq!(to_byte(1.0 / 256.0), 1);
    }

    #[test]
    fn to_byte_clamps() {
        assert_eq!(to_byte(-0.3), 0);
        assert_eq!(to_byte(1.5), 255);
        assert_eq!(to_byte(f64::INFINITY), 255);
        assert_eq!(to_byte(f64::NEG_INFINITY), 0);
        assert_eq!(to_byte(f64::NAN), 0);
    }

    #[test]
    fn set_color_persisted_layout() {
        let packet = cmd_set_color(Rgb::new(1.0, 0.5, 0.0), true);
        assert_eq!(packet.len(), 9);
        assert_eq!(packet[0], 0x31);
        assert_eq!(&packet[1..4], &[0xFF, 0x80, 0x00]);
        assert_eq!(&packet[4..6], &[0x00, 0x00]);
        assert_eq!(packet[6], 0xF0);
        assert_eq!(packet[7], 0x0F);
        assert_eq!(packet[8], checksum(&packet[..8]));
    }

    #[test]
    fn set_color_temporary_layout() {
        let packet = cmd_set_color(Rgb::BLUE, false);
        assert_eq!(packet[0], 0x41);
        assert_eq!(&packet[1..4], &[0x00, 0x00, 0xFF]);
        // 0x41 + 0xFF + 0xF0 + 0x0F = 0x23F -> 0x3F
        assert_eq!(packet[8], 0x3F);
    }

    #[test]
    fn set_color_white_checksum_wraps() {
        // 0x31 + 3 * 0xFF + 0xF0 + 0x0F = 0x42D -> 0x2D
        let packet = cmd_set_color(Rgb::WHITE, true);
        assert_eq!(
            packet,
            vec![0x31, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0xF0, 0x0F, 0x2D]
        );
    }

    #[test]
    fn every_command_verifies() {
        let commands = [
            Command::PowerOn,
            Command::PowerOff,
            Command::QueryStatus,
            Command::set_color(Rgb::new(0.2, 0.4, 0.6)),
            Command::SetColor {
                color: Rgb::new(-1.0, 2.0, 0.75),
                persist: false,
            },
        ];
        for command in commands {
            let packet = command.encode();
            assert!(verify_checksum(&packet), "{:?} -> {:02X?}", command, packet);
        }
    }

    #[test]
    fn encoding_is_deterministic() {
        let command = Command::set_color(Rgb::new(0.1, 0.9, 0.3));
        assert_eq!(command.encode(), command.encode());
        assert_eq!(cmd_power_on(), cmd_power_on());
    }

    #[test]
    fn verify_rejects_corrupt_packets() {
        let mut packet = cmd_power_on();
        packet[1] ^= 0x01;
        assert!(!verify_checksum(&packet));
        assert!(!verify_checksum(&[]));
    }

    #[test]
    fn set_color_defaults_to_persist() {
        assert_eq!(
            Command::set_color(Rgb::RED),
            Command::SetColor {
                color: Rgb::RED,
                persist: true
            }
        );
    }

    #[test]
    fn only_status_expects_reply() {
        assert!(Command::QueryStatus.expects_reply());
        assert!(!Command::PowerOn.expects_reply());
        assert!(!Command::PowerOff.expects_reply());
        assert!(!Command::set_color(Rgb::GREEN).expects_reply());
    }
}
