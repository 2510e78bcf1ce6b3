//! USB-MIDI event packets
//!
//! Notes played on the USB-MIDI endpoint are forwarded to the host over the
//! IPC link unchanged, except that the cable number is dropped.

use crate::ipc::IpcPacket;

const CODE_INDEX_MASK: u8 = 0x0F;

/// One 4-byte USB-MIDI event packet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsbMidiPacket {
    /// Cable number (high nibble) and code index number (low nibble)
    pub cn_cin: u8,
    pub status: u8,
    pub data1: u8,
    pub data2: u8,
}

impl UsbMidiPacket {
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self {
            cn_cin: bytes[0],
            status: bytes[1],
            data1: bytes[2],
            data2: bytes[3],
        }
    }

    pub const fn to_bytes(self) -> [u8; 4] {
        [self.cn_cin, self.status, self.data1, self.data2]
    }

    pub const fn cable_number(self) -> u8 {
        self.cn_cin >> 4
    }

    pub const fn code_index(self) -> u8 {
        self.cn_cin & CODE_INDEX_MASK
    }

    /// Packet to forward over the IPC link, with the cable number forced to 0
    pub const fn to_ipc_packet(self) -> IpcPacket {
        IpcPacket::new(
            self.cn_cin & CODE_INDEX_MASK,
            self.status,
            self.data1,
            self.data2,
        )
    }
}
