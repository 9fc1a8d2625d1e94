//! APDU commands and responses for the card's balance application.
//!
//! The byte offsets and the 0x91 status convention are empirical constants
//! of this card family; there is no public specification to cross-check
//! them against.

pub use ::apdu::Command;

const CLA_WRAPPED: u8 = 0x90;

const INS_SELECT_APPLICATION: u8 = 0x5A;
const INS_READ_VALUE: u8 = 0x6C;
const INS_READ_TRANSACTIONS: u8 = 0xF5;

/// Identifier of the application holding the balance and the transactions.
const APPLICATION_ID: [u8; 3] = [0x5F, 0x84, 0x15];

/// Number of the value file within the application.
const FILE_NO: u8 = 0x01;

/// Status byte at `len - 2` of every successful response.
pub const STATUS_OK: u8 = 0x91;

/// Window of the balance field in the `read_current_balance` response.
pub const BALANCE_OFFSET: usize = 0;
pub const BALANCE_LEN: usize = 4;

/// Window of the value field in the `read_last_transaction` response.
pub const TRANSACTION_OFFSET: usize = 12;
pub const TRANSACTION_LEN: usize = 2;

/// Selects the application: `90 5A 00 00 03 5F 84 15 00`.
pub fn choose_application() -> Command<'static> {
    Command::new_with_payload_le(
        CLA_WRAPPED,
        INS_SELECT_APPLICATION,
        0x00,
        0x00,
        0x00,
        &APPLICATION_ID,
    )
}

/// Reads the value file: `90 6C 00 00 01 01 00`.
pub fn read_current_balance() -> Command<'static> {
    Command::new_with_payload_le(CLA_WRAPPED, INS_READ_VALUE, 0x00, 0x00, 0x00, &[FILE_NO])
}

/// Reads the transaction log: `90 F5 00 00 01 01 00`.
pub fn read_last_transaction() -> Command<'static> {
    Command::new_with_payload_le(
        CLA_WRAPPED,
        INS_READ_TRANSACTIONS,
        0x00,
        0x00,
        0x00,
        &[FILE_NO],
    )
}

/// A raw response that was received from the card
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    bytes: Vec<u8>,
}

impl Response {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Determines whether the response indicates success or not.
    pub fn is_valid(&self) -> bool {
        self.bytes.len() >= 2 && self.bytes[self.bytes.len() - 2] == STATUS_OK
    }

    /// Returns the field window at `offset`, or `None` when the response is
    /// too short to hold it.
    pub fn window(&self, offset: usize, len: usize) -> Option<&[u8]> {
        self.bytes.get(offset..offset + len)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_serialize_byte_exact() {
        assert_eq!(
            vec![0x90, 0x5A, 0x00, 0x00, 0x03, 0x5F, 0x84, 0x15, 0x00],
            Vec::from(choose_application()),
        );
        assert_eq!(
            vec![0x90, 0x6C, 0x00, 0x00, 0x01, 0x01, 0x00],
            Vec::from(read_current_balance()),
        );
        assert_eq!(
            vec![0x90, 0xF5, 0x00, 0x00, 0x01, 0x01, 0x00],
            Vec::from(read_last_transaction()),
        );
    }

    #[test]
    fn validity_requires_status_byte() {
        assert!(!Response::from_bytes(vec![]).is_valid());
        assert!(!Response::from_bytes(vec![0x91]).is_valid());
        assert!(Response::from_bytes(vec![0x91, 0x00]).is_valid());
        assert!(!Response::from_bytes(vec![0x90, 0x00]).is_valid());
        assert!(Response::from_bytes(vec![0x01, 0x02, 0x91, 0xAF]).is_valid());
    }

    #[test]
    fn window_requires_enough_bytes() {
        let resp = Response::from_bytes(vec![0x01, 0x02, 0x03, 0x04, 0x91, 0x00]);

        assert_eq!(
            Some(&[0x01, 0x02, 0x03, 0x04][..]),
            resp.window(BALANCE_OFFSET, BALANCE_LEN),
        );
        assert_eq!(None, resp.window(TRANSACTION_OFFSET, TRANSACTION_LEN));
    }
}
