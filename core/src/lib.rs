//! A crate to read campus meal card balances through an NFC session delegate.

#[cfg(feature = "pcsc")]
pub mod pcsc;

pub mod apdu;
pub mod card;
pub mod reader;
pub mod session;
pub mod value;

pub use card::{CardInfo, MensaCard, ReadError};
pub use reader::CardReader;
