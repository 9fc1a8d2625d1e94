//! PC/SC support for the meal card reader.
//! Can be enabled by turning `pcsc` feature on.
//!
//! ## What is PC/SC?
//! PC/SC (Personal Computer/Smart Card) is an abstraction layer for communicating with Smart Cards
//! from Windows. Using this layer, applications can connect to any devices that supports PC/SC,
//! without depending on their driver implementation. Windows and macOS supports PC/SC by themselves,
//! Linux also supports by installing pcsc-lite shared library.
//!
//! ## Usage
//! ```rust,no_run
//! use mensa_card::pcsc::{HostPlatform, PcscSession};
//! use mensa_card::CardReader;
//!
//! let session = PcscSession::try_new().unwrap();
//! let reader = CardReader::new(session, HostPlatform);
//!
//! if let Some(info) = reader.read_card() {
//!     println!("{}", info.current_balance);
//! }
//! ```

use std::cell::RefCell;
use std::ffi::CString;
use std::thread::sleep;
use std::time::Duration;

use pcsc::{Card, Disposition, Protocols, Scope, ShareMode, MAX_BUFFER_SIZE};

#[cfg(feature = "tracing")]
use tracing::{debug, info};

#[cfg(not(feature = "tracing"))]
macro_rules! debug {
    ($($t: tt)*) => {{
        let _ = format_args!($($t)*);
    }};
}

#[cfg(not(feature = "tracing"))]
macro_rules! info {
    ($($t: tt)*) => {{
        let _ = format_args!($($t)*);
    }};
}

use crate::session::{CardSession, OsFamily, PlatformInfo, SessionError, Tag, Technology};

/// A session backed by a PC/SC smart card reader.
pub struct PcscSession {
    ctx: pcsc::Context,
    reader: RefCell<Option<CString>>,
    card: RefCell<Option<Card>>,
}

impl PcscSession {
    /// Establishes a PC/SC context in user scope.
    pub fn try_new() -> Result<Self, SessionError> {
        Ok(Self {
            ctx: pcsc::Context::establish(Scope::User).map_err(SessionError::driver)?,
            reader: RefCell::new(None),
            card: RefCell::new(None),
        })
    }

    fn with_card<T>(
        &self,
        f: impl FnOnce(&Card) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        match self.card.borrow().as_ref() {
            Some(card) => f(card),
            None => Err(SessionError::NotAttached),
        }
    }
}

impl CardSession for PcscSession {
    fn is_supported(&self) -> bool {
        true
    }

    fn is_enabled(&self) -> bool {
        self.ctx.is_valid().is_ok()
    }

    fn start(&self) -> Result<(), SessionError> {
        let mut buf = [0u8; 2048];
        let reader = self
            .ctx
            .list_readers(&mut buf)
            .map_err(SessionError::driver)?
            .next()
            .ok_or(SessionError::ReaderNotFound)?;

        debug!("Using device: {}", reader.to_str().unwrap_or_default());
        self.reader.borrow_mut().replace(reader.to_owned());

        Ok(())
    }

    fn request_technology(
        &self,
        _technology: Technology,
        alert_message: &str,
    ) -> Result<(), SessionError> {
        // PC/SC negotiates the transport itself, so the alert is only shown
        // on the terminal.
        info!("{alert_message}");

        let reader = self
            .reader
            .borrow()
            .clone()
            .ok_or(SessionError::ReaderNotFound)?;

        // Waits for touching card, polling for each seconds.
        debug!("Waiting for a card");

        loop {
            match self.ctx.connect(&reader, ShareMode::Shared, Protocols::ANY) {
                Ok(card) => {
                    debug!("Connected to your card");
                    self.card.borrow_mut().replace(card);

                    return Ok(());
                }
                Err(pcsc::Error::NoSmartcard) => {
                    info!("Still waiting for your card...");
                    sleep(Duration::from_secs(1));
                }
                Err(e) => return Err(SessionError::driver(e)),
            }
        }
    }

    fn tag(&self) -> Result<Tag, SessionError> {
        self.with_card(|card| {
            let status = card.status2_owned().map_err(SessionError::driver)?;

            Ok(Tag {
                id: status.atr().to_vec(),
            })
        })
    }

    fn transceive(&self, tx: &[u8]) -> Result<Vec<u8>, SessionError> {
        self.with_card(|card| {
            debug!("TX: {}", hex::encode(tx));

            let mut rx = [0u8; MAX_BUFFER_SIZE];
            let rx = card.transmit(tx, &mut rx).map_err(SessionError::driver)?;

            debug!("RX: {}", hex::encode(rx));

            Ok(Vec::from(rx))
        })
    }

    fn send_mifare_command(&self, tx: &[u8]) -> Result<Vec<u8>, SessionError> {
        self.transceive(tx)
    }

    fn cancel_technology_request(&self) -> Result<(), SessionError> {
        if let Some(card) = self.card.borrow_mut().take() {
            card.disconnect(Disposition::LeaveCard)
                .map_err(|(_, e)| SessionError::driver(e))?;
        }

        Ok(())
    }

    fn unregister_tag_event(&self) -> Result<(), SessionError> {
        self.reader.borrow_mut().take();

        Ok(())
    }
}

/// Platform seam for hosts talking through PC/SC; they take the ISO-DEP path.
pub struct HostPlatform;

impl PlatformInfo for HostPlatform {
    fn os_family(&self) -> OsFamily {
        OsFamily::Other
    }
}
