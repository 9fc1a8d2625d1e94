//! The NFC session boundary around a single read attempt.

use crate::card::{CardInfo, MensaCard, ReadError};
use crate::session::{CardSession, OsFamily, PlatformInfo};

#[cfg(feature = "tracing")]
use tracing::warn;

#[cfg(not(feature = "tracing"))]
macro_rules! warn {
    ($($t: tt)*) => {{
        let _ = format_args!($($t)*);
    }};
}

/// Owns the NFC session for the duration of a read attempt
pub struct CardReader<S, P>
where
    S: CardSession,
    P: PlatformInfo,
{
    session: S,
    platform: P,
}

impl<S, P> CardReader<S, P>
where
    S: CardSession,
    P: PlatformInfo,
{
    pub fn new(session: S, platform: P) -> Self {
        Self { session, platform }
    }

    /// Whether the device has NFC hardware at all.
    pub fn is_supported(&self) -> bool {
        self.session.is_supported()
    }

    /// Whether NFC is currently switched on.
    pub fn is_enabled(&self) -> bool {
        self.session.is_enabled()
    }

    /// True on the iOS platform family.
    pub fn is_apple(&self) -> bool {
        self.platform.os_family() == OsFamily::Apple
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// Reads the card, reporting the failure cause.
    ///
    /// Cleanup runs exactly once, whether the attempt succeeded or not.
    pub fn read(&self) -> Result<CardInfo, ReadError> {
        let answer = self.start_and_read();
        self.clean_up();

        answer
    }

    /// Reads the card the way non-diagnostic callers see it: a full result,
    /// a partial result, or nothing.
    pub fn read_card(&self) -> Option<CardInfo> {
        match self.read() {
            Ok(info) => Some(info),
            Err(err) => {
                warn!("reading the card failed: {err}");

                None
            }
        }
    }

    fn start_and_read(&self) -> Result<CardInfo, ReadError> {
        self.session
            .start()
            .map_err(ReadError::SessionUnavailable)?;

        MensaCard::new(&self.session, &self.platform).read_information()
    }

    /// Best-effort cleanup of the session state; failures are only logged.
    fn clean_up(&self) {
        if let Err(err) = self
            .session
            .cancel_technology_request()
            .and_then(|_| self.session.unregister_tag_event())
        {
            warn!("cleaning up the NFC session failed: {err}");
        }
    }
}
