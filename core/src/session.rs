//! Capability seams between the reader and the platform NFC driver.

use std::error::Error as StdError;

/// NFC transport technology negotiated before talking to the card chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Technology {
    /// MIFARE, requested on Apple platforms.
    Mifare,

    /// ISO-DEP, requested everywhere else.
    IsoDep,
}

/// Platform family the reader is running on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Apple,
    Other,
}

/// Handle of the tag the session is attached to.
///
/// The underlying driver requires fetching it before transceiving works;
/// its content is never inspected.
#[derive(Debug, Clone, Default)]
pub struct Tag {
    pub id: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("NFC is not available on this device")]
    Unavailable,

    #[error("No reader was found on this device")]
    ReaderNotFound,

    #[error("No card is attached to the session")]
    NotAttached,

    #[error("The {0:?} technology request was refused")]
    TechnologyRefused(Technology),

    #[error("Error occurred in the NFC driver: {0}")]
    Driver(#[source] Box<dyn StdError + Send + Sync>),
}

impl SessionError {
    /// Wraps a backend error of the underlying NFC driver.
    pub fn driver(err: impl StdError + Send + Sync + 'static) -> Self {
        Self::Driver(Box::new(err))
    }
}

/// A delegate owning the platform NFC session
pub trait CardSession {
    /// Whether the device has NFC hardware at all.
    fn is_supported(&self) -> bool;

    /// Whether NFC is currently switched on.
    fn is_enabled(&self) -> bool;

    /// Starts the NFC session.
    fn start(&self) -> Result<(), SessionError>;

    /// Requests access to `technology`, showing `alert_message` to the user
    /// where the platform displays a scanning prompt.
    fn request_technology(
        &self,
        technology: Technology,
        alert_message: &str,
    ) -> Result<(), SessionError>;

    /// Fetches the tag the session is attached to.
    fn tag(&self) -> Result<Tag, SessionError>;

    /// Transmits raw bytes over the ISO-DEP path, then receives the response.
    fn transceive(&self, tx: &[u8]) -> Result<Vec<u8>, SessionError>;

    /// Transmits raw bytes over the MIFARE path used on Apple platforms.
    fn send_mifare_command(&self, tx: &[u8]) -> Result<Vec<u8>, SessionError>;

    /// Cancels the outstanding technology request.
    fn cancel_technology_request(&self) -> Result<(), SessionError>;

    /// Unregisters the tag event listener.
    fn unregister_tag_event(&self) -> Result<(), SessionError>;
}

/// Platform detection seam
pub trait PlatformInfo {
    fn os_family(&self) -> OsFamily;
}
