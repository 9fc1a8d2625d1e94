//! The fixed three-step APDU exchange against the balance application.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::apdu::{self, Command, Response};
use crate::session::{CardSession, OsFamily, PlatformInfo, SessionError, Technology};
use crate::value;

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

#[cfg(not(feature = "tracing"))]
macro_rules! debug {
    ($($t: tt)*) => {{
        let _ = format_args!($($t)*);
    }};
}

#[cfg(not(feature = "tracing"))]
macro_rules! warn {
    ($($t: tt)*) => {{
        let _ = format_args!($($t)*);
    }};
}

/// Message shown by platforms that display a scanning prompt.
const ALERT_MESSAGE: &str = "Place your phone on the card";

/// Marker carried in `last_transaction` when only the balance could be read.
pub const LAST_TRANSACTION_ERROR: &str = "Fehler";

/// Steps of the exchange, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    ChooseApplication,
    ReadCurrentBalance,
    ReadLastTransaction,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ChooseApplication => "choose application",
            Self::ReadCurrentBalance => "read current balance",
            Self::ReadLastTransaction => "read last transaction",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("The NFC session could not be started: {0}")]
    SessionUnavailable(#[source] SessionError),

    #[error("Access to the {0:?} technology was denied: {1}")]
    TechnologyDenied(Technology, #[source] SessionError),

    #[error("The tag handle could not be fetched: {0}")]
    Tag(#[source] SessionError),

    #[error("Transmission failed at the {0} step: {1}")]
    Transport(Step, #[source] SessionError),

    #[error("The card returned an invalid response at the {0} step")]
    InvalidResponse(Step),

    #[error("The {0} response was too short to decode")]
    Decode(Step),
}

/// Balance and last transaction read from the card
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CardInfo {
    pub current_balance: String,
    pub last_transaction: String,
    pub read_time: DateTime<Utc>,
}

/// An adapter executing the balance exchange through the session delegate
pub struct MensaCard<'a, S, P>
where
    S: CardSession,
    P: PlatformInfo,
{
    session: &'a S,
    platform: &'a P,
}

impl<'a, S, P> MensaCard<'a, S, P>
where
    S: CardSession,
    P: PlatformInfo,
{
    pub fn new(session: &'a S, platform: &'a P) -> Self {
        Self { session, platform }
    }

    /// Reads the balance and the last transaction from the card.
    ///
    /// The exchange is linear and fail-fast: a denied technology request or
    /// an invalid response before the transaction step aborts the read. An
    /// invalid response at the transaction step alone degrades to a partial
    /// result carrying [`LAST_TRANSACTION_ERROR`].
    pub fn read_information(&self) -> Result<CardInfo, ReadError> {
        self.request_technology()?;

        // The driver's session state requires fetching the tag before
        // transceiving works.
        self.session.tag().map_err(ReadError::Tag)?;

        let resp = self.send(apdu::choose_application(), Step::ChooseApplication)?;
        if !resp.is_valid() {
            return Err(ReadError::InvalidResponse(Step::ChooseApplication));
        }

        let resp = self.send(apdu::read_current_balance(), Step::ReadCurrentBalance)?;
        if !resp.is_valid() {
            return Err(ReadError::InvalidResponse(Step::ReadCurrentBalance));
        }

        let current_balance = resp
            .window(apdu::BALANCE_OFFSET, apdu::BALANCE_LEN)
            .map(value::amount_from_window)
            .ok_or(ReadError::Decode(Step::ReadCurrentBalance))?;

        let last_transaction =
            match self.send(apdu::read_last_transaction(), Step::ReadLastTransaction) {
                Ok(resp) if resp.is_valid() => resp
                    .window(apdu::TRANSACTION_OFFSET, apdu::TRANSACTION_LEN)
                    .map(value::amount_from_window),
                Ok(_) | Err(_) => None,
            };

        if last_transaction.is_none() {
            warn!("the last transaction could not be read, returning a partial result");
        }

        Ok(CardInfo {
            current_balance: current_balance.to_string(),
            last_transaction: last_transaction
                .map(|amount| amount.to_string())
                .unwrap_or_else(|| LAST_TRANSACTION_ERROR.to_owned()),
            read_time: Utc::now(),
        })
    }

    fn technology(&self) -> Technology {
        match self.platform.os_family() {
            OsFamily::Apple => Technology::Mifare,
            OsFamily::Other => Technology::IsoDep,
        }
    }

    fn request_technology(&self) -> Result<(), ReadError> {
        let technology = self.technology();

        self.session
            .request_technology(technology, ALERT_MESSAGE)
            .map_err(|e| ReadError::TechnologyDenied(technology, e))
    }

    /// Routes the command through the transceive path the platform supports.
    fn send(&self, command: Command, step: Step) -> Result<Response, ReadError> {
        let tx = Vec::from(command);
        debug!("{step}: sending {} octets", tx.len());

        let rx = match self.platform.os_family() {
            OsFamily::Apple => self.session.send_mifare_command(&tx),
            OsFamily::Other => self.session.transceive(&tx),
        }
        .map_err(|e| ReadError::Transport(step, e))?;

        Ok(Response::from_bytes(rx))
    }
}
