//! Inner-layer composition.
//!
//! The outer layer hides traffic patterns; confidentiality of the payload
//! comes from an inner cipher keyed by long-term identities. The engine
//! treats inner output as opaque bytes. [`Messenger`] wires the two layers
//! in the right order:
//!
//! ```text
//!   seal:  plaintext -> inner.encrypt -> engine.encode -> wire
//!   open:  wire -> engine.decode -> inner.decrypt -> plaintext
//! ```

use blockveil_proto::RecipientRef;
use bytes::Bytes;
use thiserror::Error;

use crate::{
    engine::{DecodedMessage, ProtocolEngine},
    env::Environment,
    error::EngineError,
};

/// Identity-keyed payload encryption (the inner layer).
pub trait InnerCipher: Send + Sync {
    /// Long-term identity of a peer
    type Identity;

    /// Inner-layer failure
    type Error: std::error::Error + Send + Sync + 'static;

    /// Encrypt `plaintext` for `recipient`.
    ///
    /// # Errors
    ///
    /// Implementation defined.
    fn encrypt(&self, recipient: &Self::Identity, plaintext: &[u8])
    -> Result<Vec<u8>, Self::Error>;

    /// Decrypt `ciphertext` from `sender`.
    ///
    /// # Errors
    ///
    /// Implementation defined; typically an authentication failure.
    fn decrypt(&self, sender: &Self::Identity, ciphertext: &[u8])
    -> Result<Vec<u8>, Self::Error>;
}

/// Failure while sealing or opening a message.
#[derive(Error, Debug)]
pub enum MessengerError<E: std::error::Error + 'static> {
    /// Outer layer rejected the message
    #[error("outer layer: {0}")]
    Engine(#[from] EngineError),

    /// Inner layer rejected the message
    #[error("inner layer: {0}")]
    Inner(#[source] E),
}

impl<E: std::error::Error + 'static> MessengerError<E> {
    /// Returns true if retrying after the header window advances may help.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Engine(e) => e.is_transient(),
            Self::Inner(_) => false,
        }
    }
}

/// A message recovered by [`Messenger::open`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedMessage {
    /// Inner-layer plaintext
    pub plaintext: Vec<u8>,
    /// Outer-layer decode details
    pub outer: DecodedMessage,
}

/// Both protocol layers behind one API.
#[derive(Debug, Clone)]
pub struct Messenger<I, E: Environment> {
    inner: I,
    engine: ProtocolEngine<E>,
}

impl<I: InnerCipher, E: Environment> Messenger<I, E> {
    /// Combine an inner cipher with an outer engine.
    pub fn new(inner: I, engine: ProtocolEngine<E>) -> Self {
        Self { inner, engine }
    }

    /// The outer engine.
    pub fn engine(&self) -> &ProtocolEngine<E> {
        &self.engine
    }

    /// Encrypt for `recipient`, then wrap in an outer envelope.
    ///
    /// # Errors
    ///
    /// - `MessengerError::Inner` if the inner cipher fails
    /// - `MessengerError::Engine` if the outer layer rejects the payload
    pub fn seal(
        &self,
        recipient: &I::Identity,
        recipient_ref: RecipientRef,
        plaintext: &[u8],
    ) -> Result<Bytes, MessengerError<I::Error>> {
        let inner = self.inner.encrypt(recipient, plaintext).map_err(MessengerError::Inner)?;
        Ok(self.engine.encode_to_wire(&inner, recipient_ref)?)
    }

    /// Strip the outer envelope, then decrypt from `sender`.
    ///
    /// # Errors
    ///
    /// - `MessengerError::Engine` if the outer layer rejects the envelope
    /// - `MessengerError::Inner` if the inner cipher fails
    pub fn open(
        &self,
        sender: &I::Identity,
        wire: &[u8],
    ) -> Result<OpenedMessage, MessengerError<I::Error>> {
        let outer = self.engine.decode(wire)?;
        let plaintext =
            self.inner.decrypt(sender, &outer.plaintext).map_err(MessengerError::Inner)?;

        Ok(OpenedMessage { plaintext, outer })
    }
}
