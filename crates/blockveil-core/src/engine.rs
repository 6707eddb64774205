//! Outer-layer protocol engine.
//!
//! Orchestrates padding, key selection, AEAD, and framing. Encoding is a
//! single pass against the newest header. Decoding searches the lookback
//! window freshest-first and stops at the first key that authenticates.
//!
//! # State Machine
//!
//! ```text
//!          encode()   ┌──────────┐   sealed    ┌─────────┐
//!        ┌───────────>│ Encoding │────────────>│ Encoded │
//! ┌──────┐            └──────────┘             └─────────┘
//! │ Idle │                 │ oversize / empty window
//! └──────┘                 ↓
//!        │ decode()   ┌──────────┐  rejected   ┌────────┐
//!        └───────────>│ Decoding │────────────>│ Failed │
//!                     └──────────┘             └────────┘
//!                          │ candidate authenticated
//!                          ↓
//!                     ┌─────────┐
//!                     │ Decoded │
//!                     └─────────┘
//! ```
//!
//! Every operation is synchronous and runs to a terminal state. The decode
//! loop performs at most [`MAX_CANDIDATES`] AEAD attempts and never suspends,
//! so an outer timeout can only take effect between whole operations.

use blockveil_crypto::{CipherError, decrypt, encrypt};
use blockveil_proto::{BlockHash, Envelope, PaddingBucket, RecipientRef, pad, unpad};
use bytes::Bytes;
use zeroize::Zeroizing;

use crate::{
    env::Environment,
    error::EngineError,
    header::BlockHeader,
    window::{MAX_CANDIDATES, MIN_CAPACITY, ObserveOutcome, SharedHeaderWindow},
};

// The envelope carries exactly what the cipher produces
const _: () = assert!(blockveil_crypto::NONCE_SIZE == Envelope::NONCE_SIZE);
const _: () = assert!(blockveil_crypto::TAG_SIZE == Envelope::TAG_SIZE);

/// Default number of headers retained by an engine-owned window.
pub const DEFAULT_WINDOW_CAPACITY: usize = MIN_CAPACITY;

/// Engine configuration
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Headers retained for lookback (raised to the minimum if lower)
    pub window_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { window_capacity: DEFAULT_WINDOW_CAPACITY }
    }
}

/// Lifecycle of a single encode or decode operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    /// Not started
    Idle,
    /// Padding and sealing against the current header
    Encoding,
    /// Envelope produced (terminal)
    Encoded,
    /// Searching candidate headers
    Decoding,
    /// Plaintext recovered (terminal)
    Decoded,
    /// Operation rejected (terminal)
    Failed,
}

impl OperationState {
    /// True for states an operation never leaves.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Encoded | Self::Decoded | Self::Failed)
    }

    /// True if `next` is a legal successor of `self`.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Encoding | Self::Decoding)
                | (Self::Encoding, Self::Encoded | Self::Failed)
                | (Self::Decoding, Self::Decoded | Self::Failed)
        )
    }
}

/// Tracks one operation through [`OperationState`].
struct Operation {
    state: OperationState,
}

impl Operation {
    fn begin(first: OperationState) -> Self {
        let mut op = Self { state: OperationState::Idle };
        op.advance(first);
        op
    }

    fn advance(&mut self, next: OperationState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {:?} -> {next:?}",
            self.state
        );
        tracing::trace!(from = ?self.state, to = ?next, "operation state");
        self.state = next;
    }

    fn finish<T>(
        mut self,
        success: OperationState,
        result: Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        self.advance(if result.is_ok() { success } else { OperationState::Failed });
        debug_assert!(self.state.is_terminal());
        result
    }
}

/// Result of a successful decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMessage {
    /// Payload as passed to `encode` (inner-layer ciphertext)
    pub plaintext: Vec<u8>,
    /// Header whose key authenticated the envelope
    pub matched_header: BlockHash,
    /// Height of the matching header
    pub matched_height: u64,
    /// Candidate keys tried, including the matching one
    pub attempts: usize,
    /// Routing hint carried by the envelope, authenticated with the content
    pub recipient_ref: RecipientRef,
}

/// Outer-layer encoder/decoder bound to one header window.
///
/// Cheap to share: all state lives in the [`SharedHeaderWindow`], and each
/// call works on its own snapshot. Keys are derived per call and zeroized
/// when the call returns.
#[derive(Debug, Clone)]
pub struct ProtocolEngine<E: Environment> {
    env: E,
    window: SharedHeaderWindow,
}

impl<E: Environment> ProtocolEngine<E> {
    /// Create an engine with its own empty window.
    pub fn new(env: E, config: EngineConfig) -> Self {
        Self::with_window(env, SharedHeaderWindow::new(config.window_capacity))
    }

    /// Create an engine over an existing (possibly shared) window.
    pub fn with_window(env: E, window: SharedHeaderWindow) -> Self {
        Self { env, window }
    }

    /// The header window this engine reads.
    pub fn window(&self) -> &SharedHeaderWindow {
        &self.window
    }

    /// Feed a newly reported header into the window.
    pub fn observe(&self, header: BlockHeader) -> ObserveOutcome {
        self.window.observe(header)
    }

    /// Seal an (already inner-encrypted) payload into an envelope.
    ///
    /// # Errors
    ///
    /// - `EngineError::PayloadTooLarge` if the payload exceeds the largest
    ///   bucket; checked before any key derivation or nonce generation
    /// - `EngineError::NoHeaderAvailable` if the window is empty
    pub fn encode(
        &self,
        payload: &[u8],
        recipient_ref: RecipientRef,
    ) -> Result<Envelope, EngineError> {
        let op = Operation::begin(OperationState::Encoding);
        op.finish(OperationState::Encoded, self.seal(payload, recipient_ref))
    }

    /// Seal a payload and serialize the envelope.
    pub fn encode_to_wire(
        &self,
        payload: &[u8],
        recipient_ref: RecipientRef,
    ) -> Result<Bytes, EngineError> {
        Ok(self.encode(payload, recipient_ref)?.to_bytes()?)
    }

    /// Parse and open a wire envelope.
    ///
    /// # Errors
    ///
    /// - `EngineError::MalformedFrame` if the bytes are not an envelope
    /// - see [`Self::decode_envelope`]
    pub fn decode(&self, wire: &[u8]) -> Result<DecodedMessage, EngineError> {
        let op = Operation::begin(OperationState::Decoding);
        let result = Envelope::decode(wire).map_err(EngineError::from);
        let result = result.and_then(|envelope| self.open(&envelope));
        op.finish(OperationState::Decoded, result)
    }

    /// Open a parsed envelope.
    ///
    /// # Errors
    ///
    /// - `EngineError::DecryptionExhausted` if the referenced header is not
    ///   in the window, or no candidate key authenticates
    /// - `EngineError::PaddingCorrupt` if the authenticated plaintext is not
    ///   a valid padded buffer
    pub fn decode_envelope(&self, envelope: &Envelope) -> Result<DecodedMessage, EngineError> {
        let op = Operation::begin(OperationState::Decoding);
        op.finish(OperationState::Decoded, self.open(envelope))
    }

    fn seal(&self, payload: &[u8], recipient_ref: RecipientRef) -> Result<Envelope, EngineError> {
        let (bucket, padded) = pad(payload)?;
        let padded = Zeroizing::new(padded);

        let snapshot = self.window.snapshot();
        let header = snapshot.current()?;

        let key = header.transport_key();
        let nonce = self.env.random_nonce();
        let aad = Envelope::associated_data(header.hash(), &recipient_ref);
        let ciphertext = encrypt(&key, &nonce, &aad, &padded);

        tracing::debug!(
            header = %header.hash(),
            height = header.height(),
            ?bucket,
            "encoded envelope"
        );

        Ok(Envelope::new(*header.hash(), recipient_ref, nonce, ciphertext))
    }

    fn open(&self, envelope: &Envelope) -> Result<DecodedMessage, EngineError> {
        let snapshot = self.window.snapshot();

        if !snapshot.contains(&envelope.header_ref) {
            tracing::debug!(header = %envelope.header_ref, "envelope references unknown header");
            return Err(EngineError::DecryptionExhausted { attempts: 0 });
        }

        let aad = Envelope::associated_data(&envelope.header_ref, &envelope.recipient_ref);

        let mut attempts = 0;
        for candidate in snapshot.candidates_for_decode() {
            attempts += 1;

            let key = candidate.transport_key();
            let padded = match decrypt(&key, &envelope.nonce, &aad, &envelope.content) {
                Ok(padded) => Zeroizing::new(padded),
                Err(CipherError::AuthenticationFailure) => {
                    tracing::trace!(header = %candidate.hash(), attempts, "candidate rejected");
                    continue;
                },
            };

            let plaintext = strip_padding(&padded)?;

            tracing::debug!(
                header = %candidate.hash(),
                height = candidate.height(),
                attempts,
                "decoded envelope"
            );

            return Ok(DecodedMessage {
                plaintext,
                matched_header: *candidate.hash(),
                matched_height: candidate.height(),
                attempts,
                recipient_ref: envelope.recipient_ref.clone(),
            });
        }

        debug_assert!(attempts <= MAX_CANDIDATES);
        tracing::debug!(header = %envelope.header_ref, attempts, "decryption exhausted");

        Err(EngineError::DecryptionExhausted { attempts })
    }
}

fn strip_padding(padded: &[u8]) -> Result<Vec<u8>, EngineError> {
    let bucket = PaddingBucket::from_padded_len(padded.len()).ok_or_else(|| {
        EngineError::PaddingCorrupt {
            reason: format!("{} bytes is not a bucket size", padded.len()),
        }
    })?;

    Ok(unpad(padded, bucket)?.to_vec())
}
