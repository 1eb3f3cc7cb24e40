/*
    core_activation - Signature-gated activation protocol

    The cryptographic half of backup-key recovery:
    - Domain-separated, context-bound activation digests
    - Recoverable secp256k1 signatures (parse, recover signer address)
    - A local signer for callers that hold their key in-process

    The registry consumes these primitives; everything here is pure and
    store-free so a remote signer can reproduce the exact bytes it must
    sign without trusting the caller.
*/

pub mod digest;
pub mod signature;
pub mod signer;

pub use digest::{
    activation_digest, keccak256, signed_message_digest, ACTIVATION_DOMAIN_TAG,
    SIGNED_MESSAGE_PREFIX,
};
pub use signature::{RecoverableSignature, SignatureError, SIGNATURE_LEN};
pub use signer::ActivationSigner;
