//! Certificates, chain enumeration and trust pinning.

pub mod certificate;
pub mod pinning;

pub use certificate::{format_pin, Certificate, CertificateChain, StoreContextChain};
pub use pinning::{Challenge, ChallengeKind, Disposition, PinningMaterial, TrustValidator};
