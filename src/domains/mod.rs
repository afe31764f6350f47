pub mod verify;

pub use verify::{
    ChallengeMethod, ChallengeState, DnsLookup, DomainVerifier, VerificationChallenge,
};
