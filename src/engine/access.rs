use crate::error::EngineError;
use alloy_primitives::Address;

/// Owner-side half of the access gate, held by the engine.
#[derive(Debug)]
pub struct OwnerGate {
    credential: Address,
}

/// Capability required by every mutating entrypoint. Minted exactly once at
/// engine construction and handed to the deploying principal; holding the
/// token IS being the owner.
#[derive(Clone, Debug)]
pub struct OwnerToken {
    credential: Address,
}

impl OwnerGate {
    /// Mint the gate and its single matching token.
    pub fn mint() -> (Self, OwnerToken) {
        let credential = Address::random();
        (Self { credential }, OwnerToken { credential })
    }

    pub fn require(&self, token: &OwnerToken) -> Result<(), EngineError> {
        if token.credential == self.credential { Ok(()) } else { Err(EngineError::NotOwner) }
    }
}
