// Privacy plane: swap commitments and their proofs
//
// Numan Thabit 2025 Nov

pub mod commitment;
pub mod provider;

pub use commitment::{CommitmentService, ProofRecord, SwapCommitment};
pub use provider::{
    DeterministicProofProvider, ProofProvider, SignedProofProvider, SimulatedProofProvider,
};
