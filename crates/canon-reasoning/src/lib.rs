//! # canon-reasoning
//!
//! The per-claim verification engine.
//!
//! ```text
//! ClaimVerifier
//! ├── Decomposer          claim → typed sub-claims (never empty)
//! ├── DualEvaluator       support pass and contradiction pass, kept apart
//! │   └── violation_for   contradiction → ConstraintViolation + severity
//! ├── VerdictSynthesizer  pure threshold rules → verdict, confidence, reasoning
//! └── DependencyGate      stops calling out once the generator is exhausted
//! ```

pub mod decode;
pub mod decomposer;
pub mod engine;
pub mod evaluator;
pub mod gate;
pub mod synthesizer;

pub use decomposer::{decode_sub_claims, Decomposer};
pub use engine::ClaimVerifier;
pub use evaluator::{
    evidence_text, violation_for, ContradictionAssessment, DualEvaluator, SupportAssessment,
};
pub use gate::DependencyGate;
pub use synthesizer::{
    DefiniteContradiction, Synthesis, SynthesisBasis, SynthesisInput, VerdictSynthesizer,
};
