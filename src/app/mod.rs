// Application layer - Use case interactors

pub mod container;
pub mod inspect_interactor;
pub mod transcode_interactor;

// Re-export interactors
pub use inspect_interactor::{InspectFormat, InspectInteractor, InspectRequest, InspectResponse};
pub use transcode_interactor::{JobReport, TranscodeInteractor};
