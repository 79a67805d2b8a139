pub mod encoder;
pub mod error;
pub mod form;
pub mod frame;
pub mod generator;
pub mod prompt;
pub mod request;
pub mod session;

pub use error::MockupError;
pub use form::{FormField, MockupForm};
pub use frame::{GeneratedFrame, GenerationResult};
pub use generator::{generate_frames, ImageModel};
pub use request::{GenerationRequest, OutputKind, SourceImage};
pub use session::{Session, SessionState};
