pub mod bands;
pub mod beat;
pub mod color;
pub mod layout;
pub mod lights;
pub mod mapper;
pub mod report;
pub mod source;
pub mod strand;
pub mod threshold;
pub mod transform;
pub mod util;

pub use mapper::{FrameOutcome, SkipReason, SpectrumMapper};
pub use source::{AudioFrame, FrameSource};
