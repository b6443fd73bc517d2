pub mod appearance;
pub mod config;
pub mod error;
pub mod object;
pub mod pipeline;
pub mod pool;
pub mod rect;
pub mod reid;
pub mod reid_tracker;
pub mod spatial;

pub use appearance::{extract_appearance, Appearance, APPEARANCE_DIM};
pub use config::ReidConfig;
pub use error::TrackError;
pub use object::{Object, ObjectClass};
pub use pipeline::{Detector, PassThrough, Pipeline, ShortTermTracker};
pub use rect::Rect;
pub use reid_tracker::{FrameOutput, IdentityEvent, ReidTracker};
