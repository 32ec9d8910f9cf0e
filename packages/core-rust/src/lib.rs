//! `taskpush` Core: delivery metadata, task payloads, operation tags, and wire schemas.

pub mod clock;
pub mod delivery;
pub mod messages;
pub mod operation;
pub mod payload;

pub use clock::{iso8601, ClockSource, FixedClock, SystemClock};
pub use delivery::{parse_count, DeliveryMetadata};
pub use operation::OperationKind;
pub use payload::{Dimensions, OperationSpec, PayloadError, ResizeSpec, TaskPayload, ThumbnailSpec};
