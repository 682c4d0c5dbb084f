//! Court calibration and top-down radar projection for fixed-camera
//! volleyball footage.
//!
//! The operator marks the court in a camera frame once; from then on every
//! tracked player is placed on a canonical, scale-correct "radar" view of
//! the court.
//!
//! ## Workflow
//!
//! ```no_run
//! use courtview::acquisition::{Acquisition, AcquisitionEvent};
//! use courtview::projection::{RadarProjector, ZoneFilterState};
//! use courtview::radar::{RadarCanvas, RadarConfig};
//! use courtview::store;
//! use courtview::tracks::LtrbTrack;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let source = "match.mp4";
//! let mut acq = match store::load_calibration(source) {
//!     Some(record) => Acquisition::resume(record.selection),
//!     None => Acquisition::new(),
//! };
//! // feed pointer and key events from the display layer ...
//! acq.handle(AcquisitionEvent::Confirm);
//!
//! let radar = RadarCanvas::new(RadarConfig::default())?;
//! let mut projector = RadarProjector::new(*radar.geometry());
//! let state = ZoneFilterState::default();
//! if let Some(selection) = acq.into_selection() {
//!     if let Some(perimeter) = selection.perimeter() {
//!         projector.calibrate(&perimeter, state.orientation)?;
//!     }
//! }
//!
//! let tracks: Vec<LtrbTrack> = Vec::new();
//! let frame = courtview::overlay::render_tracks(
//!     &radar.static_image(),
//!     &tracks,
//!     &projector,
//!     &state,
//!     &radar.config().style,
//! );
//! # let _ = frame;
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - [`acquisition`]: phased point collection with review/edit, plus its overlay.
//! - [`store`]: `<source>.json` persistence of points and settings.
//! - [`radar`]: canonical radar geometry and the cached court background.
//! - [`transform`]: the image-to-radar homography.
//! - [`projection`]: bounds, zone, invert and mirror handling per point.
//! - [`tracks`] / [`overlay`]: tracker adapters and per-frame drawing.
//! - `export` (feature `image`): `image::RgbImage` interop and PNG output.
//! - [`core`]: geometric building blocks (`courtview-core`).

pub use courtview_core as core;

pub mod acquisition;
pub mod overlay;
pub mod projection;
pub mod radar;
pub mod selection;
pub mod store;
pub mod tracks;
pub mod transform;

#[cfg(feature = "image")]
pub mod export;

pub use courtview_core::{init_from_env, init_with_level};
#[cfg(feature = "tracing")]
pub use courtview_core::init_tracing;

pub use acquisition::{render_acquisition, Acquisition, AcquisitionEvent, AcquisitionState};
pub use projection::{project, Projection, RadarProjector, Zone, ZoneFilterState};
pub use radar::{RadarCanvas, RadarConfig, RadarGeometry};
pub use selection::{CourtSelection, ImagePoint, Phase, PHASES, TOTAL_POINTS};
pub use store::{load_calibration, save_calibration, CalibrationRecord, Settings};
pub use tracks::{BoundingBox, TrackView, TrackedObject};
pub use transform::{Orientation, PerspectiveTransform, TransformError};
