//! Replay one frame and a track snapshot through the radar pipeline.
//!
//! ```text
//! cargo run -p courtview --example radar_replay -- frame.png tracks.json [out_dir]
//! ```
//!
//! `tracks.json` is an array of tagged tracks, e.g.
//! `[{"kind": "ltrb", "id": 3, "confirmed": true, "ltrb": [410, 300, 470, 520]}]`.
//! If no calibration is stored next to the frame, a scripted operator session
//! marks a court proportional to the frame and saves it.

use std::{env, fs, path::PathBuf};

use courtview::acquisition::{render_acquisition, Acquisition, AcquisitionEvent};
use courtview::export::{from_rgb_image, save_png};
use courtview::overlay::{render_frame_tracks, render_tracks};
use courtview::projection::{RadarProjector, ZoneFilterState};
use courtview::radar::{RadarCanvas, RadarConfig};
use courtview::selection::{ImagePoint, Phase};
use courtview::store::{self, CalibrationRecord};
use courtview::tracks::{TrackView, TrackedObject};
use nalgebra::Point2;
#[cfg(feature = "tracing")]
use tracing_log::LogTracer;
#[cfg(feature = "tracing")]
use tracing_subscriber::EnvFilter;

/// Court clicks as fractions of the frame size, in phase order.
const SCRIPTED_CLICKS: [[f32; 2]; 10] = [
    [0.32, 0.22],
    [0.68, 0.22],
    [0.92, 0.90],
    [0.08, 0.90],
    [0.14, 0.68],
    [0.86, 0.68],
    [0.20, 0.50],
    [0.80, 0.50],
    [0.25, 0.37],
    [0.75, 0.37],
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let args: Vec<String> = env::args().skip(1).collect();
    let (Some(frame_path), Some(tracks_path)) = (args.first(), args.get(1)) else {
        eprintln!("usage: radar_replay <frame.png> <tracks.json> [out_dir]");
        std::process::exit(2);
    };
    let out_dir = PathBuf::from(args.get(2).map(String::as_str).unwrap_or("out"));

    let frame = from_rgb_image(&image::open(frame_path)?.to_rgb8())?;
    let tracks: Vec<TrackedObject> = serde_json::from_str(&fs::read_to_string(tracks_path)?)?;

    let record = match store::load_calibration(frame_path) {
        Some(record) => record,
        None => {
            let acq = scripted_session(frame.width as f32, frame.height as f32);
            save_png(&render_acquisition(&frame, &acq), out_dir.join("acquisition.png"))?;
            let Some(selection) = acq.into_selection() else {
                return Err("scripted session did not confirm".into());
            };
            let record = CalibrationRecord::new(selection, Default::default());
            store::save_calibration(frame_path, &record)?;
            record
        }
    };

    let radar = RadarCanvas::new(RadarConfig::default())?;
    let state = ZoneFilterState::from_settings(&record.settings);
    let mut projector = RadarProjector::new(*radar.geometry());
    if let Some(perimeter) = record.selection.perimeter() {
        projector.calibrate(&perimeter, state.orientation)?;
    }

    let style = radar.config().style;
    let bg = radar.static_image();
    save_png(&bg, out_dir.join("radar_background.png"))?;
    if let Some(guide) = radar.render_guidance(Phase::CenterLine, 1) {
        save_png(&guide, out_dir.join("guidance_center_right.png"))?;
    }
    save_png(
        &render_tracks(&bg, &tracks, &projector, &state, &style),
        out_dir.join("radar_tracks.png"),
    )?;
    save_png(
        &render_frame_tracks(&frame, &tracks),
        out_dir.join("frame_tracks.png"),
    )?;

    let included = tracks
        .iter()
        .filter(|t| t.is_confirmed() && projector.accepts(t.ground_point(), &state))
        .count();
    println!(
        "{included}/{} tracks on the radar, images in {}",
        tracks.len(),
        out_dir.display()
    );
    Ok(())
}

/// Click through every phase, redo the center line once, then accept.
fn scripted_session(w: f32, h: f32) -> Acquisition {
    let at = |i: usize| -> ImagePoint {
        let [fx, fy] = SCRIPTED_CLICKS[i];
        Point2::new(fx * w, fy * h)
    };

    let mut acq = Acquisition::new();
    let mut next = 0;
    for phase in Phase::ALL {
        for _ in 0..phase.required_points() {
            acq.handle(AcquisitionEvent::PointerDown(at(next)));
            next += 1;
        }
        println!("{}", acq.prompt());
        acq.handle(AcquisitionEvent::Confirm);
    }

    acq.handle(AcquisitionEvent::SelectPhase(Phase::CenterLine.index()));
    acq.handle(AcquisitionEvent::PointerDown(at(6)));
    acq.handle(AcquisitionEvent::PointerDown(at(7)));
    acq.handle(AcquisitionEvent::Confirm);
    println!("{}", acq.prompt());
    acq.handle(AcquisitionEvent::Confirm);
    acq
}

fn init_logging() {
    #[cfg(feature = "tracing")]
    {
        let _ = LogTracer::init();
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    }
    #[cfg(not(feature = "tracing"))]
    {
        let _ = courtview::init_from_env(log::LevelFilter::Info);
    }
}
