use std::sync::OnceLock;

use courtview_core::RgbCanvas;

#[cfg(feature = "tracing")]
use tracing::instrument;

use super::{RadarConfig, RadarConfigError, RadarGeometry};
use crate::selection::Phase;

const GUIDANCE_RADIUS_PX: u32 = 9;

/// Static top-down court background with a memoized render.
///
/// The background is drawn on first use and cached. [`RadarCanvas::static_image`]
/// always hands out an independent copy, so callers can draw on it freely.
#[derive(Debug)]
pub struct RadarCanvas {
    config: RadarConfig,
    geometry: RadarGeometry,
    cache: OnceLock<RgbCanvas>,
}

impl RadarCanvas {
    pub fn new(config: RadarConfig) -> Result<Self, RadarConfigError> {
        let geometry = RadarGeometry::from_config(&config)?;
        Ok(Self {
            config,
            geometry,
            cache: OnceLock::new(),
        })
    }

    #[inline]
    pub fn geometry(&self) -> &RadarGeometry {
        &self.geometry
    }

    #[inline]
    pub fn config(&self) -> &RadarConfig {
        &self.config
    }

    /// A fresh copy of the static court background.
    pub fn static_image(&self) -> RgbCanvas {
        self.cache.get_or_init(|| self.render_static()).clone()
    }

    pub fn is_cached(&self) -> bool {
        self.cache.get().is_some()
    }

    /// Drop the cached background; the next read re-renders it.
    pub fn invalidate(&mut self) {
        if self.cache.take().is_some() {
            log::debug!("radar background cache invalidated");
        }
    }

    /// Replace the configuration, re-deriving geometry and invalidating the cache.
    ///
    /// On error the previous configuration stays in effect.
    pub fn reconfigure(&mut self, config: RadarConfig) -> Result<(), RadarConfigError> {
        self.geometry = RadarGeometry::from_config(&config)?;
        self.config = config;
        self.invalidate();
        Ok(())
    }

    /// Background plus a target marker where the `point_index`-th point of
    /// `phase` is expected. `None` for an index the phase does not have.
    pub fn render_guidance(&self, phase: Phase, point_index: usize) -> Option<RgbCanvas> {
        let target = self.geometry.expected_point(phase, point_index)?;
        let mut img = self.static_image();
        let c = (target.x.round() as i32, target.y.round() as i32);
        let color = self.config.style.guidance;
        img.stroke_circle(c, GUIDANCE_RADIUS_PX, color, 2);
        let arm = GUIDANCE_RADIUS_PX as i32 + 4;
        let (x, y) = c;
        img.draw_line((x.saturating_sub(arm), y), (x.saturating_add(arm), y), color, 1);
        img.draw_line((x, y.saturating_sub(arm)), (x, y.saturating_add(arm)), color, 1);
        Some(img)
    }

    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self), fields(width = self.geometry.width, height = self.geometry.height))
    )]
    fn render_static(&self) -> RgbCanvas {
        let g = &self.geometry;
        let cfg = &self.config;
        let style = &cfg.style;
        let (w, h) = (g.width as i32, g.height as i32);
        let (mx, my) = (g.margin_x, g.margin_y);
        let (left, right, top, bottom) = (mx, w - mx, my, h - my);
        let line = cfg.line_thickness_px;

        // geometry is validated against MAX_CANVAS_SIDE
        let Some(mut img) = RgbCanvas::new(g.width, g.height, style.free_zone) else {
            log::error!("radar canvas {}x{} cannot be allocated", g.width, g.height);
            return RgbCanvas::default();
        };
        img.fill_rect(left, top, right, bottom, style.court);
        img.stroke_rect(left, top, right, bottom, style.line, line);

        let center = g.center_row();
        img.draw_line(
            (left.saturating_sub(cfg.net_overhang_px), center),
            (right.saturating_add(cfg.net_overhang_px), center),
            style.net,
            cfg.net_thickness_px,
        );

        for row in [
            center.saturating_sub(g.attack_line_px),
            center.saturating_add(g.attack_line_px),
        ] {
            img.draw_line((left, row), (right, row), style.line, line);
        }

        let tick = cfg.tick_len_px;
        for x in [left, right] {
            img.draw_line((x, top), (x, top.saturating_sub(tick)), style.line, line);
            img.draw_line((x, bottom), (x, bottom.saturating_add(tick)), style.line, line);
        }

        log::debug!("rendered radar background {}x{}", g.width, g.height);
        img
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas() -> RadarCanvas {
        RadarCanvas::new(RadarConfig::default()).expect("default config")
    }

    #[test]
    fn background_has_expected_size_and_layers() {
        let radar = canvas();
        let img = radar.static_image();
        let style = radar.config().style;
        assert_eq!((img.width, img.height), (520, 880));
        // free zone, court interior, border, net, attack line
        assert_eq!(img.pixel(5, 5), Some(style.free_zone));
        assert_eq!(img.pixel(200, 200), Some(style.court));
        assert_eq!(img.pixel(80, 200), Some(style.line));
        assert_eq!(img.pixel(260, 440), Some(style.net));
        assert_eq!(img.pixel(65, 440), Some(style.net));
        assert_eq!(img.pixel(55, 440), Some(style.free_zone));
        assert_eq!(img.pixel(260, 320), Some(style.line));
        assert_eq!(img.pixel(260, 560), Some(style.line));
        // corner ticks reach into the free zone
        assert_eq!(img.pixel(80, 72), Some(style.line));
        assert_eq!(img.pixel(440, 808), Some(style.line));
        assert_eq!(img.pixel(80, 60), Some(style.free_zone));
    }

    #[test]
    fn cache_is_filled_lazily_and_not_aliased() {
        let radar = canvas();
        assert!(!radar.is_cached());
        let mut first = radar.static_image();
        assert!(radar.is_cached());

        first.fill(courtview_core::Rgb::BLACK);
        let second = radar.static_image();
        assert_ne!(first, second);
        assert_eq!(second.pixel(5, 5), Some(radar.config().style.free_zone));
    }

    #[test]
    fn invalidate_forces_rerender() {
        let mut radar = canvas();
        let before = radar.static_image();
        radar.invalidate();
        assert!(!radar.is_cached());
        assert_eq!(radar.static_image(), before);
    }

    #[test]
    fn reconfigure_changes_geometry_and_drops_cache() {
        let mut radar = canvas();
        let _ = radar.static_image();
        let cfg = RadarConfig {
            px_per_meter: 20.0,
            ..RadarConfig::default()
        };
        radar.reconfigure(cfg).expect("valid");
        assert!(!radar.is_cached());
        let img = radar.static_image();
        assert_eq!((img.width, img.height), (260, 440));

        let bad = RadarConfig {
            px_per_meter: -1.0,
            ..RadarConfig::default()
        };
        assert!(radar.reconfigure(bad).is_err());
        assert_eq!(radar.geometry().width, 260);
    }

    #[test]
    fn oversized_or_extreme_configs_never_panic() {
        let huge = RadarConfig {
            px_per_meter: 1e9,
            ..RadarConfig::default()
        };
        assert!(matches!(
            RadarCanvas::new(huge),
            Err(RadarConfigError::CanvasTooLarge { .. })
        ));

        let odd = RadarConfig {
            px_per_meter: 10.0,
            attack_line_m: 1e30,
            net_overhang_px: i32::MAX,
            tick_len_px: i32::MIN,
            ..RadarConfig::default()
        };
        let radar = RadarCanvas::new(odd).expect("fits");
        let img = radar.static_image();
        assert_eq!((img.width, img.height), (130, 220));
        assert_eq!(img.pixel(0, 110), Some(radar.config().style.net));
    }

    #[test]
    fn guidance_marks_expected_location() {
        let radar = canvas();
        let color = radar.config().style.guidance;
        let img = radar
            .render_guidance(Phase::CenterLine, 1)
            .expect("valid index");
        // ring around (440, 440), crosshair arm past it
        assert_eq!(img.pixel(440 + 9, 440), Some(color));
        assert_eq!(img.pixel(440, 440 - 12), Some(color));
        assert!(radar.render_guidance(Phase::Perimeter, 7).is_none());
        // the cached background stays clean
        assert_ne!(radar.static_image().pixel(449, 440), Some(color));
    }
}
