//! Turning a [`RunConfig`] plus an ephemeris source into a ready-to-run scene.

use solar_config::{ConfigError, RunConfig};
use solar_ephem::{EphemerisError, EphemerisSource};
use solar_render::{CentralGlyph, RenderStyle};
use solar_scene::{Body, FarField, Scene, SceneError, SceneSettings, TimestampFormat};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("could not seed body `{body}`: {source}")]
    Ephemeris {
        body: String,
        #[source]
        source: EphemerisError,
    },
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Integrator and presentation settings described by the configuration.
pub fn scene_settings(config: &RunConfig) -> SceneSettings {
    let far = &config.far_field;
    SceneSettings {
        gm: config.gm_au3_day2,
        timestep: config.timestep_days(),
        far_field: far.enabled.then_some(FarField {
            threshold_au: far.threshold_au,
            bearing_scale: far.bearing_scale,
            tail_fraction: far.tail_fraction,
        }),
        label_offset: config.label_offset_au,
        timestamp: TimestampFormat {
            prefix: config.timestamp.prefix.clone(),
            width: config.timestamp.width,
        },
    }
}

/// Canvas settings for the bitmap renderers.
pub fn render_style(config: &RunConfig, draw_text: bool) -> Result<RenderStyle, ConfigError> {
    Ok(RenderStyle {
        half_width_au: config.view.half_width_au,
        width_px: config.view.width_px,
        height_px: config.view.height_px,
        central: CentralGlyph {
            name: config.central_body.name.clone(),
            color: config.central_body.color()?,
            display_radius: config.central_body.display_radius,
        },
        draw_text,
        ..RenderStyle::default()
    })
}

/// Build the scene, querying `source` once per configured body at the start epoch.
pub fn build_scene<S>(config: &RunConfig, source: &S) -> Result<Scene, SetupError>
where
    S: EphemerisSource + ?Sized,
{
    let start_jd = config.start_jd()?;
    let mut scene = Scene::new(start_jd, scene_settings(config))?;
    for body_cfg in &config.bodies {
        let state = source
            .state_vector(&body_cfg.id, start_jd)
            .map_err(|source| SetupError::Ephemeris {
                body: body_cfg.label().to_string(),
                source,
            })?;
        info!(
            body = body_cfg.label(),
            id = %body_cfg.id,
            x = state.position_au[0],
            y = state.position_au[1],
            "seeded body"
        );
        let body = Body::new(
            body_cfg.label(),
            body_cfg.display_radius,
            body_cfg.color()?,
            state.position_au,
            state.velocity_au_day,
        )
        .with_bearing_stretch(body_cfg.bearing_stretch);
        scene.add_body(body)?;
    }
    Ok(scene)
}
