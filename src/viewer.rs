//! Camera and viewport state of the document's scene viewer.

use cgmath::{Deg, InnerSpace, Point3, Vector3};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    context::{Context, ContextId},
    error::EngineError,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectionMode {
    Perspective,
    Parallel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransparencyMode {
    Fast,
    Slow,
    OrderIndependent,
}

/// Wire form of [`ViewerState`]. Every key is optional when reading.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SceneviewerDescription {
    anti_alias_sampling: Option<u32>,
    #[serde(rename = "BackgroundColourRGB")]
    background_colour_rgb: Option<[f64; 3]>,
    eye_position: Option<[f64; 3]>,
    far_clipping_plane: Option<f64>,
    lookat_position: Option<[f64; 3]>,
    near_clipping_plane: Option<f64>,
    perturb_lines_flag: Option<bool>,
    projection_mode: Option<ProjectionMode>,
    transparency_mode: Option<TransparencyMode>,
    up_vector: Option<[f64; 3]>,
    view_angle: Option<f64>,
}

/// Camera, clipping and rendering options for one context.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewerState {
    context: ContextId,
    pub anti_alias_sampling: u32,
    pub background_colour: [f64; 3],
    pub eye_position: Point3<f64>,
    pub lookat_position: Point3<f64>,
    pub up_vector: Vector3<f64>,
    pub view_angle: Deg<f64>,
    pub near_clipping_plane: f64,
    pub far_clipping_plane: f64,
    pub perturb_lines: bool,
    pub projection_mode: ProjectionMode,
    pub transparency_mode: TransparencyMode,
}

impl ViewerState {
    /// Starts from the context's default background, looking down the -z axis
    /// at the origin.
    pub fn new(ctx: &Context) -> Self {
        Self {
            context: ctx.id(),
            anti_alias_sampling: 0,
            background_colour: ctx.sceneviewers.default_background_colour(),
            eye_position: Point3::new(0.0, 0.0, 5.0),
            lookat_position: Point3::new(0.0, 0.0, 0.0),
            up_vector: Vector3::unit_y(),
            view_angle: Deg(40.0),
            near_clipping_plane: 0.1,
            far_clipping_plane: 100.0,
            perturb_lines: false,
            projection_mode: ProjectionMode::Perspective,
            transparency_mode: TransparencyMode::Fast,
        }
    }

    pub fn context_id(&self) -> ContextId {
        self.context
    }

    /// Unit vector from the eye towards the look-at point.
    pub fn view_direction(&self) -> Vector3<f64> {
        (self.lookat_position - self.eye_position).normalize()
    }

    pub fn serialize(&self, ctx: &Context) -> Result<Value, EngineError> {
        ctx.check_scope(self.context)?;
        let description = SceneviewerDescription {
            anti_alias_sampling: Some(self.anti_alias_sampling),
            background_colour_rgb: Some(self.background_colour),
            eye_position: Some(self.eye_position.into()),
            far_clipping_plane: Some(self.far_clipping_plane),
            lookat_position: Some(self.lookat_position.into()),
            near_clipping_plane: Some(self.near_clipping_plane),
            perturb_lines_flag: Some(self.perturb_lines),
            projection_mode: Some(self.projection_mode),
            transparency_mode: Some(self.transparency_mode),
            up_vector: Some(self.up_vector.into()),
            view_angle: Some(self.view_angle.0),
        };
        Ok(serde_json::to_value(description)?)
    }

    /// Applies every key present in `blob`. The resulting view is checked
    /// before anything is changed.
    pub fn deserialize(&mut self, ctx: &Context, blob: &Value) -> Result<(), EngineError> {
        ctx.check_scope(self.context)?;
        let description: SceneviewerDescription = serde_json::from_value(blob.clone())?;

        let mut next = self.clone();
        if let Some(samples) = description.anti_alias_sampling {
            next.anti_alias_sampling = samples;
        }
        if let Some(rgb) = description.background_colour_rgb {
            next.background_colour = rgb;
        }
        if let Some(eye) = description.eye_position {
            next.eye_position = eye.into();
        }
        if let Some(lookat) = description.lookat_position {
            next.lookat_position = lookat.into();
        }
        if let Some(up) = description.up_vector {
            next.up_vector = up.into();
        }
        if let Some(angle) = description.view_angle {
            next.view_angle = Deg(angle);
        }
        if let Some(near) = description.near_clipping_plane {
            next.near_clipping_plane = near;
        }
        if let Some(far) = description.far_clipping_plane {
            next.far_clipping_plane = far;
        }
        if let Some(perturb) = description.perturb_lines_flag {
            next.perturb_lines = perturb;
        }
        if let Some(mode) = description.projection_mode {
            next.projection_mode = mode;
        }
        if let Some(mode) = description.transparency_mode {
            next.transparency_mode = mode;
        }
        next.validate()?;

        *self = next;
        Ok(())
    }

    fn validate(&self) -> Result<(), EngineError> {
        let view = self.lookat_position - self.eye_position;
        if view.magnitude2() == 0.0 {
            return Err(EngineError::InvalidViewer(
                "eye and look-at positions coincide".to_string(),
            ));
        }
        if self.up_vector.magnitude2() == 0.0
            || view.normalize().cross(self.up_vector.normalize()).magnitude2() < 1e-12
        {
            return Err(EngineError::InvalidViewer(
                "up vector is parallel to the view direction".to_string(),
            ));
        }
        if !(self.view_angle.0 > 0.0 && self.view_angle.0 < 180.0) {
            return Err(EngineError::InvalidViewer(format!(
                "view angle {} is outside (0, 180)",
                self.view_angle.0
            )));
        }
        if !(self.near_clipping_plane > 0.0 && self.near_clipping_plane < self.far_clipping_plane) {
            return Err(EngineError::InvalidViewer(format!(
                "clipping planes {}..{} are not increasing and positive",
                self.near_clipping_plane, self.far_clipping_plane
            )));
        }
        Ok(())
    }
}
