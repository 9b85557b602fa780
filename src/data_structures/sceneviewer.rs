/// Defaults shared by all scene viewers of a context.
#[derive(Debug)]
pub struct SceneviewerModule {
    default_background_colour: [f64; 3],
}

impl Default for SceneviewerModule {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneviewerModule {
    pub fn new() -> Self {
        Self {
            default_background_colour: [0.0, 0.0, 0.0],
        }
    }

    pub fn default_background_colour(&self) -> [f64; 3] {
        self.default_background_colour
    }

    pub fn set_default_background_colour(&mut self, rgb: [f64; 3]) {
        self.default_background_colour = rgb;
    }
}
