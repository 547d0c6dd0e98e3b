use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

/// Shape manifest describing every named shape a game draws.
/// Loaded from a JSON file, usually embedded with `include_str!`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeManifest {
    /// Named shapes: name → character rows, top to bottom.
    /// Spaces are transparent.
    pub shapes: BTreeMap<String, Vec<String>>,
    /// Named animations built from the shapes above.
    #[serde(default)]
    pub animations: BTreeMap<String, AnimationDescriptor>,
}

/// Describes an animation as a sequence of shape names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationDescriptor {
    pub frames: Vec<FrameDescriptor>,
    #[serde(default = "default_looping")]
    pub looping: bool,
}

/// Describes one animation frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameDescriptor {
    /// Name of a shape in the same manifest.
    pub shape: String,
    /// How many ticks the frame stays on screen.
    pub ticks: u32,
    /// Pixel offset applied while the frame is shown.
    #[serde(default)]
    pub offset: (i32, i32),
}

fn default_looping() -> bool {
    true
}

impl ShapeManifest {
    /// Parse a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_manifest_with_animation() {
        let json = r#"{
            "shapes": {
                "bird": [">o"],
                "bird_flap": ["^o"]
            },
            "animations": {
                "flap": {
                    "frames": [
                        { "shape": "bird", "ticks": 25 },
                        { "shape": "bird_flap", "ticks": 15, "offset": [0, -1] }
                    ]
                }
            }
        }"#;
        let manifest = ShapeManifest::from_json(json).unwrap();
        assert_eq!(manifest.shapes.len(), 2);

        let flap = &manifest.animations["flap"];
        assert!(flap.looping);
        assert_eq!(flap.frames[0].offset, (0, 0));
        assert_eq!(flap.frames[1].offset, (0, -1));
        assert_eq!(flap.frames[1].ticks, 15);
    }

    #[test]
    fn parse_minimal_manifest() {
        let json = r#"{ "shapes": { "star": ["*"] } }"#;
        let manifest = ShapeManifest::from_json(json).unwrap();
        assert_eq!(manifest.shapes["star"], vec!["*".to_string()]);
        assert!(manifest.animations.is_empty());
    }
}
