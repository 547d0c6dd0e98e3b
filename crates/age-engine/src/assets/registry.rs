use std::collections::HashMap;
use crate::api::error::EngineError;
use crate::assets::manifest::ShapeManifest;
use crate::components::animation::{Animation, Frame};
use crate::core::hitbox::Hitbox;

/// Handle to a shape owned by a [`ShapeRegistry`].
/// Stable for the registry's lifetime; shapes are never removed or moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeHandle(pub u32);

/// A character-cell picture. Spaces are transparent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    id: String,
    rows: Vec<String>,
    width: i32,
    height: i32,
}

impl Shape {
    /// Build a shape from rows of text. Ragged rows are allowed; the width
    /// is the longest row. A shape with no visible cells is rejected.
    pub fn new(id: impl Into<String>, rows: Vec<String>) -> Result<Self, EngineError> {
        let id = id.into();
        if rows.is_empty() {
            return Err(EngineError::MalformedShape { id, reason: "no rows" });
        }
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        if width == 0 {
            return Err(EngineError::MalformedShape { id, reason: "all rows are empty" });
        }
        Ok(Self {
            id,
            width: width as i32,
            height: rows.len() as i32,
            rows,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    /// Character at (row, col); `None` outside the shape or past a short row.
    pub fn at(&self, row: i32, col: i32) -> Option<char> {
        if row < 0 || col < 0 {
            return None;
        }
        self.rows
            .get(row as usize)
            .and_then(|r| r.chars().nth(col as usize))
    }
}

/// Owner of every shape and named animation a game uses.
/// Read-only once the tick loop starts; entities hold [`ShapeHandle`]s.
pub struct ShapeRegistry {
    shapes: Vec<Shape>,
    by_name: HashMap<String, ShapeHandle>,
    animations: HashMap<String, (Vec<Frame>, bool)>,
}

impl ShapeRegistry {
    pub fn new() -> Self {
        Self {
            shapes: Vec::new(),
            by_name: HashMap::new(),
            animations: HashMap::new(),
        }
    }

    /// Build a registry from a parsed manifest.
    /// Shapes are registered in name order, so handles are deterministic.
    pub fn from_manifest(manifest: &ShapeManifest) -> Result<Self, EngineError> {
        let mut registry = Self::new();
        registry.load_manifest(manifest)?;
        Ok(registry)
    }

    /// Register every shape and animation of a manifest.
    pub fn load_manifest(&mut self, manifest: &ShapeManifest) -> Result<(), EngineError> {
        for (name, rows) in &manifest.shapes {
            self.register(name.clone(), rows.clone())?;
        }
        for (name, desc) in &manifest.animations {
            let mut frames = Vec::with_capacity(desc.frames.len());
            for frame in &desc.frames {
                let shape = self.require(&frame.shape)?;
                frames.push(Frame::new(shape, frame.ticks).with_offset(frame.offset.0, frame.offset.1));
            }
            self.animations.insert(name.clone(), (frames, desc.looping));
        }
        log::debug!(
            "loaded {} shapes and {} animations",
            manifest.shapes.len(),
            manifest.animations.len()
        );
        Ok(())
    }

    /// Register a shape under a unique name.
    pub fn register(&mut self, id: impl Into<String>, rows: Vec<String>) -> Result<ShapeHandle, EngineError> {
        let id = id.into();
        if self.by_name.contains_key(&id) {
            return Err(EngineError::DuplicateShape(id));
        }
        let shape = Shape::new(id.clone(), rows)?;
        let handle = ShapeHandle(self.shapes.len() as u32);
        self.shapes.push(shape);
        self.by_name.insert(id, handle);
        Ok(handle)
    }

    /// Look up a shape handle by name. Returns None if not found.
    pub fn handle(&self, name: &str) -> Option<ShapeHandle> {
        self.by_name.get(name).copied()
    }

    /// Like [`handle`](Self::handle), but a miss is a configuration error.
    pub fn require(&self, name: &str) -> Result<ShapeHandle, EngineError> {
        self.handle(name)
            .ok_or_else(|| EngineError::UnknownShape(name.to_string()))
    }

    pub fn get(&self, handle: ShapeHandle) -> Option<&Shape> {
        self.shapes.get(handle.0 as usize)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Shape> {
        self.handle(name).and_then(|h| self.get(h))
    }

    /// A hitbox covering the whole shape, or an empty box for an unknown handle.
    pub fn hitbox_of(&self, handle: ShapeHandle) -> Hitbox {
        self.get(handle)
            .map(|s| Hitbox::from_size(s.width(), s.height()))
            .unwrap_or_default()
    }

    /// A fresh animation instance, starting at frame 0.
    pub fn animation(&self, name: &str) -> Option<Animation> {
        self.animations
            .get(name)
            .map(|(frames, looping)| Animation::new(frames.clone(), *looping))
    }

    pub fn shape_ids(&self) -> impl Iterator<Item = &str> {
        self.shapes.iter().map(|s| s.id())
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
        self.by_name.clear();
        self.animations.clear();
    }
}

impl Default for ShapeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
