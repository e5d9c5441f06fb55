use modbox_shared::HandleTable;

const GRAVITY: f32 = 9.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Cube,
    Drawable,
}

#[derive(Debug, Clone)]
pub struct SceneObject {
    pub kind: ObjectKind,
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub textures: Vec<u64>,
    /// Collision box size, present once physics is enabled
    pub physics: Option<[f32; 3]>,
}

impl SceneObject {
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            kind,
            position: [0.0; 3],
            rotation: [0.0; 3],
            textures: Vec::new(),
            physics: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Texture {
    pub path: String,
}

/// Stand-in for the engine's scene graph and physics world. Lives on the
/// render thread; everything else reaches it through the dispatch queue.
pub struct Scene {
    pub objects: HandleTable<SceneObject>,
    pub textures: HandleTable<Texture>,
    pub frames_drawn: u64,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            objects: HandleTable::new("object"),
            textures: HandleTable::new("texture"),
            frames_drawn: 0,
        }
    }
}

impl Scene {
    /// Advances physics by `dt` seconds and "draws" the frame
    pub fn step(&mut self, dt: f32) {
        for (_, object) in self.objects.iter_mut() {
            if let Some(size) = object.physics {
                // rest on the ground plane
                let bottom = size[1] / 2.0;
                object.position[1] = (object.position[1] - GRAVITY * dt).max(bottom);
            }
        }
        self.frames_drawn += 1;
    }
}
