use modbox_shared::{
    ArgValue, CallArgs, CallResult, DispatchQueue, FunctionRegistry, HandlerError, RegistryPlugin,
    Signature, NULL_HANDLE,
};

use crate::scene::{ObjectKind, Scene, SceneObject, Texture};

const TEXTURE_EXTENSIONS: [&str; 3] = [".png", ".jpg", ".bmp"];

fn sig(text: &str) -> Signature {
    match text.parse() {
        Ok(signature) => signature,
        Err(error) => panic!("invalid signature '{}' in graphics functions: {}", text, error),
    }
}

fn vector(args: &CallArgs, first: usize) -> Result<[f32; 3], HandlerError> {
    Ok([args.f32(first)?, args.f32(first + 1)?, args.f32(first + 2)?])
}

/// Exposes the scene to modules as `graphics.*` functions
pub struct GraphicsFunctions {
    pub queue: DispatchQueue<Scene>,
}

impl GraphicsFunctions {
    fn create(&self, registry: &mut FunctionRegistry, name: &str, kind: ObjectKind) {
        let queue = self.queue.clone();
        registry.register(
            name,
            move |_: &CallArgs| {
                let handle = queue.submit_with_result(move |scene: &mut Scene| {
                    log::info!("Creating {:?}", kind);
                    scene.objects.insert(SceneObject::new(kind))
                })?;
                Ok(CallResult::single(ArgValue::U64(handle)))
            },
            Signature::empty(),
            sig("u"),
        );
    }

    fn add_texture(&self, registry: &mut FunctionRegistry, name: &str) {
        let queue = self.queue.clone();
        registry.register(
            name,
            move |args: &CallArgs| {
                let object = args.u64(0)?;
                let texture = args.u64(1)?;
                queue.submit_with_result(move |scene: &mut Scene| -> Result<(), HandlerError> {
                    scene.textures.get(texture)?;
                    log::info!("Adding texture {} to object {}", texture, object);
                    scene.objects.get_mut(object)?.textures.push(texture);
                    Ok(())
                })??;
                Ok(CallResult::empty())
            },
            sig("uu"),
            Signature::empty(),
        );
    }
}

impl RegistryPlugin for GraphicsFunctions {
    fn build(&self, registry: &mut FunctionRegistry) {
        self.create(registry, "graphics.createCube", ObjectKind::Cube);
        self.create(registry, "graphics.drawable.createCube", ObjectKind::Drawable);

        let queue = self.queue.clone();
        registry.register(
            "graphics.moveObject",
            move |args: &CallArgs| {
                let handle = args.u64(0)?;
                let position = vector(args, 1)?;
                queue.submit_with_result(move |scene: &mut Scene| {
                    scene.objects.get_mut(handle).map(|object| object.position = position)
                })??;
                Ok(CallResult::empty())
            },
            sig("ufff"),
            Signature::empty(),
        );

        let queue = self.queue.clone();
        registry.register(
            "graphics.rotateObject",
            move |args: &CallArgs| {
                let handle = args.u64(0)?;
                let rotation = vector(args, 1)?;
                queue.submit_with_result(move |scene: &mut Scene| {
                    scene.objects.get_mut(handle).map(|object| object.rotation = rotation)
                })??;
                Ok(CallResult::empty())
            },
            sig("ufff"),
            Signature::empty(),
        );

        let queue = self.queue.clone();
        registry.register(
            "graphics.deleteObject",
            move |args: &CallArgs| {
                let handle = args.u64(0)?;
                queue.submit_with_result(move |scene: &mut Scene| {
                    scene.objects.remove(handle).map(|_| ())
                })??;
                Ok(CallResult::empty())
            },
            sig("u"),
            Signature::empty(),
        );

        // A failed load answers with the null handle rather than failing the call
        let queue = self.queue.clone();
        registry.register(
            "graphics.texture.loadFromFile",
            move |args: &CallArgs| {
                let path = args.str(0)?.to_string();
                let handle = queue.submit_with_result(move |scene: &mut Scene| {
                    log::info!("Loading texture: {}", path);
                    if !TEXTURE_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
                        log::warn!("Loading texture failed: {}", path);
                        return NULL_HANDLE;
                    }
                    scene.textures.insert(Texture { path })
                })?;
                Ok(CallResult::single(ArgValue::U64(handle)))
            },
            sig("s"),
            sig("u"),
        );

        self.add_texture(registry, "graphics.texture.add");
        self.add_texture(registry, "graphics.texture.addToDrawable");

        let queue = self.queue.clone();
        registry.register(
            "graphics.drawable.enablePhysics",
            move |args: &CallArgs| {
                let handle = args.u64(0)?;
                let size = vector(args, 1)?;
                queue.submit_with_result(move |scene: &mut Scene| {
                    scene.objects.get_mut(handle).map(|object| object.physics = Some(size))
                })??;
                // physics changes must be visible before the module continues
                queue.barrier()?;
                Ok(CallResult::empty())
            },
            sig("ufff"),
            Signature::empty(),
        );
    }
}
