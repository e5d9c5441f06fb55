use std::thread;
use std::time::Duration;

use modbox_shared::{
    ArgValue, CallArgs, CallResult, DispatchQueue, FunctionRegistry, HandleTable, HandlerError,
    RegistryPlugin, Signature, TypeCode,
};

/// Render-thread state the scene functions operate on
pub struct TestScene {
    pub counter: u64,
    pub log: Vec<String>,
    pub objects: HandleTable<[f64; 3]>,
}

impl Default for TestScene {
    fn default() -> Self {
        Self {
            counter: 0,
            log: Vec::new(),
            objects: HandleTable::new("object"),
        }
    }
}

fn sig(text: &str) -> Signature {
    text.parse().unwrap_or_else(|error| panic!("bad test signature '{}': {}", text, error))
}

/// Functions that need no engine state
///
/// - `test.add` (u, d) -> u: first argument plus one
/// - `test.echo` (s) -> s
/// - `test.fail` () -> (): always fails
/// - `test.panic` () -> (): always panics
/// - `test.badResult` () -> u: returns nothing, breaking its own signature
/// - `test.sleep` (u) -> (): sleeps for the given milliseconds
pub fn basic_registry() -> FunctionRegistry {
    let mut registry = FunctionRegistry::builder();
    registry
        .register(
            "test.add",
            |args: &CallArgs| {
                let sum = args
                    .u64(0)?
                    .checked_add(1)
                    .ok_or_else(|| HandlerError::failed("test.add overflowed"))?;
                Ok(CallResult::single(ArgValue::U64(sum)))
            },
            [TypeCode::U64, TypeCode::F64],
            [TypeCode::U64],
        )
        .register(
            "test.echo",
            |args: &CallArgs| Ok(CallResult::single(ArgValue::Str(args.str(0)?.to_string()))),
            sig("s"),
            sig("s"),
        )
        .register(
            "test.fail",
            |_: &CallArgs| Err(HandlerError::failed("requested failure")),
            Signature::empty(),
            Signature::empty(),
        )
        .register(
            "test.panic",
            |_: &CallArgs| -> Result<CallResult, HandlerError> { panic!("requested panic") },
            Signature::empty(),
            Signature::empty(),
        )
        .register(
            "test.badResult",
            |_: &CallArgs| Ok(CallResult::empty()),
            Signature::empty(),
            sig("u"),
        )
        .register(
            "test.sleep",
            |args: &CallArgs| {
                thread::sleep(Duration::from_millis(args.u64(0)?));
                Ok(CallResult::empty())
            },
            sig("u"),
            Signature::empty(),
        );
    registry
}

/// Functions whose work runs on the render thread through a DispatchQueue
///
/// - `scene.increment` () -> u: bumps the counter, returns the new value
/// - `scene.log` (s) -> (): appends to the log without waiting
/// - `scene.barrier` () -> (): waits until everything queued before has run
/// - `scene.spawn` (d, d, d) -> u: adds an object, returns its handle
/// - `scene.position` (u) -> (d, d, d): position of an object
/// - `scene.remove` (u) -> (): removes an object
pub struct SceneFunctions {
    pub queue: DispatchQueue<TestScene>,
}

impl RegistryPlugin for SceneFunctions {
    fn build(&self, registry: &mut FunctionRegistry) {
        let queue = self.queue.clone();
        registry.register(
            "scene.increment",
            move |_: &CallArgs| {
                let value = queue.submit_with_result(|scene: &mut TestScene| {
                    scene.counter += 1;
                    scene.counter
                })?;
                Ok(CallResult::single(ArgValue::U64(value)))
            },
            Signature::empty(),
            sig("u"),
        );

        let queue = self.queue.clone();
        registry.register(
            "scene.log",
            move |args: &CallArgs| {
                let line = args.str(0)?.to_string();
                queue.submit(move |scene: &mut TestScene| scene.log.push(line), false)?;
                Ok(CallResult::empty())
            },
            sig("s"),
            Signature::empty(),
        );

        let queue = self.queue.clone();
        registry.register(
            "scene.barrier",
            move |_: &CallArgs| {
                queue.barrier()?;
                Ok(CallResult::empty())
            },
            Signature::empty(),
            Signature::empty(),
        );

        let queue = self.queue.clone();
        registry.register(
            "scene.spawn",
            move |args: &CallArgs| {
                let position = [args.f64(0)?, args.f64(1)?, args.f64(2)?];
                let handle = queue
                    .submit_with_result(move |scene: &mut TestScene| scene.objects.insert(position))?;
                Ok(CallResult::single(ArgValue::U64(handle)))
            },
            sig("ddd"),
            sig("u"),
        );

        let queue = self.queue.clone();
        registry.register(
            "scene.position",
            move |args: &CallArgs| {
                let handle = args.u64(0)?;
                let [x, y, z] = queue.submit_with_result(move |scene: &mut TestScene| {
                    scene.objects.get(handle).copied()
                })??;
                Ok(CallResult::new(vec![
                    ArgValue::F64(x),
                    ArgValue::F64(y),
                    ArgValue::F64(z),
                ]))
            },
            sig("u"),
            sig("ddd"),
        );

        let queue = self.queue.clone();
        registry.register(
            "scene.remove",
            move |args: &CallArgs| {
                let handle = args.u64(0)?;
                queue.submit_with_result(move |scene: &mut TestScene| {
                    scene.objects.remove(handle).map(|_| ())
                })??;
                Ok(CallResult::empty())
            },
            sig("u"),
            Signature::empty(),
        );
    }
}

/// `basic_registry` plus the scene functions over `queue`, locked
pub fn scene_registry(queue: &DispatchQueue<TestScene>) -> FunctionRegistry {
    let mut registry = basic_registry();
    registry.add_plugin(SceneFunctions {
        queue: queue.clone(),
    });
    registry.lock();
    registry
}
