//! Task module ABI.
//!
//! A module exposes `init`, `alloc`, `run_task` and its linear memory. The
//! host allocates a parameter buffer inside the module, writes the encoded
//! params there, calls `run_task(ptr)` and reads the hash back.
//!
//! [`NativeModule`] gives the compiled-in language implementations the same
//! shape: a private byte vector acts as linear memory behind a bump
//! allocator. With the `wasm` feature, [`wasm::WasmModule`] loads real
//! WebAssembly modules through wasmtime.

use crate::error::{BenchError, Result};
use crate::params::TaskKind;
use crate::registry::{RunTaskFn, TaskRegistry};
use std::sync::Arc;
use tracing::debug;

/// Largest single allocation a module grants
pub const MAX_ALLOCATION: u32 = 1 << 30;
/// Allocation alignment in bytes
pub const ALLOC_ALIGN: u32 = 8;
/// Linear memory grows in 64 KiB pages, like WebAssembly memory
pub const PAGE_SIZE: usize = 64 * 1024;

/// Callback that aborts an in-flight `run_task`, if the module supports it
pub type InterruptHandle = Box<dyn Fn() + Send + Sync>;

/// One loaded, isolated module instance
pub trait TaskModule: Send {
    fn task(&self) -> TaskKind;

    fn language(&self) -> &str;

    /// Optional seeding hook
    fn init(&mut self, seed: u32) -> Result<()>;

    /// Pointer to `n_bytes` of fresh memory, `0` on failure
    fn alloc(&mut self, n_bytes: u32) -> Result<u32>;

    fn write_memory(&mut self, ptr: u32, bytes: &[u8]) -> Result<()>;

    fn read_memory(&mut self, ptr: u32, len: u32) -> Result<Vec<u8>>;

    /// Run the task on the parameter buffer at `ptr`; `0` for null or invalid params
    fn run_task(&mut self, ptr: u32) -> Result<u32>;

    /// Current size of the module's linear memory in bytes
    fn memory_size(&mut self) -> u64;

    /// Handle that can stop a call running on another thread
    fn interrupt_handle(&self) -> Option<InterruptHandle> {
        None
    }
}

/// Produces fresh module instances; every call returns an isolated instance
pub trait ModuleLoader: Send + Sync {
    fn load(&self, task: TaskKind, language: &str) -> Result<Box<dyn TaskModule>>;
}

impl<L: ModuleLoader + ?Sized> ModuleLoader for Arc<L> {
    fn load(&self, task: TaskKind, language: &str) -> Result<Box<dyn TaskModule>> {
        (**self).load(task, language)
    }
}

/// A compiled-in implementation behind the module ABI
pub struct NativeModule {
    task: TaskKind,
    language: String,
    entry: RunTaskFn,
    memory: Vec<u8>,
    /// Next free offset; offset 0 stays reserved as the null pointer
    heap_top: u32,
    seed: Option<u32>,
}

impl NativeModule {
    pub fn new(task: TaskKind, language: impl Into<String>, entry: RunTaskFn) -> Self {
        Self {
            task,
            language: language.into(),
            entry,
            memory: vec![0; PAGE_SIZE],
            heap_top: ALLOC_ALIGN,
            seed: None,
        }
    }

    /// Seed passed to `init`, if any
    pub fn seed(&self) -> Option<u32> {
        self.seed
    }

    fn check_range(&self, ptr: u32, len: usize) -> Result<std::ops::Range<usize>> {
        let start = ptr as usize;
        match start.checked_add(len) {
            Some(end) if ptr != 0 && end <= self.memory.len() => Ok(start..end),
            _ => Err(BenchError::execution(format!(
                "memory access out of bounds: ptr={ptr} len={len} size={}",
                self.memory.len()
            ))),
        }
    }
}

impl TaskModule for NativeModule {
    fn task(&self) -> TaskKind {
        self.task
    }

    fn language(&self) -> &str {
        &self.language
    }

    fn init(&mut self, seed: u32) -> Result<()> {
        self.seed = Some(seed);
        Ok(())
    }

    fn alloc(&mut self, n_bytes: u32) -> Result<u32> {
        if n_bytes == 0 || n_bytes > MAX_ALLOCATION {
            return Ok(0);
        }
        let ptr = self.heap_top;
        let end = ptr as u64 + n_bytes as u64;
        if end > MAX_ALLOCATION as u64 {
            return Ok(0);
        }
        if end as usize > self.memory.len() {
            let pages = (end as usize).div_ceil(PAGE_SIZE);
            self.memory.resize(pages * PAGE_SIZE, 0);
        }
        // Align the next allocation
        self.heap_top = (end as u32).next_multiple_of(ALLOC_ALIGN);
        Ok(ptr)
    }

    fn write_memory(&mut self, ptr: u32, bytes: &[u8]) -> Result<()> {
        let range = self.check_range(ptr, bytes.len())?;
        self.memory[range].copy_from_slice(bytes);
        Ok(())
    }

    fn read_memory(&mut self, ptr: u32, len: u32) -> Result<Vec<u8>> {
        let range = self.check_range(ptr, len as usize)?;
        Ok(self.memory[range].to_vec())
    }

    fn run_task(&mut self, ptr: u32) -> Result<u32> {
        if ptr == 0 {
            return Ok(0);
        }
        if ptr as usize >= self.memory.len() {
            return Err(BenchError::execution(format!("run_task pointer {ptr} out of bounds")));
        }
        Ok((self.entry)(&self.memory[ptr as usize..]))
    }

    fn memory_size(&mut self) -> u64 {
        self.memory.len() as u64
    }
}

/// Loads compiled-in implementations from the task registry
pub struct NativeLoader {
    registry: TaskRegistry,
}

impl NativeLoader {
    pub fn new(registry: TaskRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }
}

impl Default for NativeLoader {
    fn default() -> Self {
        Self::new(crate::registry::build_registry())
    }
}

impl ModuleLoader for NativeLoader {
    fn load(&self, task: TaskKind, language: &str) -> Result<Box<dyn TaskModule>> {
        let runner = self
            .registry
            .find(task)
            .ok_or_else(|| BenchError::module_load(task.name(), language, "task not registered"))?;
        let entry = runner.implementation(language).ok_or_else(|| {
            BenchError::module_load(task.name(), language, "no implementation compiled into this build")
        })?;
        debug!(task = %task, language, "loaded native module");
        Ok(Box::new(NativeModule::new(task, language, entry)))
    }
}

#[cfg(feature = "wasm")]
pub mod wasm {
    //! WebAssembly modules loaded with wasmtime.
    //!
    //! Modules are looked up as `<dir>/<task>-<language>.wasm`, must export
    //! `alloc`, `run_task` and `memory`, and may export `init`. Each load
    //! gets its own engine and store, so instances never share memory.

    use super::{InterruptHandle, ModuleLoader, TaskModule};
    use crate::error::{BenchError, Result};
    use crate::params::TaskKind;
    use std::path::PathBuf;
    use tracing::debug;
    use wasmtime::{Config, Engine, Linker, Memory, Module, Store, TypedFunc};

    /// Epoch delta used outside of `run_task`, far beyond any real run
    const NO_DEADLINE: u64 = 1 << 40;

    pub struct WasmLoader {
        config: Config,
        dir: PathBuf,
    }

    impl WasmLoader {
        pub fn new(dir: impl Into<PathBuf>) -> Self {
            let mut config = Config::new();
            config.epoch_interruption(true);
            Self {
                config,
                dir: dir.into(),
            }
        }

        pub fn module_path(&self, task: TaskKind, language: &str) -> PathBuf {
            self.dir.join(format!("{}-{}.wasm", task.name(), language))
        }
    }

    impl ModuleLoader for WasmLoader {
        fn load(&self, task: TaskKind, language: &str) -> Result<Box<dyn TaskModule>> {
            let path = self.module_path(task, language);
            let fail = |reason: String| BenchError::module_load(task.name(), language, reason);

            // One engine per instance: bumping its epoch must only stop this module
            let engine = Engine::new(&self.config).map_err(|e| fail(e.to_string()))?;
            let module = Module::from_file(&engine, &path)
                .map_err(|e| fail(format!("{}: {e}", path.display())))?;
            let mut store = Store::new(&engine, ());
            store.set_epoch_deadline(NO_DEADLINE);
            let linker = Linker::new(&engine);
            let instance = linker
                .instantiate(&mut store, &module)
                .map_err(|e| fail(e.to_string()))?;

            let memory = instance
                .get_memory(&mut store, "memory")
                .ok_or(BenchError::MissingExport { name: "memory" })?;
            let alloc = instance
                .get_typed_func::<u32, u32>(&mut store, "alloc")
                .map_err(|_| BenchError::MissingExport { name: "alloc" })?;
            let run_task = instance
                .get_typed_func::<u32, u32>(&mut store, "run_task")
                .map_err(|_| BenchError::MissingExport { name: "run_task" })?;
            let init = instance.get_typed_func::<u32, ()>(&mut store, "init").ok();

            debug!(task = %task, language, path = %path.display(), "instantiated wasm module");
            Ok(Box::new(WasmModule {
                task,
                language: language.to_string(),
                engine,
                store,
                memory,
                alloc,
                run_task,
                init,
            }))
        }
    }

    pub struct WasmModule {
        task: TaskKind,
        language: String,
        engine: Engine,
        store: Store<()>,
        memory: Memory,
        alloc: TypedFunc<u32, u32>,
        run_task: TypedFunc<u32, u32>,
        init: Option<TypedFunc<u32, ()>>,
    }

    fn trap(e: wasmtime::Error) -> BenchError {
        BenchError::execution(e.to_string())
    }

    impl TaskModule for WasmModule {
        fn task(&self) -> TaskKind {
            self.task
        }

        fn language(&self) -> &str {
            &self.language
        }

        fn init(&mut self, seed: u32) -> Result<()> {
            match &self.init {
                Some(init) => init.call(&mut self.store, seed).map_err(trap),
                None => Ok(()),
            }
        }

        fn alloc(&mut self, n_bytes: u32) -> Result<u32> {
            self.alloc.call(&mut self.store, n_bytes).map_err(trap)
        }

        fn write_memory(&mut self, ptr: u32, bytes: &[u8]) -> Result<()> {
            self.memory
                .write(&mut self.store, ptr as usize, bytes)
                .map_err(|e| BenchError::execution(e.to_string()))
        }

        fn read_memory(&mut self, ptr: u32, len: u32) -> Result<Vec<u8>> {
            let mut buf = vec![0u8; len as usize];
            self.memory
                .read(&self.store, ptr as usize, &mut buf)
                .map_err(|e| BenchError::execution(e.to_string()))?;
            Ok(buf)
        }

        fn run_task(&mut self, ptr: u32) -> Result<u32> {
            self.store.set_epoch_deadline(1);
            let result = self.run_task.call(&mut self.store, ptr).map_err(trap);
            self.store.set_epoch_deadline(NO_DEADLINE);
            result
        }

        fn memory_size(&mut self) -> u64 {
            self.memory.data_size(&self.store) as u64
        }

        fn interrupt_handle(&self) -> Option<InterruptHandle> {
            let engine = self.engine.clone();
            Some(Box::new(move || engine.increment_epoch()))
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::params::MatrixMulParams;

    fn module() -> NativeModule {
        NativeModule::new(
            TaskKind::MatrixMul,
            "rust",
            crate::tasks::matrix_mul::matrix_mul_run_task,
        )
    }

    #[test]
    fn test_alloc_contract() {
        let mut m = module();
        assert_eq!(m.alloc(0).unwrap(), 0);
        assert_eq!(m.alloc(MAX_ALLOCATION + 1).unwrap(), 0);

        let first = m.alloc(3).unwrap();
        let second = m.alloc(8).unwrap();
        assert_ne!(first, 0);
        assert_eq!(first % ALLOC_ALIGN, 0);
        assert_eq!(second % ALLOC_ALIGN, 0);
        assert!(second >= first + 3);
    }

    #[test]
    fn test_memory_grows_by_pages() {
        let mut m = module();
        assert_eq!(m.memory_size(), PAGE_SIZE as u64);
        let ptr = m.alloc(PAGE_SIZE as u32).unwrap();
        assert_ne!(ptr, 0);
        assert_eq!(m.memory_size(), 2 * PAGE_SIZE as u64);
    }

    #[test]
    fn test_write_then_run_task() {
        let mut m = module();
        let bytes = codec::encode(&MatrixMulParams { dimension: 2, seed: 12345 }.into());
        let ptr = m.alloc(bytes.len() as u32).unwrap();
        m.write_memory(ptr, &bytes).unwrap();
        assert_eq!(m.read_memory(ptr, 8).unwrap(), bytes);
        assert_eq!(m.run_task(ptr).unwrap(), 1_708_139_940);
    }

    #[test]
    fn test_null_and_out_of_bounds() {
        let mut m = module();
        assert_eq!(m.run_task(0).unwrap(), 0);
        assert!(m.run_task(u32::MAX).is_err());
        assert!(m.write_memory(0, &[1]).is_err());
        assert!(m.write_memory(PAGE_SIZE as u32 - 2, &[1, 2, 3, 4]).is_err());
    }

    #[test]
    fn test_native_loader() {
        let loader = NativeLoader::default();
        let module = loader.load(TaskKind::JsonParse, "rust").unwrap();
        assert_eq!(module.language(), "rust");
        assert_eq!(module.task(), TaskKind::JsonParse);
        match loader.load(TaskKind::JsonParse, "tinygo") {
            Err(e) => assert_eq!(e.kind(), crate::error::ErrorKind::ModuleLoad),
            Ok(_) => panic!("unknown language must not load"),
        }
    }
}
