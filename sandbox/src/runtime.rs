//! Bridge runtime: Wasmtime engine, module loading and the guest lifecycle.
//!
//! `Bridge` compiles and validates a guest once. `Bridge::instantiate`
//! wires it to a set of host services and runs `initialize`; the returned
//! `GuestInstance` is then driven by the embedder, one entry-point call at a
//! time.

use std::path::Path;
use std::thread;

use wasmtime::{Config, Engine, Instance, Linker, Memory, Module, Store, Trap};

use canopy_hostapi::HostServices;
use canopy_primitives::types::PAGE_SIZE;
use canopy_primitives::{CodecError, MemoryView};

use crate::config::BridgeConfig;
use crate::error::{GuestExit, SandboxError};
use crate::host_impl::HostState;
use crate::linker::register_host_functions;
use crate::validation::{validate_module, INIT_EXPORT};

/// Which side of a networked guest to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Client,
    Server,
}

impl Role {
    pub fn start_export(self) -> &'static str {
        match self {
            Role::Client => "start_client",
            Role::Server => "start_server",
        }
    }

    pub fn update_export(self) -> &'static str {
        match self {
            Role::Client => "update_client",
            Role::Server => "update_server",
        }
    }
}

/// A compiled, validated guest module.
pub struct Bridge {
    engine: Engine,
    module: Module,
    config: BridgeConfig,
}

impl Bridge {
    /// Compile a guest from WASM bytecode (or WAT text).
    ///
    /// Validates the module's exports and imports before accepting.
    pub fn new(wasm_bytes: &[u8], config: BridgeConfig) -> Result<Self, SandboxError> {
        let engine = create_engine(&config)?;
        let module = Module::new(&engine, wasm_bytes)?;
        validate_module(&module)?;
        Ok(Self {
            engine,
            module,
            config,
        })
    }

    /// Load from a `.wasm` file path.
    pub fn from_file(path: &Path, config: BridgeConfig) -> Result<Self, SandboxError> {
        let engine = create_engine(&config)?;
        let module = Module::from_file(&engine, path)?;
        validate_module(&module)?;
        Ok(Self {
            engine,
            module,
            config,
        })
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Link the guest against `services`, instantiate it and run `initialize`.
    pub fn instantiate(&self, services: HostServices) -> Result<GuestInstance, SandboxError> {
        let mut store = Store::new(&self.engine, HostState::new(services, &self.config));
        store.limiter(|state| &mut state.limits);

        let mut linker = Linker::new(&self.engine);
        register_host_functions(&mut linker)?;
        let instance = linker.instantiate(&mut store, &self.module)?;

        let mut guest = GuestInstance {
            store,
            instance,
            config: self.config.clone(),
        };
        guest.call(INIT_EXPORT)?;
        log::debug!("guest initialized");
        Ok(guest)
    }
}

/// A live guest with its host state.
pub struct GuestInstance {
    store: Store<HostState>,
    instance: Instance,
    config: BridgeConfig,
}

impl GuestInstance {
    /// Call the `() -> ()` export `name`.
    ///
    /// Fuel, when metered, is refilled before every call.
    pub fn call(&mut self, name: &str) -> Result<(), SandboxError> {
        let func = self
            .instance
            .get_func(&mut self.store, name)
            .ok_or_else(|| SandboxError::MissingExport(name.to_string()))?;
        let func = func.typed::<(), ()>(&self.store)?;
        if let Some(fuel) = self.config.fuel_limit {
            self.store.set_fuel(fuel)?;
        }
        handle_trap(func.call(&mut self.store, ()))
    }

    pub fn has_export(&mut self, name: &str) -> bool {
        self.instance.get_func(&mut self.store, name).is_some()
    }

    pub fn start(&mut self, role: Role) -> Result<(), SandboxError> {
        self.call(role.start_export())
    }

    pub fn update(&mut self, role: Role) -> Result<(), SandboxError> {
        self.call(role.update_export())
    }

    pub fn run_main(&mut self) -> Result<(), SandboxError> {
        self.call("main")
    }

    /// Start the server side, then pump the transport and call
    /// `update_server` every `server_tick` while `should_continue` holds.
    ///
    /// Returns the number of updates performed.
    pub fn run_server(
        &mut self,
        mut should_continue: impl FnMut(&mut HostState) -> bool,
    ) -> Result<u64, SandboxError> {
        self.start(Role::Server)?;
        let mut ticks = 0;
        while should_continue(self.store.data_mut()) {
            self.store.data_mut().network.pump();
            self.update(Role::Server)?;
            ticks += 1;
            if !self.config.server_tick.is_zero() {
                thread::sleep(self.config.server_tick);
            }
        }
        log::debug!("server loop stopped after {ticks} updates");
        Ok(ticks)
    }

    pub fn host(&self) -> &HostState {
        self.store.data()
    }

    pub fn host_mut(&mut self) -> &mut HostState {
        self.store.data_mut()
    }

    fn memory(&mut self) -> Result<Memory, SandboxError> {
        self.instance
            .get_memory(&mut self.store, "memory")
            .ok_or_else(|| SandboxError::MemoryError("no memory export".into()))
    }

    /// Current size of the guest's linear memory in pages.
    pub fn memory_pages(&mut self) -> Result<u64, SandboxError> {
        let memory = self.memory()?;
        Ok(memory.size(&self.store))
    }

    /// Copy `count` words out of guest memory, starting at word `addr`.
    pub fn read_words(&mut self, addr: u32, count: usize) -> Result<Vec<u32>, SandboxError> {
        let memory = self.memory()?;
        MemoryView::new(memory.data_mut(&mut self.store))
            .read_words(addr, count)
            .map_err(SandboxError::WireFault)
    }

    /// Store `words` into guest memory, starting at word `addr`.
    pub fn write_words(&mut self, addr: u32, words: &[u32]) -> Result<(), SandboxError> {
        let memory = self.memory()?;
        let mut view = MemoryView::new(memory.data_mut(&mut self.store));
        view.check_range(addr, words.len()).map_err(SandboxError::WireFault)?;
        for (i, word) in words.iter().enumerate() {
            view.store(addr + i as u32, *word).map_err(SandboxError::WireFault)?;
        }
        Ok(())
    }
}

/// Create a Wasmtime engine for the bridge.
fn create_engine(config: &BridgeConfig) -> Result<Engine, SandboxError> {
    let mut wasm_config = Config::new();

    wasm_config.consume_fuel(config.fuel_limit.is_some());
    wasm_config.wasm_threads(false);
    wasm_config.wasm_multi_memory(false);

    let max_bytes = config.max_memory_pages as u64 * PAGE_SIZE as u64;
    wasm_config.memory_guaranteed_dense_image_size(max_bytes.min(16 * 1024 * 1024));

    Ok(Engine::new(&wasm_config)?)
}

/// Convert the result of a guest call into a `SandboxError`.
///
/// `process_exit` → `GuestExited`, codec faults → `WireFault`, fuel
/// exhaustion → `FuelExhausted`, anything else → `GuestTrapped`.
fn handle_trap<R>(result: anyhow::Result<R>) -> Result<R, SandboxError> {
    result.map_err(|e| {
        if let Some(GuestExit(code)) = e.downcast_ref::<GuestExit>() {
            SandboxError::GuestExited(*code)
        } else if let Some(fault) = e.downcast_ref::<CodecError>() {
            SandboxError::WireFault(fault.clone())
        } else if e.downcast_ref::<Trap>() == Some(&Trap::OutOfFuel) {
            SandboxError::FuelExhausted
        } else {
            SandboxError::GuestTrapped(format!("{e:#}"))
        }
    })
}
