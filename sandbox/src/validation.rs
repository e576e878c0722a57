//! Guest module validation.
//!
//! Checks a compiled module against the bridge's call surface before it is
//! linked:
//!
//! 1. `memory` and `initialize` are exported
//! 2. Optional entry points, when present, are `() -> ()` functions
//! 3. Every import is a known host function with a matching signature
//! 4. No WASI imports

use wasmtime::{ExternType, FuncType, Module};

use crate::error::SandboxError;
use crate::imports::{HostImport, Signature, WasmTy};

/// Export that must be present.
pub const INIT_EXPORT: &str = "initialize";

/// Entry points the host calls if the guest provides them.
pub const OPTIONAL_EXPORTS: &[&str] = &["start_client", "update_client", "start_server", "update_server", "main"];

/// Validate that a guest module can be driven by the bridge.
pub fn validate_module(module: &Module) -> Result<(), SandboxError> {
    validate_exports(module)?;
    validate_imports(module)?;
    Ok(())
}

fn matches_signature(ty: &FuncType, expected: Signature) -> bool {
    let params: Vec<Option<WasmTy>> = ty.params().map(|p| WasmTy::of(&p)).collect();
    let results: Vec<Option<WasmTy>> = ty.results().map(|r| WasmTy::of(&r)).collect();
    params.len() == expected.params.len()
        && results.len() == expected.results.len()
        && params.iter().zip(expected.params).all(|(p, e)| *p == Some(*e))
        && results.iter().zip(expected.results).all(|(r, e)| *r == Some(*e))
}

const NO_ARGS: Signature = Signature {
    params: &[],
    results: &[],
};

fn validate_exports(module: &Module) -> Result<(), SandboxError> {
    let has_memory = module
        .exports()
        .any(|e| e.name() == "memory" && matches!(e.ty(), ExternType::Memory(_)));
    if !has_memory {
        return Err(SandboxError::ValidationError("module must export 'memory'".into()));
    }

    if !module.exports().any(|e| e.name() == INIT_EXPORT) {
        return Err(SandboxError::ValidationError(format!(
            "missing required export: {INIT_EXPORT}"
        )));
    }

    let entry_points = std::iter::once(INIT_EXPORT).chain(OPTIONAL_EXPORTS.iter().copied());
    for name in entry_points {
        let Some(export) = module.exports().find(|e| e.name() == name) else {
            continue;
        };
        match export.ty() {
            ExternType::Func(ft) if matches_signature(&ft, NO_ARGS) => {}
            ExternType::Func(_) => {
                return Err(SandboxError::ValidationError(format!(
                    "export '{name}' must take no parameters and return nothing"
                )));
            }
            _ => {
                return Err(SandboxError::ValidationError(format!(
                    "export '{name}' must be a function"
                )));
            }
        }
    }

    Ok(())
}

fn validate_imports(module: &Module) -> Result<(), SandboxError> {
    for import in module.imports() {
        let (module_name, name) = (import.module(), import.name());

        if module_name.starts_with("wasi") {
            return Err(SandboxError::ValidationError(format!(
                "WASI import not allowed: {module_name}::{name}"
            )));
        }

        let Some(host) = HostImport::lookup(module_name, name) else {
            return Err(SandboxError::ValidationError(format!(
                "unknown host import: {module_name}::{name}"
            )));
        };

        let ExternType::Func(ft) = import.ty() else {
            return Err(SandboxError::ValidationError(format!(
                "non-function import not allowed: {module_name}::{name}"
            )));
        };

        if !matches_signature(&ft, host.signature()) {
            return Err(SandboxError::ValidationError(format!(
                "import {module_name}::{name} has the wrong signature"
            )));
        }
    }

    Ok(())
}
