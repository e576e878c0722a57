//! Call-scoped access to guest linear memory.
//!
//! The guest may grow its memory between calls, which invalidates any view
//! taken earlier. Host functions therefore re-acquire the memory on every
//! call through [`with_guest`]; the `MemoryView` it lends out cannot escape
//! the closure.

use anyhow::anyhow;
use wasmtime::{Caller, Memory};

use canopy_primitives::{word_addr, BufferCursor, CodecError, MemoryView};

use crate::host_impl::HostState;

/// Get the guest's exported memory from a Caller.
pub(crate) fn guest_memory(caller: &mut Caller<'_, HostState>) -> anyhow::Result<Memory> {
    caller
        .get_export("memory")
        .and_then(|e| e.into_memory())
        .ok_or_else(|| anyhow!("guest does not export 'memory'"))
}

/// Run `f` with a fresh view of guest memory and the host state.
///
/// Wire faults returned by `f` become traps, aborting the guest call.
pub(crate) fn with_guest<R>(
    caller: &mut Caller<'_, HostState>,
    f: impl FnOnce(MemoryView<'_>, &mut HostState) -> Result<R, CodecError>,
) -> anyhow::Result<R> {
    let memory = guest_memory(caller)?;
    let (bytes, state) = memory.data_and_store_mut(&mut *caller);
    Ok(f(MemoryView::new(bytes), state)?)
}

/// Decode the guest string whose word address is `raw`.
pub(crate) fn read_guest_string(caller: &mut Caller<'_, HostState>, raw: i32) -> anyhow::Result<String> {
    with_guest(caller, |view, _| view.read_string(word_addr(raw)?))
}

/// Write `text` as a string at word address `raw`. Only the guest's memory
/// size bounds the write.
pub(crate) fn write_guest_string(caller: &mut Caller<'_, HostState>, raw: i32, text: &str) -> anyhow::Result<()> {
    with_guest(caller, |view, _| BufferCursor::unbounded(view, word_addr(raw)?).write_string(text))
}

/// Decode a file path leniently: a path that is not valid text reads as
/// the empty path, which the file service refuses.
pub(crate) fn read_guest_path(view: &MemoryView<'_>, raw: i32) -> String {
    word_addr(raw)
        .and_then(|addr| view.read_string(addr))
        .unwrap_or_else(|e| {
            log::warn!("malformed file path at word {raw}: {e}");
            String::new()
        })
}

/// Copy `size` words starting at word address `addr` out as bytes.
pub(crate) fn read_guest_bytes(view: &MemoryView<'_>, addr: i32, size: i32) -> Result<Vec<u8>, CodecError> {
    let count = u32::try_from(size).map_err(|_| CodecError::NegativeAddress(size))?;
    view.read_word_bytes(word_addr(addr)?, count as usize)
}

/// Cursor over `capacity` words at word address `addr`.
pub(crate) fn bounded_cursor(view: MemoryView<'_>, addr: i32, capacity: i32) -> Result<BufferCursor<'_>, CodecError> {
    let capacity = u32::try_from(capacity).map_err(|_| CodecError::NegativeAddress(capacity))?;
    Ok(BufferCursor::new(view, word_addr(addr)?, capacity))
}
