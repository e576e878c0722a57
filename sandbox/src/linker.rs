//! Host function registration via Wasmtime linker.
//!
//! Binds every [`HostImport`] to its implementation. Each function:
//! 1. Re-acquires guest memory for the duration of the call
//! 2. Decodes its arguments through the buffer codec
//! 3. Delegates to the owning service in `HostState`
//! 4. Encodes any result back into the guest-provided buffer
//!
//! Wire faults (overflow, bad address, invalid code point) return `Err`,
//! which traps the guest and aborts the current entry-point call. Every
//! other failure is absorbed by the services.

use std::time::{SystemTime, UNIX_EPOCH};

use wasmtime::{Caller, Linker, WasmBacktrace};

use canopy_primitives::events::encode_all;
use canopy_primitives::{word_addr, CodecError, Frame};

use crate::error::{GuestExit, SandboxError};
use crate::host_impl::HostState;
use crate::imports::HostImport;
use crate::memory::{
    bounded_cursor, read_guest_bytes, read_guest_path, read_guest_string, with_guest, write_guest_string,
};

/// Register every host import with the linker.
pub fn register_host_functions(linker: &mut Linker<HostState>) -> Result<(), SandboxError> {
    for import in HostImport::ALL {
        register(linker, import)?;
    }
    Ok(())
}

fn register(linker: &mut Linker<HostState>, import: HostImport) -> Result<(), SandboxError> {
    let (module, name) = (import.module(), import.name());
    match import {
        // ── Logging & utilities ──
        HostImport::Log => linker.func_wrap(
            module,
            name,
            |mut caller: Caller<'_, HostState>, text: i32| -> anyhow::Result<()> {
                let message = read_guest_string(&mut caller, text)?;
                caller.data_mut().add_log(message);
                Ok(())
            },
        )?,
        HostImport::LogInt => linker.func_wrap(module, name, |mut caller: Caller<'_, HostState>, value: i32| {
            caller.data_mut().add_log(value.to_string());
        })?,
        HostImport::GetCurrentTime => linker.func_wrap(module, name, || -> f64 {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_or(0.0, |d| d.as_secs_f64() * 1000.0)
        })?,
        HostImport::ProcessExit => linker.func_wrap(
            module,
            name,
            |_caller: Caller<'_, HostState>, code: i32| -> anyhow::Result<()> {
                log::debug!("guest called process_exit({code})");
                Err(GuestExit(code).into())
            },
        )?,
        HostImport::Assert => linker.func_wrap(module, name, |line: i32, value: i32| {
            if value == 0 {
                log::error!(target: "guest", "assertion failed at line {line}");
            }
        })?,
        HostImport::FloatToString => linker.func_wrap(
            module,
            name,
            |mut caller: Caller<'_, HostState>, value: f32, addr: i32| -> anyhow::Result<()> {
                write_guest_string(&mut caller, addr, &format_float(value))
            },
        )?,

        HostImport::Trace => linker.func_wrap(
            module,
            name,
            |mut caller: Caller<'_, HostState>, text: i32| -> anyhow::Result<()> {
                let message = read_guest_string(&mut caller, text)?;
                let backtrace = WasmBacktrace::capture(&caller);
                log::info!(target: "guest", "trace: {message}\n{backtrace}");
                caller.data_mut().add_log(message);
                Ok(())
            },
        )?,
        HostImport::TimeStart => linker.func_wrap(
            module,
            name,
            |mut caller: Caller<'_, HostState>, label: i32| -> anyhow::Result<()> {
                let label = read_guest_string(&mut caller, label)?;
                caller.data_mut().console.time_start(&label);
                Ok(())
            },
        )?,
        HostImport::TimeEnd => linker.func_wrap(
            module,
            name,
            |mut caller: Caller<'_, HostState>, label: i32| -> anyhow::Result<()> {
                let label = read_guest_string(&mut caller, label)?;
                let state = caller.data_mut();
                match state.console.time_end(&label) {
                    Some(elapsed) => state.add_log(format!("{label}: {:.3}ms", elapsed.as_secs_f64() * 1000.0)),
                    None => log::warn!(target: "guest", "timer {label:?} does not exist"),
                }
                Ok(())
            },
        )?,

        // ── Page ──
        HostImport::Prompt => linker.func_wrap(
            module,
            name,
            |mut caller: Caller<'_, HostState>, message: i32, addr: i32| -> anyhow::Result<()> {
                let message = read_guest_string(&mut caller, message)?;
                let reply = caller.data_mut().prompter.prompt(&message).unwrap_or_default();
                write_guest_string(&mut caller, addr, &reply)
            },
        )?,
        HostImport::GetHref => linker.func_wrap(
            module,
            name,
            |mut caller: Caller<'_, HostState>, addr: i32| -> anyhow::Result<()> {
                let href = caller.data().location.href.clone();
                write_guest_string(&mut caller, addr, &href)
            },
        )?,
        HostImport::GetHostname => linker.func_wrap(
            module,
            name,
            |mut caller: Caller<'_, HostState>, addr: i32| -> anyhow::Result<()> {
                let hostname = caller.data().location.hostname.clone();
                write_guest_string(&mut caller, addr, &hostname)
            },
        )?,
        HostImport::GetProtocol => linker.func_wrap(
            module,
            name,
            |mut caller: Caller<'_, HostState>, addr: i32| -> anyhow::Result<()> {
                let protocol = caller.data().location.protocol.clone();
                write_guest_string(&mut caller, addr, &protocol)
            },
        )?,
        HostImport::GetKeyValue => linker.func_wrap(
            module,
            name,
            |mut caller: Caller<'_, HostState>, key: i32, addr: i32| -> anyhow::Result<()> {
                let value = caller.data().key_value(key);
                write_guest_string(&mut caller, addr, &value)
            },
        )?,

        // ── Window ──
        HostImport::InitWindow => linker.func_wrap(module, name, |mut caller: Caller<'_, HostState>, aspect: f32| {
            caller.data_mut().window.init(aspect);
        })?,
        HostImport::SetWindowAspectRatio => {
            linker.func_wrap(module, name, |mut caller: Caller<'_, HostState>, aspect: f32| {
                caller.data_mut().window.set_aspect_ratio(aspect);
            })?
        }
        HostImport::GetWindowWidth => linker.func_wrap(module, name, |caller: Caller<'_, HostState>| -> f32 {
            caller.data().window.width()
        })?,
        HostImport::GetWindowHeight => linker.func_wrap(module, name, |caller: Caller<'_, HostState>| -> f32 {
            caller.data().window.height()
        })?,
        HostImport::SetWindowTitle => linker.func_wrap(
            module,
            name,
            |mut caller: Caller<'_, HostState>, title: i32| -> anyhow::Result<()> {
                let title = read_guest_string(&mut caller, title)?;
                caller.data_mut().window.set_title(&title);
                Ok(())
            },
        )?,
        HostImport::PollWindowEvents => linker.func_wrap(
            module,
            name,
            |mut caller: Caller<'_, HostState>, addr: i32, capacity: i32| -> anyhow::Result<i32> {
                with_guest(&mut caller, |view, state| {
                    let events = state.window.poll_events();
                    let mut cursor = bounded_cursor(view, addr, capacity)?;
                    Ok(encode_all(&events, &mut cursor)? as i32)
                })
            },
        )?,

        // ── Rendering ──
        HostImport::DrawFrame => linker.func_wrap(
            module,
            name,
            |mut caller: Caller<'_, HostState>, addr: i32, size: i32| -> anyhow::Result<()> {
                with_guest(&mut caller, |view, state| {
                    let mut cursor = bounded_cursor(view, addr, size)?;
                    let frame = Frame::decode(&mut cursor)?;
                    state.draw_frame(&frame);
                    Ok(())
                })
            },
        )?,
        HostImport::ClearRendererCache => linker.func_wrap(module, name, |mut caller: Caller<'_, HostState>| {
            caller.data_mut().renderer.clear_cache();
        })?,

        // ── Network ──
        HostImport::CreateWebsocket => linker.func_wrap(
            module,
            name,
            |mut caller: Caller<'_, HostState>, url: i32| -> anyhow::Result<i32> {
                let url = read_guest_string(&mut caller, url)?;
                Ok(caller.data_mut().network.create_websocket(&url))
            },
        )?,
        HostImport::GetWebsocketState => {
            linker.func_wrap(module, name, |caller: Caller<'_, HostState>, id: i32| -> i32 {
                caller.data().network.ready_state(id) as i32
            })?
        }
        HostImport::CreateWebsocketServer => {
            linker.func_wrap(module, name, |mut caller: Caller<'_, HostState>, port: i32| -> i32 {
                caller.data_mut().network.create_server(port)
            })?
        }
        HostImport::SendMessage => linker.func_wrap(
            module,
            name,
            |mut caller: Caller<'_, HostState>, id: i32, addr: i32, size: i32| -> anyhow::Result<()> {
                with_guest(&mut caller, |view, state| {
                    let payload = read_guest_bytes(&view, addr, size)?;
                    state.network.send(id, payload);
                    Ok(())
                })
            },
        )?,
        HostImport::PollNetworkEvents => linker.func_wrap(
            module,
            name,
            |mut caller: Caller<'_, HostState>, addr: i32, capacity: i32| -> anyhow::Result<i32> {
                with_guest(&mut caller, |view, state| {
                    let events = state.network.poll_events();
                    let mut cursor = bounded_cursor(view, addr, capacity)?;
                    Ok(encode_all(&events, &mut cursor)? as i32)
                })
            },
        )?,

        // ── Files ──
        HostImport::WriteFile => linker.func_wrap(
            module,
            name,
            |mut caller: Caller<'_, HostState>, path: i32, addr: i32, size: i32| -> anyhow::Result<()> {
                with_guest(&mut caller, |view, state| {
                    let path = read_guest_path(&view, path);
                    let bytes = read_guest_bytes(&view, addr, size)?;
                    state.files.write(&path, &bytes);
                    Ok(())
                })
            },
        )?,
        HostImport::ReadFile => linker.func_wrap(
            module,
            name,
            |mut caller: Caller<'_, HostState>, path: i32, addr: i32, capacity: i32| -> anyhow::Result<i32> {
                with_guest(&mut caller, |view, state| {
                    let path = read_guest_path(&view, path);
                    let bytes = state.files.read(&path);
                    let mut cursor = bounded_cursor(view, addr, capacity)?;
                    cursor.write_buffer(&bytes)?;
                    Ok(cursor.size() as i32)
                })
            },
        )?,

        // ── Local storage ──
        HostImport::SetLocalStorageItem => linker.func_wrap(
            module,
            name,
            |mut caller: Caller<'_, HostState>, key: i32, addr: i32, size: i32| -> anyhow::Result<()> {
                with_guest(&mut caller, |view, state| {
                    let key = view.read_string(word_addr(key)?)?;
                    let count = usize::try_from(size).map_err(|_| CodecError::NegativeAddress(size))?;
                    let words = view.read_words(word_addr(addr)?, count)?;
                    state.storage.set(&key, &words);
                    Ok(())
                })
            },
        )?,
        HostImport::GetLocalStorageItem => linker.func_wrap(
            module,
            name,
            |mut caller: Caller<'_, HostState>, key: i32, addr: i32, capacity: i32| -> anyhow::Result<i32> {
                with_guest(&mut caller, |view, state| {
                    let key = view.read_string(word_addr(key)?)?;
                    let words = state.storage.get(&key);
                    let mut cursor = bounded_cursor(view, addr, capacity)?;
                    cursor.write_words(&words)?;
                    Ok(cursor.size() as i32)
                })
            },
        )?,
        HostImport::RemoveLocalStorageItem => linker.func_wrap(
            module,
            name,
            |mut caller: Caller<'_, HostState>, key: i32| -> anyhow::Result<()> {
                let key = read_guest_string(&mut caller, key)?;
                caller.data_mut().storage.remove(&key);
                Ok(())
            },
        )?,
        HostImport::ClearLocalStorage => linker.func_wrap(module, name, |mut caller: Caller<'_, HostState>| {
            caller.data_mut().storage.clear();
        })?,
    };
    Ok(())
}

/// Shortest decimal text that reads back as `value`.
fn format_float(value: f32) -> String {
    match value {
        v if v.is_nan() => "NaN".to_string(),
        v if v.is_infinite() && v > 0.0 => "Infinity".to_string(),
        v if v.is_infinite() => "-Infinity".to_string(),
        v => format!("{v}"),
    }
}
