//! The fixed set of host functions a guest may import.
//!
//! Every import is resolved against [`HostImport`] once, at validation and
//! link time. Strings and buffers are passed as word addresses.

use wasmtime::ValType;

/// Value types appearing in host import signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WasmTy {
    I32,
    F32,
    F64,
}

impl WasmTy {
    pub fn of(ty: &ValType) -> Option<Self> {
        match ty {
            ValType::I32 => Some(Self::I32),
            ValType::F32 => Some(Self::F32),
            ValType::F64 => Some(Self::F64),
            _ => None,
        }
    }
}

/// Parameter and result types of one host function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub params: &'static [WasmTy],
    pub results: &'static [WasmTy],
}

const fn sig(params: &'static [WasmTy], results: &'static [WasmTy]) -> Signature {
    Signature { params, results }
}

use WasmTy::{F32, F64, I32};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostImport {
    Log,
    LogInt,
    GetCurrentTime,
    InitWindow,
    SetWindowAspectRatio,
    GetWindowWidth,
    GetWindowHeight,
    SetWindowTitle,
    PollWindowEvents,
    DrawFrame,
    ClearRendererCache,
    CreateWebsocket,
    GetWebsocketState,
    CreateWebsocketServer,
    SendMessage,
    PollNetworkEvents,
    WriteFile,
    ReadFile,
    SetLocalStorageItem,
    GetLocalStorageItem,
    RemoveLocalStorageItem,
    ClearLocalStorage,
    ProcessExit,
    Assert,
    FloatToString,
    Trace,
    TimeStart,
    TimeEnd,
    Prompt,
    GetHref,
    GetHostname,
    GetProtocol,
    GetKeyValue,
}

pub const ENV_MODULE: &str = "env";
pub const UTILS_MODULE: &str = "utils";

impl HostImport {
    pub const ALL: [HostImport; 33] = [
        Self::Log,
        Self::LogInt,
        Self::GetCurrentTime,
        Self::InitWindow,
        Self::SetWindowAspectRatio,
        Self::GetWindowWidth,
        Self::GetWindowHeight,
        Self::SetWindowTitle,
        Self::PollWindowEvents,
        Self::DrawFrame,
        Self::ClearRendererCache,
        Self::CreateWebsocket,
        Self::GetWebsocketState,
        Self::CreateWebsocketServer,
        Self::SendMessage,
        Self::PollNetworkEvents,
        Self::WriteFile,
        Self::ReadFile,
        Self::SetLocalStorageItem,
        Self::GetLocalStorageItem,
        Self::RemoveLocalStorageItem,
        Self::ClearLocalStorage,
        Self::ProcessExit,
        Self::Assert,
        Self::FloatToString,
        Self::Trace,
        Self::TimeStart,
        Self::TimeEnd,
        Self::Prompt,
        Self::GetHref,
        Self::GetHostname,
        Self::GetProtocol,
        Self::GetKeyValue,
    ];

    pub fn module(self) -> &'static str {
        match self {
            Self::Assert | Self::FloatToString => UTILS_MODULE,
            _ => ENV_MODULE,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::LogInt => "log_int",
            Self::GetCurrentTime => "get_current_time",
            Self::InitWindow => "init_window",
            Self::SetWindowAspectRatio => "set_window_aspect_ratio",
            Self::GetWindowWidth => "get_window_width",
            Self::GetWindowHeight => "get_window_height",
            Self::SetWindowTitle => "set_window_title",
            Self::PollWindowEvents => "poll_window_events",
            Self::DrawFrame => "draw_frame",
            Self::ClearRendererCache => "clear_renderer_cache",
            Self::CreateWebsocket => "create_websocket",
            Self::GetWebsocketState => "get_websocket_state",
            Self::CreateWebsocketServer => "create_websocket_server",
            Self::SendMessage => "send_message",
            Self::PollNetworkEvents => "poll_network_events",
            Self::WriteFile => "write_file",
            Self::ReadFile => "read_file",
            Self::SetLocalStorageItem => "set_local_storage_item",
            Self::GetLocalStorageItem => "get_local_storage_item",
            Self::RemoveLocalStorageItem => "remove_local_storage_item",
            Self::ClearLocalStorage => "clear_local_storage",
            Self::ProcessExit => "process_exit",
            Self::Assert => "assert",
            Self::FloatToString => "float_to_string",
            Self::Trace => "trace",
            Self::TimeStart => "time_start",
            Self::TimeEnd => "time_end",
            Self::Prompt => "prompt",
            Self::GetHref => "get_href",
            Self::GetHostname => "get_hostname",
            Self::GetProtocol => "get_protocol",
            Self::GetKeyValue => "get_key_value",
        }
    }

    pub fn signature(self) -> Signature {
        match self {
            Self::Log
            | Self::LogInt
            | Self::SetWindowTitle
            | Self::RemoveLocalStorageItem
            | Self::ProcessExit
            | Self::Trace
            | Self::TimeStart
            | Self::TimeEnd
            | Self::GetHref
            | Self::GetHostname
            | Self::GetProtocol => sig(&[I32], &[]),
            Self::GetCurrentTime => sig(&[], &[F64]),
            Self::InitWindow | Self::SetWindowAspectRatio => sig(&[F32], &[]),
            Self::GetWindowWidth | Self::GetWindowHeight => sig(&[], &[F32]),
            Self::PollWindowEvents | Self::PollNetworkEvents => sig(&[I32, I32], &[I32]),
            Self::DrawFrame | Self::Assert | Self::Prompt | Self::GetKeyValue => sig(&[I32, I32], &[]),
            Self::ClearRendererCache | Self::ClearLocalStorage => sig(&[], &[]),
            Self::CreateWebsocket | Self::GetWebsocketState | Self::CreateWebsocketServer => {
                sig(&[I32], &[I32])
            }
            Self::SendMessage | Self::WriteFile | Self::SetLocalStorageItem => sig(&[I32, I32, I32], &[]),
            Self::ReadFile | Self::GetLocalStorageItem => sig(&[I32, I32, I32], &[I32]),
            Self::FloatToString => sig(&[F32, I32], &[]),
        }
    }

    pub fn lookup(module: &str, name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|i| i.module() == module && i.name() == name)
    }
}
