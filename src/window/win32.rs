// Win32 implementation of the window seam

use super::{RunningProcess, TopLevelWindow, WindowApi, WindowId};
use crate::errors::{FleetError, FleetResult};
use crate::layout::Rect;
use log::warn;
use std::ffi::OsString;
use std::mem;
use std::os::windows::ffi::OsStringExt;
use std::path::PathBuf;
use std::ptr;
use winapi::shared::minwindef::{BOOL, DWORD, FALSE, FILETIME, LPARAM, TRUE};
use winapi::shared::windef::{HDC, HMONITOR, HWND, LPRECT, RECT};
use winapi::um::errhandlingapi::GetLastError;
use winapi::um::handleapi::{CloseHandle, INVALID_HANDLE_VALUE};
use winapi::um::processthreadsapi::{GetExitCodeProcess, GetProcessTimes, OpenProcess};
use winapi::um::tlhelp32::{
    CreateToolhelp32Snapshot, Process32FirstW, Process32NextW, PROCESSENTRY32W,
    TH32CS_SNAPPROCESS,
};
use winapi::um::winbase::QueryFullProcessImageNameW;
use winapi::um::winnt::{HANDLE, PROCESS_QUERY_LIMITED_INFORMATION};
use winapi::um::winuser::{
    EnumDisplayMonitors, EnumWindows, GetMonitorInfoW, GetWindowThreadProcessId, IsIconic,
    IsWindow, IsWindowVisible, SetWindowPos, ShowWindow, MONITORINFO, MONITORINFOF_PRIMARY,
    SWP_NOACTIVATE, SWP_NOZORDER, SWP_SHOWWINDOW, SW_RESTORE,
};

/// GetExitCodeProcess value for a process that is still running
const STILL_ACTIVE: DWORD = 259;

/// Kernel handle closed on every exit path
struct ProcessHandle(HANDLE);

impl ProcessHandle {
    fn open_for_query(process_id: u32) -> Option<Self> {
        let handle = unsafe { OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, FALSE, process_id) };
        if handle.is_null() {
            None
        } else {
            Some(Self(handle))
        }
    }

    /// Creation time in 100 ns ticks since 1601
    fn creation_time(&self) -> Option<u64> {
        let mut created: FILETIME = unsafe { mem::zeroed() };
        let mut exited: FILETIME = unsafe { mem::zeroed() };
        let mut kernel: FILETIME = unsafe { mem::zeroed() };
        let mut user: FILETIME = unsafe { mem::zeroed() };
        let ok = unsafe {
            GetProcessTimes(self.0, &mut created, &mut exited, &mut kernel, &mut user)
        };
        if ok == 0 {
            return None;
        }
        Some(((created.dwHighDateTime as u64) << 32) | created.dwLowDateTime as u64)
    }

    fn image_path(&self) -> Option<PathBuf> {
        let mut buffer = [0u16; 1024];
        let mut len = buffer.len() as DWORD;
        if unsafe { QueryFullProcessImageNameW(self.0, 0, buffer.as_mut_ptr(), &mut len) } == 0 {
            return None;
        }
        Some(PathBuf::from(OsString::from_wide(&buffer[..len as usize])))
    }

    fn exit_code(&self) -> Option<DWORD> {
        let mut code: DWORD = 0;
        if unsafe { GetExitCodeProcess(self.0, &mut code) } != 0 {
            Some(code)
        } else {
            None
        }
    }
}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        unsafe {
            CloseHandle(self.0);
        }
    }
}

/// Process ids from a toolhelp snapshot whose image name equals `exe_name`
fn snapshot_process_ids(exe_name: &str) -> FleetResult<Vec<u32>> {
    let wanted = exe_name.to_lowercase();
    let snapshot = unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0) };
    if snapshot == INVALID_HANDLE_VALUE {
        return Err(FleetError::WindowError(format!(
            "CreateToolhelp32Snapshot failed: error {}",
            unsafe { GetLastError() }
        )));
    }
    let snapshot = ProcessHandle(snapshot);

    let mut ids = Vec::new();
    let mut entry: PROCESSENTRY32W = unsafe { mem::zeroed() };
    entry.dwSize = mem::size_of::<PROCESSENTRY32W>() as DWORD;
    let mut more = unsafe { Process32FirstW(snapshot.0, &mut entry) } != 0;
    while more {
        let len = entry
            .szExeFile
            .iter()
            .position(|&c| c == 0)
            .unwrap_or(entry.szExeFile.len());
        let name = OsString::from_wide(&entry.szExeFile[..len]);
        if name.to_string_lossy().to_lowercase() == wanted {
            ids.push(entry.th32ProcessID);
        }
        more = unsafe { Process32NextW(snapshot.0, &mut entry) } != 0;
    }
    Ok(ids)
}

// Window enumeration callback function
unsafe extern "system" fn enum_windows_proc(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let windows = &mut *(lparam as *mut Vec<TopLevelWindow>);
    let mut process_id: DWORD = 0;
    GetWindowThreadProcessId(hwnd, &mut process_id);
    windows.push(TopLevelWindow::new(
        WindowId(hwnd as u64),
        process_id,
        IsWindowVisible(hwnd) != 0,
    ));
    TRUE // Continue enumeration
}

unsafe extern "system" fn monitor_enum_proc(
    hmonitor: HMONITOR,
    _hdc: HDC,
    _rect: LPRECT,
    data: LPARAM,
) -> BOOL {
    let areas = &mut *(data as *mut Vec<(bool, Rect)>);
    let mut info: MONITORINFO = mem::zeroed();
    info.cbSize = mem::size_of::<MONITORINFO>() as DWORD;
    if GetMonitorInfoW(hmonitor, &mut info) != 0 {
        let primary = info.dwFlags & MONITORINFOF_PRIMARY != 0;
        areas.push((primary, rect_from_win32(&info.rcWork)));
    }
    TRUE
}

fn rect_from_win32(rect: &RECT) -> Rect {
    Rect::new(
        rect.left,
        rect.top,
        rect.right - rect.left,
        rect.bottom - rect.top,
    )
}

#[derive(Debug, Default)]
pub struct Win32WindowApi;

impl Win32WindowApi {
    pub fn new() -> Self {
        Self
    }
}

impl WindowApi for Win32WindowApi {
    fn top_level_windows(&self) -> Vec<TopLevelWindow> {
        let mut windows: Vec<TopLevelWindow> = Vec::new();
        unsafe {
            EnumWindows(
                Some(enum_windows_proc),
                &mut windows as *mut Vec<TopLevelWindow> as LPARAM,
            );
        }
        windows
    }

    fn process_alive(&self, process_id: u32) -> bool {
        match ProcessHandle::open_for_query(process_id) {
            Some(handle) => handle.exit_code() == Some(STILL_ACTIVE),
            None => false,
        }
    }

    fn running_processes(&self, exe_name: &str) -> Vec<RunningProcess> {
        let ids = match snapshot_process_ids(exe_name) {
            Ok(ids) => ids,
            Err(e) => {
                warn!("{}", e);
                return Vec::new();
            }
        };

        ids.into_iter()
            .filter_map(|process_id| {
                // Processes we may not query are skipped, like ones that exited meanwhile
                let handle = ProcessHandle::open_for_query(process_id)?;
                Some(RunningProcess {
                    process_id,
                    exe_path: handle.image_path(),
                    started: handle.creation_time()?,
                })
            })
            .collect()
    }

    fn is_minimized(&self, window: WindowId) -> bool {
        unsafe { IsIconic(window.0 as HWND) != 0 }
    }

    fn restore(&self, window: WindowId) -> FleetResult<()> {
        let hwnd = window.0 as HWND;
        unsafe {
            if IsWindow(hwnd) == 0 {
                return Err(FleetError::WindowError(format!(
                    "Invalid window handle: {:?}",
                    window
                )));
            }
            // ShowWindow reports the previous visibility, not success
            ShowWindow(hwnd, SW_RESTORE);
        }
        Ok(())
    }

    fn set_bounds(&self, window: WindowId, rect: Rect) -> FleetResult<()> {
        unsafe {
            let result = SetWindowPos(
                window.0 as HWND,
                ptr::null_mut(),
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                SWP_NOZORDER | SWP_NOACTIVATE | SWP_SHOWWINDOW,
            );

            if result == 0 {
                let error = GetLastError();
                return Err(FleetError::WindowError(format!(
                    "SetWindowPos failed with error: {}",
                    error
                )));
            }
        }
        Ok(())
    }

    fn working_areas(&self) -> Vec<Rect> {
        let mut areas: Vec<(bool, Rect)> = Vec::new();
        unsafe {
            EnumDisplayMonitors(
                ptr::null_mut(),
                ptr::null(),
                Some(monitor_enum_proc),
                &mut areas as *mut Vec<(bool, Rect)> as LPARAM,
            );
        }
        // Stable sort keeps enumeration order among secondary displays
        areas.sort_by_key(|(primary, _)| !*primary);
        areas.into_iter().map(|(_, rect)| rect).collect()
    }
}
