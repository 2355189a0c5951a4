//! SPIFFS partition holding settings, history and the last-refresh stamp.

use std::ffi::CString;
use std::path::{Path, PathBuf};

use esp_idf_svc::sys;

pub const MOUNT_POINT: &str = "/spiffs";
pub const PARTITION_LABEL: &str = "storage";

pub const LAST_UPDATE_FILE: &str = "last_update.txt";
pub const HISTORY_FILE: &str = "history.json";
/// Presence disables the watchdog
pub const NO_WATCHDOG_FILE: &str = "NOWATCHDOG";

const MAX_OPEN_FILES: usize = 4;

pub fn mount() -> Result<(), String> {
    let base_path = CString::new(MOUNT_POINT).map_err(|_| String::from("invalid mount path"))?;
    let label = CString::new(PARTITION_LABEL).map_err(|_| String::from("invalid label"))?;
    let config = sys::esp_vfs_spiffs_conf_t {
        base_path: base_path.as_ptr(),
        partition_label: label.as_ptr(),
        max_files: MAX_OPEN_FILES,
        format_if_mount_failed: true,
    };

    let res = unsafe { sys::esp_vfs_spiffs_register(&config) };
    if res != sys::ESP_OK {
        return Err(format!("SPIFFS mount failed: {}", res));
    }

    let (mut total, mut used) = (0usize, 0usize);
    unsafe { sys::esp_spiffs_info(label.as_ptr(), &mut total, &mut used) };
    log::info!("SPIFFS mounted at {}: {}/{} bytes used", MOUNT_POINT, used, total);
    Ok(())
}

pub fn path(name: &str) -> PathBuf {
    Path::new(MOUNT_POINT).join(name)
}

pub fn exists(name: &str) -> bool {
    path(name).exists()
}

pub fn remove(name: &str) -> Result<(), String> {
    std::fs::remove_file(path(name)).map_err(|err| format!("remove {} failed: {}", name, err))
}
