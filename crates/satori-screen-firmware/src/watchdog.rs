//! Task watchdog for the main task.

use core::ptr;

use esp_idf_svc::sys;
use satori_screen::keepalive::KeepAlive;

/// Reset if the main task is not fed within this period
pub const TIMEOUT_MS: u32 = 8_388;

pub struct TaskWatchdog {
    enabled: bool,
}

impl TaskWatchdog {
    /// Subscribe the calling task; `enabled = false` gives a watchdog that
    /// never fires (the `NOWATCHDOG` marker).
    pub fn new(enabled: bool) -> Result<Self, String> {
        if !enabled {
            log::info!("NOWATCHDOG file found. Watchdog is disabled.");
            return Ok(Self { enabled });
        }

        let config = sys::esp_task_wdt_config_t {
            timeout_ms: TIMEOUT_MS,
            idle_core_mask: 0,
            trigger_panic: true,
        };
        let mut res = unsafe { sys::esp_task_wdt_reconfigure(&config) };
        if res == sys::ESP_ERR_INVALID_STATE as sys::esp_err_t {
            // Not started by the bootloader config
            res = unsafe { sys::esp_task_wdt_init(&config) };
        }
        if res != sys::ESP_OK {
            return Err(format!("task watchdog config failed: {}", res));
        }

        let res = unsafe { sys::esp_task_wdt_add(ptr::null_mut()) };
        if res != sys::ESP_OK {
            return Err(format!("task watchdog subscribe failed: {}", res));
        }
        log::info!("Watchdog enabled, timeout {} ms", TIMEOUT_MS);
        Ok(Self { enabled })
    }
}

impl KeepAlive for TaskWatchdog {
    fn feed(&mut self) {
        if self.enabled {
            unsafe { sys::esp_task_wdt_reset() };
        }
    }

    fn cleanup(&mut self) {
        if self.enabled {
            unsafe { sys::esp_task_wdt_delete(ptr::null_mut()) };
            self.enabled = false;
            log::info!("Watchdog released");
        }
    }
}

impl Drop for TaskWatchdog {
    fn drop(&mut self) {
        self.cleanup();
    }
}
