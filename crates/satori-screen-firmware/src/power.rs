//! CPU clock and restart.

use esp_idf_svc::sys;

/// CPU clock while waiting out the hour after a refresh
const LOW_POWER_CPU_MHZ: i32 = 80;

/// Drop the CPU to the low-power clock. Needs `CONFIG_PM_ENABLE`.
pub fn reduce_cpu_frequency() {
    let config = sys::esp_pm_config_t {
        max_freq_mhz: LOW_POWER_CPU_MHZ,
        min_freq_mhz: LOW_POWER_CPU_MHZ,
        light_sleep_enable: false,
    };
    let res = unsafe { sys::esp_pm_configure((&config as *const sys::esp_pm_config_t).cast()) };
    if res == sys::ESP_OK {
        log::info!("CPU clock reduced to {} MHz", LOW_POWER_CPU_MHZ);
    } else {
        log::warn!("esp_pm_configure failed: {}", res);
    }
}

pub fn restart() -> ! {
    log::info!("Restarting...");
    esp_idf_svc::hal::reset::restart()
}
