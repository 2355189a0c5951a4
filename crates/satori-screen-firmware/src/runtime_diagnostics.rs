use esp_idf_svc::sys;

/// Log heap usage and current task stack headroom at a phase boundary.
pub fn log_heap(label: &str) {
    let free_heap = unsafe { sys::esp_get_free_heap_size() };
    let min_free = unsafe { sys::esp_get_minimum_free_heap_size() };
    let largest_8bit = unsafe { sys::heap_caps_get_largest_free_block(sys::MALLOC_CAP_8BIT) };
    let stack_hwm_words = unsafe { sys::uxTaskGetStackHighWaterMark(core::ptr::null_mut()) };
    let stack_hwm_bytes = (stack_hwm_words as usize) * core::mem::size_of::<sys::StackType_t>();
    log::info!(
        "[MEM] {}: free={} min_free={} largest_8bit={} stack_hwm={}B",
        label,
        free_heap,
        min_free,
        largest_8bit,
        stack_hwm_bytes
    );
}

/// Log why the chip came out of reset; watchdog resets point at a hung fetch
/// or panel.
pub fn log_reset_reason() {
    let reason = unsafe { sys::esp_reset_reason() };
    #[allow(non_upper_case_globals)]
    let label = match reason {
        sys::esp_reset_reason_t_ESP_RST_POWERON => "power-on",
        sys::esp_reset_reason_t_ESP_RST_SW => "software restart",
        sys::esp_reset_reason_t_ESP_RST_PANIC => "panic",
        sys::esp_reset_reason_t_ESP_RST_TASK_WDT => "task watchdog",
        sys::esp_reset_reason_t_ESP_RST_INT_WDT => "interrupt watchdog",
        sys::esp_reset_reason_t_ESP_RST_BROWNOUT => "brownout",
        sys::esp_reset_reason_t_ESP_RST_DEEPSLEEP => "deep sleep wake",
        _ => "other",
    };
    if reason == sys::esp_reset_reason_t_ESP_RST_TASK_WDT {
        log::warn!("Reset reason: {} ({})", label, reason);
    } else {
        log::info!("Reset reason: {} ({})", label, reason);
    }
}
