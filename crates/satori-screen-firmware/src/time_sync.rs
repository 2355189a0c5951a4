//! Network time.

use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::sntp::{EspSntp, SyncStatus};
use satori_screen::keepalive::KeepAlive;

const ATTEMPTS: u32 = 5;
const RETRY_DELAY_MS: u32 = 1_000;

/// Set the system clock over SNTP; the clock stays UTC, local offsets are
/// applied when formatting.
///
/// The returned handle keeps the client polling; hold it for the session.
pub fn sync<K: KeepAlive>(keepalive: &mut K) -> Result<EspSntp<'static>, String> {
    let sntp = EspSntp::new_default().map_err(|err| format!("sntp start failed: {}", err))?;

    for attempt in 1..=ATTEMPTS {
        keepalive.feed();
        if sntp.get_sync_status() == SyncStatus::Completed {
            log::info!("Time synchronized");
            return Ok(sntp);
        }
        log::info!("Waiting for network time ({}/{})", attempt, ATTEMPTS);
        FreeRtos::delay_ms(RETRY_DELAY_MS);
    }

    if sntp.get_sync_status() == SyncStatus::Completed {
        return Ok(sntp);
    }
    Err(format!("no network time after {} attempts", ATTEMPTS))
}
