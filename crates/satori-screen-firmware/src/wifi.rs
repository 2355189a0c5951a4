//! Station-mode Wi-Fi link.

use core::convert::TryInto;

use embedded_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::modem::Modem;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

/// Association polls before giving up
pub const CONNECT_ATTEMPTS: u32 = 20;
const CONNECT_POLL_MS: u32 = 1_000;

pub struct WifiLink {
    wifi: BlockingWifi<EspWifi<'static>>,
}

impl WifiLink {
    pub fn new(modem: Modem, sys_loop: EspSystemEventLoop) -> Result<Self, String> {
        let nvs = EspDefaultNvsPartition::take().ok();
        let esp_wifi = EspWifi::new(modem, sys_loop.clone(), nvs)
            .map_err(|err| format!("wifi init failed: {}", err))?;
        let wifi = BlockingWifi::wrap(esp_wifi, sys_loop)
            .map_err(|err| format!("wifi wrapper init failed: {}", err))?;
        Ok(Self { wifi })
    }

    /// Associate and wait for an IP address
    pub fn connect(&mut self, ssid: &str, password: &str) -> Result<(), String> {
        let ssid_h = ssid
            .trim()
            .try_into()
            .map_err(|_| String::from("STA SSID too long (max 32)"))?;
        let password = password.trim();
        let (auth_method, password_h) = if password.is_empty() {
            (AuthMethod::None, Default::default())
        } else {
            (
                AuthMethod::WPA2Personal,
                password
                    .try_into()
                    .map_err(|_| String::from("STA password too long (max 64)"))?,
            )
        };

        let conf = Configuration::Client(ClientConfiguration {
            ssid: ssid_h,
            bssid: None,
            auth_method,
            password: password_h,
            channel: None,
            ..Default::default()
        });

        self.wifi
            .set_configuration(&conf)
            .map_err(|err| format!("wifi sta config failed: {}", err))?;
        self.wifi
            .start()
            .map_err(|err| format!("wifi sta start failed: {}", err))?;
        self.wifi
            .wifi_mut()
            .connect()
            .map_err(|err| format!("wifi sta connect failed: {}", err))?;

        let mut connected = false;
        for attempt in 1..=CONNECT_ATTEMPTS {
            if self.wifi.is_connected().unwrap_or(false) {
                connected = true;
                break;
            }
            log::info!("WiFi connection attempt {}/{}", attempt, CONNECT_ATTEMPTS);
            FreeRtos::delay_ms(CONNECT_POLL_MS);
        }
        if !connected {
            return Err(format!("wifi not associated after {} attempts", CONNECT_ATTEMPTS));
        }

        self.wifi
            .wait_netif_up()
            .map_err(|err| format!("wifi sta netif up failed: {}", err))?;
        let ip = self
            .wifi
            .wifi()
            .sta_netif()
            .get_ip_info()
            .map_err(|err| format!("wifi sta ip failed: {}", err))?
            .ip;
        log::info!("WiFi connected: {}", ip);
        Ok(())
    }

    /// Radio off for the low-power wait
    pub fn shutdown(&mut self) {
        if let Err(err) = self.wifi.disconnect() {
            log::warn!("wifi disconnect failed: {}", err);
        }
        if let Err(err) = self.wifi.stop() {
            log::warn!("wifi stop failed: {}", err);
        }
        log::info!("WiFi off");
    }
}
