//! USB serial console used for first-boot provisioning.

use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::sys;
use satori_screen::settings::LineAssembler;

const POLL_MS: u32 = 50;

pub struct SerialConsole {
    lines: LineAssembler,
}

impl SerialConsole {
    pub fn new() -> Self {
        unsafe {
            let mut config = sys::usb_serial_jtag_driver_config_t {
                tx_buffer_size: 1024,
                rx_buffer_size: 1024,
            };
            sys::usb_serial_jtag_driver_install(&mut config as *mut _);
            sys::esp_vfs_usb_serial_jtag_use_driver();
        }
        Self {
            lines: LineAssembler::new(),
        }
    }

    /// Next complete line if one has arrived; empty lines are returned too
    pub fn poll_line(&mut self) -> Option<String> {
        if let Some(line) = self.lines.next_line() {
            return Some(line);
        }
        let mut temp = [0u8; 64];
        let read = unsafe {
            sys::usb_serial_jtag_read_bytes(temp.as_mut_ptr().cast(), temp.len() as u32, 0)
        };
        if read <= 0 {
            return None;
        }
        self.lines.push(&temp[..read as usize]);
        self.lines.next_line()
    }

    /// Print `prompt` and block until a line is entered
    pub fn ask(&mut self, prompt: &str) -> String {
        self.write_str(prompt);
        loop {
            if let Some(line) = self.poll_line() {
                self.write_str("\r\n");
                return line;
            }
            FreeRtos::delay_ms(POLL_MS);
        }
    }

    pub fn write_str(&self, text: &str) {
        unsafe {
            sys::usb_serial_jtag_write_bytes(text.as_ptr().cast(), text.len(), 0);
        }
    }

    pub fn write_line(&self, text: &str) {
        self.write_str(text);
        self.write_str("\r\n");
    }
}
