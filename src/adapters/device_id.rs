//! Station MAC address source for the device identity.
//!
//! The identity is taken from the Wi-Fi station interface MAC, which is
//! what existing broker ACLs and Home Assistant registrations were keyed
//! on.  Formatting lives in [`crate::identity`].

pub use crate::identity::MacAddress;

/// Read the Wi-Fi station MAC.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    let err = unsafe {
        esp_idf_svc::sys::esp_read_mac(
            mac.as_mut_ptr(),
            esp_idf_svc::sys::esp_mac_type_t_ESP_MAC_WIFI_STA,
        )
    };
    if err != esp_idf_svc::sys::ESP_OK {
        log::warn!("esp_read_mac failed ({}), falling back to eFuse default", err);
        unsafe {
            esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
        }
    }
    mac
}

/// Simulation: returns a deterministic fake MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]
}
