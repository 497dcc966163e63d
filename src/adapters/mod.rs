//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements  | Connects to                    |
//! |-------------|-------------|--------------------------------|
//! | `device_id` | (identity)  | eFuse / STA MAC                |
//! | `log_sink`  | EventSink   | Serial log output              |
//! | `mqtt`      | MqttPort    | ESP-IDF MQTT client            |
//! | `nvs`       | ConfigPort  | NVS / in-memory store          |
//! | `wifi`      | LinkPort    | ESP-IDF WiFi STA               |
//! |             |             | Link event forwarding          |

pub mod device_id;
pub mod log_sink;
pub mod mqtt;
pub mod nvs;
pub mod wifi;
