//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements        | Connects to                   |
//! |-------------|-------------------|-------------------------------|
//! | `hardware`  | SensorPort        | ADC1 one-shot sampler         |
//! |             | DigitalIoPort     | embedded-hal GPIO pins        |
//! | `log_sink`  | EventSink         | Serial log output             |
//! | `nvs`       | StoragePort       | NVS / in-memory store         |
//! |             | ConfigPort        |                               |
//! | `protocol`  | ProtocolPort      | JSON-lines log stand-in       |
//! | `time`      |:                 | ESP32 system timer            |

pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod protocol;
pub mod time;
