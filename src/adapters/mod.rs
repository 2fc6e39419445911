//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter          | Implements      | Connects to                     |
//! |------------------|-----------------|---------------------------------|
//! | `console_log`    | `log::Log`      | stdout                          |
//! | `log_sink`       | EventSink       | `log` facade                    |
//! | `port_pin`       | OutputPin       | any GpioPort pin (status LED)   |
//! | `sim_gpio`       | GpioPort        | scripted ADC / echo board       |
//! | `sim_peripheral` | PeripheralPort  | in-memory GATT server           |
//! | `sim_radio`      | RadioPort       | in-memory advertisers and links |
//! | `time`           | ClockPort       | `std::time::Instant` / manual   |

pub mod console_log;
pub mod log_sink;
pub mod port_pin;
pub mod sim_gpio;
pub mod sim_peripheral;
pub mod sim_radio;
pub mod time;
