//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter          | Implements        | Connects to            |
//! |------------------|-------------------|------------------------|
//! | `log_sink`       | EventSink         | `log` facade           |
//! | `uart_transport` | CommandTransport  | ESP-IDF UART driver    |

pub mod log_sink;
#[cfg(feature = "espidf")]
pub mod uart_transport;
