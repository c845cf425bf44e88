pub mod appstate;
pub mod channel;
pub mod config;
pub mod device;
pub mod http;
pub mod poll_task;
pub mod registers;
pub mod transport;

pub use channel::{Category, Channel, ChannelError, Measurement, Unit};
pub use device::{DeviceController, DeviceError, PollResult};
pub use transport::{RegisterTransport, TransportError};
