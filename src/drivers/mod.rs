//! Bus, device and front-end drivers.

pub mod front_end;
pub mod line;
pub mod max5217;
pub mod mcp3422;
#[cfg(not(target_os = "espidf"))]
pub mod sim_bus;
pub mod soft_i2c;
