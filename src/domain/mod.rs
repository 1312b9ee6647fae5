// Domain layer: extraction models and ports (interfaces) implemented by adapters and config.

pub mod model;
pub mod ports;
