// Domain layer: models, wire shapes, description formatting and the storage port.

pub mod format;
pub mod model;
pub mod ports;
