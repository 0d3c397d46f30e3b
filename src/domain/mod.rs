// Domain layer: declaration model and the ports the migration core talks through.

pub mod model;
pub mod ports;
