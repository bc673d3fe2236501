// Domain layer: the vacancy entity, its stored form, and the ports the
// engine is wired through.

pub mod model;
pub mod ports;
