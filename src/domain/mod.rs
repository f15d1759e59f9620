// Domain layer: expressions, the emotion state machine and ports (interfaces).
// No I/O lives here; adapters implement the ports.

pub mod model;
pub mod ports;
