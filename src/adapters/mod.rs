// Adapters layer: concrete implementations of the domain ports for
// external systems (player processes, sysfs PWM, displays, gateway, web).

pub mod display;
pub mod gateway;
pub mod process_player;
pub mod simulated_servo;
pub mod sysfs_pwm;
pub mod token_store;
pub mod web;
