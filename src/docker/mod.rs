// Container runtime and port plumbing used by the fixture manager

pub mod container;
pub mod ports;
