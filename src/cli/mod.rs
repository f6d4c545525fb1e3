// Subcommands of the cchfix binary

pub mod down;
pub mod status;
pub mod up;
