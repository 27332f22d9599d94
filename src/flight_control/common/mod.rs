pub mod control_law;
pub mod geodesy;
pub mod position;
