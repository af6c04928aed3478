pub mod actions;
pub mod activity;
pub mod army;
pub mod assist;
pub mod safety;
pub mod spells;
pub mod surface;
