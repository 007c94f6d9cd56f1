mod controls;
mod details;
pub(super) mod panels;
