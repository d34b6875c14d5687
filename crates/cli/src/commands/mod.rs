mod gex;
mod manage;
mod screen;

pub use gex::{run_gex, GexArgs};
pub use manage::{run_manage, ManageArgs};
pub use screen::{run_screen, ScreenArgs};
