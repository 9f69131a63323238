pub mod edit;
pub mod fmt;
pub mod init;
pub mod show;

pub use edit::{edit, EditArgs};
pub use fmt::{fmt, FmtArgs};
pub use init::{init, InitArgs};
pub use show::{show, ShowArgs};
