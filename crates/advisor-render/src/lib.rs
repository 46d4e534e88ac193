//! Presentation for routine-advisor: reply formatting and HTML projections
//! of the grid, selection tray, details overlay, transcript, and page.

pub mod formatter;
pub mod html;
pub mod locale;
pub mod modal;

pub use formatter::{format_bot_message, MessageFormatter};
pub use locale::Direction;
pub use modal::{Modal, ModalClick};
