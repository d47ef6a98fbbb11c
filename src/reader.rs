//! Reading view: progress, navigation and theme.

pub mod progress;
pub mod theme;

pub use progress::{
    LocalProgress, Navigation, PageTurn, PersistOutcome, Reader, RemoteProgress, initial_page,
    on_page_change,
};
pub use theme::{Palette, Theme};
