mod layout;
mod theme;

pub use layout::FrameLayout;
pub use theme::Theme;
