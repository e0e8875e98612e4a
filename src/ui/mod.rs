//! Widgets for the three screen regions: process list, output panel,
//! status bar, plus the help overlay and the layout split.

pub mod help_menu;
pub mod layout;
pub mod output_pane;
pub mod process_list;
pub mod status_bar;
