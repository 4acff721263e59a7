pub mod app;
pub mod coin_view;
pub mod flipper_screen;
pub mod info_panel;
pub mod landing;
pub mod prediction_dialog;
pub mod result_area;
pub mod toast;
pub mod tutorial_overlay;
pub mod wallet_screen;
pub mod zoom_controls;
