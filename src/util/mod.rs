pub mod fsutil;
pub mod xdg;
