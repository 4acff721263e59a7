pub mod flip;
pub mod flipper;
pub mod gesture;
pub mod prediction;
pub mod storage;
pub mod touch;
pub mod tutorial;
pub mod wallet;

pub use flipper::FlipperController;
pub use storage::LocalStore;
pub use touch::TouchArbiter;
pub use tutorial::TutorialTracker;
pub use wallet::WalletStore;
