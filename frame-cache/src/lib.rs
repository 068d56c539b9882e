mod cache;

pub use cache::{FrameKey, PointBudgetCache};
