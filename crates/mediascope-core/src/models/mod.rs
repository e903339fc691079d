pub mod record;
pub mod series;
pub mod title;

pub use record::*;
pub use series::*;
pub use title::{TitleField, TitlePriority};
