pub mod cover_art;
pub mod search;

pub use cover_art::{CoverArt, CoverEntity};
pub use search::{SearchCompletion, SearchOutcome, SearchRequest};
