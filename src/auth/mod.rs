pub mod extractor;

pub use extractor::{extract_bearer_token, CurrentUser};
