mod form;
mod input;
mod key_result;
mod listing;
mod pagination;
mod prompt;

pub use form::{Form, FormEvent, FormField};
pub use key_result::KeyResult;
pub use listing::{Listing, ListingEvent, ListingStatus, ListingTable};
pub use prompt::{Confirm, Prompt, PromptEvent};
