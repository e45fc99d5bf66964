mod footer;
mod input;
mod key_result;
mod prompt;

pub use footer::draw_footer;
pub use key_result::KeyResult;
pub use prompt::Prompt;
