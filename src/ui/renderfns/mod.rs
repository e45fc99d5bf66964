pub mod header;
pub mod utils;

pub use header::draw_header;
pub use utils::{employee_status_color, loan_status_color, money, truncate};
