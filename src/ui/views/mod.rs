mod employee_list;
mod loan_list;

pub use employee_list::EmployeeListView;
pub use loan_list::LoanListView;
