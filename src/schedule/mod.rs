pub mod amortization;

pub use amortization::{
    calculate_emi, generate_schedule, InstallmentSchedule, LoanTerms, ScheduleGenerator,
    MAX_TERM_MONTHS,
};
