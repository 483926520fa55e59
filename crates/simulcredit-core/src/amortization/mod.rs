pub mod request;
pub mod schedule;

pub use request::{AmortizationInput, BalanceCarry, LoanRequest, ScheduleOptions};
pub use schedule::{
    amortize, compute_schedule, compute_schedule_with, AmortizationSchedule,
    LoanAmortizationOutput, LoanSummary, RepaymentMethod, ScheduleRow,
};
