pub mod ev_analysis;
pub mod ev_calculator;
