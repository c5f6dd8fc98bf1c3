pub mod humanize;
pub mod similar;
