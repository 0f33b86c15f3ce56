pub mod display_time;
