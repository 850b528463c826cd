pub mod daily_runner;
