pub mod check;
pub mod export;
pub mod run;
pub mod sample;
