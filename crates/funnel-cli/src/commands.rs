pub mod expression;
pub mod run;
pub mod surface;
