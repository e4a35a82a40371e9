mod math_tests;

pub mod helpers;
