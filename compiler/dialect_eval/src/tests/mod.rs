//! Evaluator tests, one file per implementation module.

mod operators_tests;
