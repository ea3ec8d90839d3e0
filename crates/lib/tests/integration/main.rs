
mod facade_tests;
mod platform_tests;
