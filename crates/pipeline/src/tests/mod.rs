mod helpers;
mod import_tests;
