//! Process exit codes. Scripts and CI jobs depend on these values.

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_TEST_FAILURE: i32 = 1; // At least one scenario failed
pub const EXIT_CONFIG_ERROR: i32 = 2; // Bad configuration or unwritable results file
