// Process exit codes. A failed validation still exits with EXIT_SUCCESS.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_GENERIC_FAIL: i32 = 1;
