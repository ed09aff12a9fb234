//! FFI bindings for the C implementation.

#[cfg(c_implementation_active)]
mod ffi {
    use libc::size_t;

    extern "C" {
        pub fn matrix_mul_c_run_task(params: *const u8, len: size_t) -> u32;
    }
}

/// C implementation wrapper
#[cfg(c_implementation_active)]
pub fn matrix_mul_c_run_task(params: &[u8]) -> u32 {
    unsafe { ffi::matrix_mul_c_run_task(params.as_ptr(), params.len()) }
}

#[cfg(c_implementation_active)]
pub const C_IMPL_AVAILABLE: bool = true;

#[cfg(not(c_implementation_active))]
pub const C_IMPL_AVAILABLE: bool = false;

#[cfg(not(c_implementation_active))]
pub fn matrix_mul_c_run_task(_params: &[u8]) -> u32 {
    panic!("C implementation not compiled (requires GCC, Clang or MSVC)")
}
