//! Toolchain build steps.
//!
//! Finding the compilers, bootstrapping `ninja`, generating the LLVM build
//! directory with CMake, and running the external build script.

pub mod build_script;
pub mod cmake;
pub mod ninja;
pub mod toolchain;

pub use build_script::run_build_script;
pub use cmake::{find_cmake, needs_generate, run_cmake_if_needed, CMakeGenerator};
pub use ninja::build_ninja_if_needed;
pub use toolchain::{host_locator, resolve_compilers, CompilerLocator, Compilers};
