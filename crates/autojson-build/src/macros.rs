//! Build-script helper that runs a generation pass and writes the units into
//! `OUT_DIR`.
//!
//! The calling `main` must return a `Result` whose error type accepts
//! `autojson::build::Error`.
#[macro_export]
macro_rules! build {
    () => {
        $crate::build!($crate::Config::FILE_NAME)
    };
    ($config:expr) => {{
        // all
        println!("cargo:rerun-if-changed=build.rs");

        $crate::run_build_script($config)?;
    }};
}
