mod release;

pub use release::run_release;
