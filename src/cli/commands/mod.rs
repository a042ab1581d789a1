pub mod run;

use crate::error::ZabwrapError;
use crate::report::console;

pub const EXIT_LOCKED: i32 = 1;
pub const EXIT_FAILURE: i32 = 2;

pub fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<ZabwrapError>() {
        Some(ZabwrapError::Lock(_)) => EXIT_LOCKED,
        _ => EXIT_FAILURE,
    }
}

pub fn exit_for_error(err: &anyhow::Error) -> ! {
    console::error(format!("{:#}", err));
    std::process::exit(exit_code(err));
}
