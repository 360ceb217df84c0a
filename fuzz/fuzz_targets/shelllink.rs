#![no_main]

use std::path::Path;

use bottlescope::ShellLink;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(link) = ShellLink::from_mem(data.to_vec()) {
        let _ = link.program(Path::new("/bottle"));
    }
});
