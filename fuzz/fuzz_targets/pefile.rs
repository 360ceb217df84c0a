#![no_main]

use bottlescope::{PeFile, ParseOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(pe) = PeFile::from_mem_with_options(data.to_vec(), ParseOptions::strict()) {
        let _ = pe.resources(None);
        let _ = pe.best_icon();
    }
});
