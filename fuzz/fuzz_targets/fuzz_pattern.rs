#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|pattern: &str| {
    repo_query::fuzz_helper::convert_pattern(pattern);
});
