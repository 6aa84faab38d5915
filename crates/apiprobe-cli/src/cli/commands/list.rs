use apiprobe_core::Suite;

use crate::exit_codes::EXIT_SUCCESS;

pub(crate) fn run() -> i32 {
    for suite in Suite::ALL {
        println!("{suite}:");
        for scenario in suite.scenarios() {
            println!("  {}", scenario.name);
        }
    }
    EXIT_SUCCESS
}
