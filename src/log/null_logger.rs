/*!

Stand-in used when the `logging` feature is disabled. Nothing is written anywhere, but the level
filters are still honored by the `log` macros.

*/

use crate::log::LogConfiguration;

impl LogConfiguration {
    pub(in crate::log) fn set_config(&mut self) {
        log::set_max_level(self.global_log_level);
    }
}
