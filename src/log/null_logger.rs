/*!

A "logger" for builds without the `logging` feature. It writes nothing but keeps the public API
and the `log` crate's max level in step with the configuration.

*/

use crate::log::LogConfiguration;

impl LogConfiguration {
    /// Sets the global logger to conform to this `LogConfiguration`.
    pub(in crate::log) fn set_config(&mut self) {
        log::set_max_level(self.global_log_level);
    }
}
