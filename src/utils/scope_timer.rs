// Distributed under the GNU Affero General Public License v3.0 or later.
// See accompanying file LICENSE or https://www.gnu.org/licenses/agpl-3.0.html for details.

use std::time::{Duration, Instant};

/// Logs at `trace` level how long the enclosing scope took.
pub struct ScopeTimer<'a> {
    name: &'a str,
    start_time: Instant,
}

impl<'a> ScopeTimer<'a> {
    pub fn new(name: &'a str) -> Self {
        Self {
            name,
            start_time: Instant::now(),
        }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

impl Drop for ScopeTimer<'_> {
    fn drop(&mut self) {
        log::trace!("{} took {:.2?}", self.name, self.elapsed());
    }
}
