mod load;
mod save;

pub use load::load_options;
pub use save::save_options;

use crate::keeper::assist::AssistOptions;
use serde::{Deserialize, Serialize};

pub const OPTIONS_FILE: &str = "options.ron";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Options {
    pub assist: AssistOptions,
    /// Treat the idle threshold as satisfiable even before any input
    /// signal has been observed. Off by default: no signal, no idling.
    #[serde(default)]
    pub act_without_input_signal: bool,
}
